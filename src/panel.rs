//! A small slider panel for tweaking numeric scene parameters at runtime.
//!
//! Each slider is an explicit observer binding: a getter that reads the current
//! value out of the target and a setter that writes a new one back. The panel
//! never owns the values it edits, so the scene stays the single source of truth.
//!
//! ```ignore
//! let mut panel = DebugPanel::<Scene>::new();
//! panel
//!     .add(|scene| scene.material(id).roughness, move |scene, v| scene.material_mut(id).roughness = v)
//!     .min(0.0)
//!     .max(1.0)
//!     .step(0.0001)
//!     .name("roughness");
//! ```

use std::fmt;

use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::Key,
};

use crate::context::Viewport;

pub const PANEL_WIDTH: f32 = 245.0;
pub const ROW_HEIGHT: f32 = 27.0;
pub const PANEL_MARGIN: f32 = 15.0;
pub const FONT_SIZE: f32 = 11.0;
const LABEL_FRACTION: f32 = 0.4;
const LABEL_INSET: f32 = 8.0;
const TRACK_PADDING: f32 = 5.0;

const BACKGROUND: [u8; 3] = [0x1a, 0x1a, 0x1a];
const ROW_MARKER: [u8; 3] = [0x2f, 0xa1, 0xd6];
const TRACK: [u8; 3] = [0x30, 0x30, 0x30];
const TRACK_HOVER: [u8; 3] = [0x3c, 0x3c, 0x3c];
const FILL: [u8; 3] = [0x2f, 0xa1, 0xd6];
const FILL_ACTIVE: [u8; 3] = [0x44, 0xab, 0xda];
const TEXT: [u8; 3] = [0xee, 0xee, 0xee];

/// An axis aligned rectangle in logical pixels, origin at the top left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A flat coloured rectangle; the panel is drawn as a list of these.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub rect: Rect,
    /// Linear RGBA.
    pub colour: [f32; 4],
}

/// One line of panel text.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub rect: Rect,
    /// sRGB.
    pub colour: [u8; 3],
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn colour(rgb: [u8; 3]) -> [f32; 4] {
    [
        srgb_to_linear(rgb[0]),
        srgb_to_linear(rgb[1]),
        srgb_to_linear(rgb[2]),
        1.0,
    ]
}

/// Reads a value from and writes it back to a `T`.
pub struct Binding<T> {
    get: Box<dyn Fn(&T) -> f32>,
    set: Box<dyn Fn(&mut T, f32)>,
}

impl<T> Binding<T> {
    pub fn new(get: impl Fn(&T) -> f32 + 'static, set: impl Fn(&mut T, f32) + 'static) -> Self {
        Self {
            get: Box::new(get),
            set: Box::new(set),
        }
    }
}

pub struct Slider<T> {
    label: String,
    min: f32,
    max: f32,
    step: Option<f32>,
    binding: Binding<T>,
}

impl<T> Slider<T> {
    fn new(binding: Binding<T>, label: String) -> Self {
        Self {
            label,
            min: 0.0,
            max: 1.0,
            step: None,
            binding,
        }
    }

    pub fn min(&mut self, min: f32) -> &mut Self {
        self.min = min;
        self
    }

    pub fn max(&mut self, max: f32) -> &mut Self {
        self.max = max;
        self
    }

    pub fn step(&mut self, step: f32) -> &mut Self {
        self.step = Some(step);
        self
    }

    pub fn name(&mut self, label: &str) -> &mut Self {
        self.label = label.to_string();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn step_size(&self) -> Option<f32> {
        self.step
    }

    pub fn get(&self, target: &T) -> f32 {
        (self.binding.get)(target)
    }

    /// Constrain `value` to the slider and write it to `target`.
    /// Returns the value that was actually written.
    pub fn set(&self, target: &mut T, value: f32) -> f32 {
        let value = self.constrain(value);
        (self.binding.set)(target, value);
        value
    }

    /// Clamp to `[min, max]` and snap to the nearest multiple of the step.
    ///
    /// Snapping happens in f64 so that e.g. `0.7` with a step of `0.0001` does not
    /// drift to `0.70000005`. The result is clamped again because snapping can
    /// step over a bound that is not itself a multiple of the step.
    pub fn constrain(&self, value: f32) -> f32 {
        let (min, max) = (self.min as f64, self.max as f64);
        let mut value = (value as f64).clamp(min, max);
        if let Some(step) = self.step.filter(|step| *step > 0.0) {
            let step = step as f64;
            value = (value / step).round() * step;
        }
        value.clamp(min, max) as f32
    }

    /// Position of the current value in the range, in `[0, 1]`.
    pub fn fraction(&self, target: &T) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.get(target) - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn value_at_fraction(&self, fraction: f32) -> f32 {
        self.min + fraction.clamp(0.0, 1.0) * (self.max - self.min)
    }

    /// The current value with as many decimals as the step has.
    pub fn display_value(&self, target: &T) -> String {
        let decimals = self
            .step
            .filter(|step| *step > 0.0)
            .map_or(2, |step| (-(step as f64).log10() - 1e-6).ceil().max(0.0) as usize);
        format!("{:.*}", decimals, self.get(target))
    }
}

impl<T> fmt::Debug for Slider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slider")
            .field("label", &self.label)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("step", &self.step)
            .finish()
    }
}

/// What the panel did with an input event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanelResponse {
    /// The event was meant for the panel and should not reach the camera controls.
    pub consumed: bool,
    /// Index of the slider that changed and the value written.
    pub changed: Option<(usize, f32)>,
}

impl PanelResponse {
    const IGNORED: Self = Self {
        consumed: false,
        changed: None,
    };
    const CONSUMED: Self = Self {
        consumed: true,
        changed: None,
    };
}

pub struct DebugPanel<T> {
    sliders: Vec<Slider<T>>,
    visible: bool,
    active: Option<usize>,
    hovered: Option<usize>,
    cursor: Option<(f32, f32)>,
    dirty: bool,
}

impl<T> Default for DebugPanel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for DebugPanel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugPanel")
            .field("sliders", &self.sliders)
            .field("visible", &self.visible)
            .field("active", &self.active)
            .finish()
    }
}

impl<T> DebugPanel<T> {
    pub fn new() -> Self {
        Self {
            sliders: Vec::new(),
            visible: true,
            active: None,
            hovered: None,
            cursor: None,
            dirty: true,
        }
    }

    /// Bind a value and return its slider for configuration.
    pub fn add(
        &mut self,
        get: impl Fn(&T) -> f32 + 'static,
        set: impl Fn(&mut T, f32) + 'static,
    ) -> &mut Slider<T> {
        let label = format!("value {}", self.sliders.len());
        self.sliders.push(Slider::new(Binding::new(get, set), label));
        self.dirty = true;
        let last = self.sliders.len() - 1;
        &mut self.sliders[last]
    }

    pub fn sliders(&self) -> &[Slider<T>] {
        &self.sliders
    }

    pub fn len(&self) -> usize {
        self.sliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sliders.is_empty()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.sliders.iter().position(|slider| slider.label == label)
    }

    pub fn slider(&self, label: &str) -> Option<&Slider<T>> {
        self.sliders.iter().find(|slider| slider.label == label)
    }

    /// Set the slider called `label` as if it had been dragged to `value`.
    pub fn set(&mut self, target: &mut T, label: &str, value: f32) -> Option<f32> {
        let slider = self.slider(label)?;
        let written = slider.set(target, value);
        self.dirty = true;
        Some(written)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.active = None;
            self.hovered = None;
            self.dirty = true;
        }
    }

    pub fn toggle_visible(&mut self) {
        self.set_visible(!self.visible);
    }

    /// Force the next [`DebugPanel::take_dirty`] to report a change, e.g. after a resize.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the panel has to be redrawn since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn panel_rect(&self, viewport_width: f32) -> Rect {
        Rect {
            x: viewport_width - PANEL_MARGIN - PANEL_WIDTH,
            y: 0.0,
            width: PANEL_WIDTH,
            height: ROW_HEIGHT * self.sliders.len() as f32,
        }
    }

    pub fn row_rect(&self, idx: usize, viewport_width: f32) -> Rect {
        let panel = self.panel_rect(viewport_width);
        Rect {
            x: panel.x,
            y: panel.y + idx as f32 * ROW_HEIGHT,
            width: panel.width,
            height: ROW_HEIGHT,
        }
    }

    /// The draggable part of a row, right of the label.
    pub fn track_rect(&self, idx: usize, viewport_width: f32) -> Rect {
        let row = self.row_rect(idx, viewport_width);
        let x = row.x + row.width * LABEL_FRACTION;
        Rect {
            x,
            y: row.y + TRACK_PADDING,
            width: row.x + row.width - TRACK_PADDING - x,
            height: row.height - 2.0 * TRACK_PADDING,
        }
    }

    fn row_at(&self, x: f32, y: f32, viewport_width: f32) -> Option<usize> {
        (0..self.sliders.len()).find(|idx| self.row_rect(*idx, viewport_width).contains(x, y))
    }

    fn drag_to(&mut self, target: &mut T, idx: usize, x: f32, viewport_width: f32) -> Option<(usize, f32)> {
        let track = self.track_rect(idx, viewport_width);
        let slider = self.sliders.get(idx)?;
        let fraction = (x - track.x) / track.width.max(1.0);
        let written = slider.set(target, slider.value_at_fraction(fraction));
        self.dirty = true;
        Some((idx, written))
    }

    /// Pointer moved to `(x, y)` in logical pixels.
    pub fn pointer_moved(&mut self, target: &mut T, x: f32, y: f32, viewport_width: f32) -> PanelResponse {
        self.cursor = Some((x, y));
        if let Some(idx) = self.active {
            return PanelResponse {
                consumed: true,
                changed: self.drag_to(target, idx, x, viewport_width),
            };
        }
        let hovered = if self.visible {
            self.row_at(x, y, viewport_width)
        } else {
            None
        };
        if hovered != self.hovered {
            self.hovered = hovered;
            self.dirty = true;
        }
        PanelResponse::IGNORED
    }

    /// Primary button pressed at the last known pointer position.
    pub fn pointer_pressed(&mut self, target: &mut T, viewport_width: f32) -> PanelResponse {
        let Some((x, y)) = self.cursor else {
            return PanelResponse::IGNORED;
        };
        if !self.visible || !self.panel_rect(viewport_width).contains(x, y) {
            return PanelResponse::IGNORED;
        }
        match self.row_at(x, y, viewport_width) {
            Some(idx) if self.track_rect(idx, viewport_width).contains(x, y) => {
                self.active = Some(idx);
                PanelResponse {
                    consumed: true,
                    changed: self.drag_to(target, idx, x, viewport_width),
                }
            }
            // Clicks on labels still belong to the panel.
            _ => PanelResponse::CONSUMED,
        }
    }

    pub fn pointer_released(&mut self) -> PanelResponse {
        match self.active.take() {
            Some(_) => {
                self.dirty = true;
                PanelResponse::CONSUMED
            }
            None => PanelResponse::IGNORED,
        }
    }

    pub fn pointer_left(&mut self) {
        self.cursor = None;
        if self.hovered.take().is_some() {
            self.dirty = true;
        }
    }

    /// Route a window event through the panel.
    ///
    /// `H` toggles visibility. Pointer input over a visible panel is consumed so
    /// that dragging a slider does not also orbit the camera.
    pub fn handle_window_event(
        &mut self,
        target: &mut T,
        event: &WindowEvent,
        viewport: &Viewport,
    ) -> PanelResponse {
        let viewport_width = viewport.width();
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(viewport.device_pixel_ratio);
                self.pointer_moved(target, logical.x, logical.y, viewport_width)
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer_left();
                PanelResponse::IGNORED
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.pointer_pressed(target, viewport_width),
                ElementState::Released => self.pointer_released(),
            },
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                ..
            } if self.hovered.is_some() => PanelResponse::CONSUMED,
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                match &event.logical_key {
                    Key::Character(c) if c.eq_ignore_ascii_case("h") => {
                        self.toggle_visible();
                        PanelResponse::CONSUMED
                    }
                    _ => PanelResponse::IGNORED,
                }
            }
            _ => PanelResponse::IGNORED,
        }
    }

    /// Name and value of every slider of the visible panel, in row order.
    pub fn labels(&self, target: &T, viewport_width: f32) -> Vec<Label> {
        if !self.visible {
            return Vec::new();
        }
        let mut labels = Vec::with_capacity(self.sliders.len() * 2);
        for (idx, slider) in self.sliders.iter().enumerate() {
            let row = self.row_rect(idx, viewport_width);
            let track = self.track_rect(idx, viewport_width);
            labels.push(Label {
                text: slider.label.clone(),
                rect: Rect {
                    x: row.x + LABEL_INSET,
                    width: track.x - row.x - LABEL_INSET,
                    ..row
                },
                colour: TEXT,
            });
            labels.push(Label {
                text: slider.display_value(target),
                rect: Rect {
                    x: track.x + TRACK_PADDING,
                    width: track.width - TRACK_PADDING,
                    ..row
                },
                colour: TEXT,
            });
        }
        labels
    }

    /// Layout of the visible panel as flat quads, back to front.
    pub fn quads(&self, target: &T, viewport_width: f32) -> Vec<Quad> {
        if !self.visible || self.sliders.is_empty() {
            return Vec::new();
        }
        let mut quads = vec![Quad {
            rect: self.panel_rect(viewport_width),
            colour: colour(BACKGROUND),
        }];
        for (idx, slider) in self.sliders.iter().enumerate() {
            let row = self.row_rect(idx, viewport_width);
            quads.push(Quad {
                rect: Rect {
                    width: 3.0,
                    ..row
                },
                colour: colour(ROW_MARKER),
            });
            let track = self.track_rect(idx, viewport_width);
            let hovered = self.hovered == Some(idx) || self.active == Some(idx);
            quads.push(Quad {
                rect: track,
                colour: colour(if hovered { TRACK_HOVER } else { TRACK }),
            });
            let fraction = slider.fraction(target);
            if fraction > 0.0 {
                quads.push(Quad {
                    rect: Rect {
                        width: track.width * fraction,
                        ..track
                    },
                    colour: colour(if self.active == Some(idx) {
                        FILL_ACTIVE
                    } else {
                        FILL
                    }),
                });
            }
        }
        quads
    }
}
