//! Orbit controls: rotate, pan and dolly a camera around a target point.
//!
//! Input events only accumulate deltas. The camera is moved in [`OrbitControls::update`],
//! which is called exactly once per frame by the render loop. With damping enabled
//! each update applies a fraction (`damping_factor`) of the pending delta and decays
//! the rest, so the camera eases out after the user lets go.
//!
//! Damping is frame-based: `update` takes no delta time. The easing speed therefore
//! follows the display refresh rate.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Vector3};
use winit::{
    dpi::LogicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::{
    camera::{Camera, Projection},
    context::Viewport,
};

const EPS: f32 = 0.000001;

/// Spherical coordinates with y up: `phi` is the polar angle from +y,
/// `theta` the azimuth around y measured from +z.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    /// Keep phi away from the poles so the view matrix never degenerates.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }

    pub fn to_offset(&self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragMode {
    None,
    Rotate,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enabled: bool,
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    spherical_delta: Spherical,
    pan_offset: Vector3<f32>,
    scale: f32,
    drag: DragMode,
    cursor: Option<LogicalPosition<f64>>,
}

impl OrbitControls {
    pub fn new<P: Into<Point3<f32>>>(target: P) -> Self {
        Self {
            enabled: true,
            target: target.into(),
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical::default(),
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            scale: 1.0,
            drag: DragMode::None,
            cursor: None,
        }
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = damping_factor;
        self
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Rotate by a pointer movement in logical pixels. A drag across the full
    /// viewport height turns the camera by one full revolution.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.rotate_left(2.0 * PI * dx / height * self.rotate_speed);
        self.rotate_up(2.0 * PI * dy / height * self.rotate_speed);
    }

    /// Move closer to the target.
    pub fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    /// Move away from the target.
    pub fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    /// Pan parallel to the screen so the point under the cursor follows it.
    pub fn pan_by_pixels(
        &mut self,
        dx: f32,
        dy: f32,
        camera: &Camera,
        projection: &Projection,
        viewport_height: f32,
    ) {
        let height = viewport_height.max(1.0);
        let offset = camera.position - self.target;
        let target_distance = offset.magnitude() * (projection.fovy.0 / 2.0).tan();

        let forward = (camera.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);

        let left = 2.0 * dx * target_distance / height * self.pan_speed;
        let upward = 2.0 * dy * target_distance / height * self.pan_speed;
        self.pan_offset += right * -left + up * upward;
    }

    /// Start or end a drag: left rotates, right pans, any release stops.
    pub fn button(&mut self, button: MouseButton, state: ElementState) -> bool {
        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => self.drag = DragMode::Rotate,
            (MouseButton::Right, ElementState::Pressed) => self.drag = DragMode::Pan,
            (_, ElementState::Released) => self.drag = DragMode::None,
            _ => return false,
        }
        true
    }

    /// Remember where the pointer is without acting on it, e.g. while a panel
    /// owns the pointer. The next drag then starts from here.
    pub fn track_cursor(&mut self, position: LogicalPosition<f64>) {
        self.cursor = Some(position);
    }

    /// Pointer moved to `position` in logical pixels. During a drag the distance
    /// from the last known position rotates or pans the camera.
    pub fn pointer_moved(
        &mut self,
        position: LogicalPosition<f64>,
        camera: &Camera,
        projection: &Projection,
        viewport_height: f32,
    ) -> bool {
        let Some(last) = self.cursor.replace(position) else {
            return false;
        };
        let dx = (position.x - last.x) as f32;
        let dy = (position.y - last.y) as f32;
        match self.drag {
            DragMode::Rotate => self.rotate_by_pixels(dx, dy, viewport_height),
            DragMode::Pan => self.pan_by_pixels(dx, dy, camera, projection, viewport_height),
            DragMode::None => return false,
        }
        true
    }

    /// Feed a window event into the controls.
    ///
    /// Returns `true` if the event was used. Rotation and panning only start on
    /// button presses, so callers can hide presses from the controls (for example
    /// when a debug panel took them) by simply not forwarding them.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        camera: &Camera,
        projection: &Projection,
        viewport: &Viewport,
    ) -> bool {
        if !self.enabled {
            return false;
        }
        match event {
            WindowEvent::MouseInput { state, button, .. } => self.button(*button, *state),
            WindowEvent::CursorMoved { position, .. } => self.pointer_moved(
                position.to_logical(viewport.device_pixel_ratio),
                camera,
                projection,
                viewport.height(),
            ),
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y as f64,
                    MouseScrollDelta::PixelDelta(position) => position.y,
                };
                let zoom = self.zoom_scale();
                if amount > 0.0 {
                    self.dolly_in(zoom);
                } else if amount < 0.0 {
                    self.dolly_out(zoom);
                } else {
                    return false;
                }
                true
            }
            _ => false,
        }
    }

    /// Advance the controls by one frame and move `camera` accordingly.
    ///
    /// Returns `true` if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();

        spherical.radius *= self.scale;
        spherical.radius = spherical.radius.clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        let previous = camera.position;
        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vector3::new(0.0, 0.0, 0.0);
        }
        self.scale = 1.0;

        (camera.position - previous).magnitude2() > EPS
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag != DragMode::None
    }
}
