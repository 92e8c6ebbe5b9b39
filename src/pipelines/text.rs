//! Panel text, shaped by cosmic-text and drawn through glyphon.
//!
//! Labels come in logical pixels and are scaled to the surface here, so the
//! panel code never deals with physical sizes.

use std::fmt;

use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache, TextArea,
    TextAtlas, TextBounds, TextRenderer, Viewport,
};

use crate::{
    data_structures::texture::Texture,
    panel::{FONT_SIZE, Label, ROW_HEIGHT},
};

pub struct TextResources {
    font_system: FontSystem,
    swash_cache: SwashCache,
    viewport: Viewport,
    atlas: TextAtlas,
    renderer: TextRenderer,
    buffers: Vec<(Buffer, Label)>,
}

impl fmt::Debug for TextResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextResources")
            .field("labels", &self.buffers.len())
            .finish_non_exhaustive()
    }
}

impl TextResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let cache = Cache::new(device);
        let viewport = Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        // Same depth setup as the panel quads: shares the scene's attachment, always on top.
        let renderer = TextRenderer::new(
            &mut atlas,
            device,
            wgpu::MultisampleState::default(),
            Some(wgpu::DepthStencilState {
                format: Texture::DEPTH_FORMAT,
                depth_write_enabled: Some(false),
                depth_compare: Some(wgpu::CompareFunction::Always),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
        );
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            viewport,
            atlas,
            renderer,
            buffers: Vec::new(),
        }
    }

    /// Shape `labels` and upload their glyphs for a surface of `width` x `height`
    /// physical pixels. `scale` converts logical to physical pixels.
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        labels: &[Label],
        (width, height): (u32, u32),
        scale: f32,
    ) {
        self.atlas.trim();
        let metrics = Metrics::new(FONT_SIZE, ROW_HEIGHT);
        self.buffers = labels
            .iter()
            .map(|label| {
                let mut buffer = Buffer::new(&mut self.font_system, metrics);
                buffer.set_size(
                    &mut self.font_system,
                    Some(label.rect.width),
                    Some(label.rect.height),
                );
                buffer.set_text(
                    &mut self.font_system,
                    &label.text,
                    &Attrs::new().family(Family::SansSerif),
                    Shaping::Basic,
                    None,
                );
                buffer.shape_until_scroll(&mut self.font_system, false);
                (buffer, label.clone())
            })
            .collect();

        self.viewport.update(queue, Resolution { width, height });
        let areas = self.buffers.iter().map(|(buffer, label)| {
            let rect = label.rect;
            let [r, g, b] = label.colour;
            TextArea {
                buffer,
                left: rect.x * scale,
                top: rect.y * scale,
                scale,
                bounds: TextBounds {
                    left: (rect.x * scale).floor() as i32,
                    top: (rect.y * scale).floor() as i32,
                    right: ((rect.x + rect.width) * scale).ceil() as i32,
                    bottom: ((rect.y + rect.height) * scale).ceil() as i32,
                },
                default_color: Color::rgb(r, g, b),
                custom_glyphs: &[],
            }
        });
        if let Err(e) = self.renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            areas,
            &mut self.swash_cache,
        ) {
            log::warn!("Unable to prepare panel text: {}", e);
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.buffers.is_empty() {
            return;
        }
        if let Err(e) = self.renderer.render(&self.atlas, &self.viewport, render_pass) {
            log::warn!("Unable to draw panel text: {}", e);
        }
    }

    pub fn label_count(&self) -> usize {
        self.buffers.len()
    }
}
