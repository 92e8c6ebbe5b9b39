use wgpu::util::DeviceExt;

#[cfg(feature = "ui")]
use super::text::TextResources;
use crate::{
    data_structures::texture::Texture,
    panel::{Label, Quad, Rect},
};

/// Logical size of the viewport the panel is laid out in, and the factor from
/// logical to surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelViewport {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl PanelViewport {
    pub fn surface_size(&self) -> (u32, u32) {
        (
            (self.width * self.scale).round().max(1.0) as u32,
            (self.height * self.scale).round().max(1.0) as u32,
        )
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PanelVertex {
    /// Normalised device coordinates.
    pub position: [f32; 2],
    pub colour: [f32; 4],
}

impl PanelVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<PanelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Convert a rectangle in logical pixels (origin top left) to NDC corners
/// ordered top left, bottom left, bottom right, top right.
pub fn rect_to_ndc(rect: &Rect, width: f32, height: f32) -> [[f32; 2]; 4] {
    let (width, height) = (width.max(1.0), height.max(1.0));
    let left = rect.x / width * 2.0 - 1.0;
    let right = (rect.x + rect.width) / width * 2.0 - 1.0;
    let top = 1.0 - rect.y / height * 2.0;
    let bottom = 1.0 - (rect.y + rect.height) / height * 2.0;
    [[left, top], [left, bottom], [right, bottom], [right, top]]
}

/// Triangulate the quads, two counter clockwise triangles each.
pub fn mk_vertices(quads: &[Quad], width: f32, height: f32) -> (Vec<PanelVertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(quads.len() * 4);
    let mut indices = Vec::with_capacity(quads.len() * 6);
    for quad in quads {
        let base = vertices.len() as u16;
        vertices.extend(
            rect_to_ndc(&quad.rect, width, height)
                .into_iter()
                .map(|position| PanelVertex {
                    position,
                    colour: quad.colour,
                }),
        );
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

/// The panel's GPU side: a flat colour pipeline, the geometry of the last layout
/// and, with the `ui` feature, its text.
#[derive(Debug)]
pub struct PanelResources {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    num_indices: u32,
    #[cfg(feature = "ui")]
    text: TextResources,
}

impl PanelResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        #[cfg(not(feature = "ui"))]
        let _ = queue;
        Self {
            pipeline: mk_panel_pipeline(device, format),
            vertex_buffer: None,
            index_buffer: None,
            num_indices: 0,
            #[cfg(feature = "ui")]
            text: TextResources::new(device, queue, format),
        }
    }

    /// Replace the geometry and text with a new layout.
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        quads: &[Quad],
        labels: &[Label],
        viewport: PanelViewport,
    ) {
        #[cfg(feature = "ui")]
        self.text
            .update(device, queue, labels, viewport.surface_size(), viewport.scale);
        #[cfg(not(feature = "ui"))]
        let _ = (queue, labels);

        let (vertices, indices) = mk_vertices(quads, viewport.width, viewport.height);
        self.num_indices = indices.len() as u32;
        if indices.is_empty() {
            self.vertex_buffer = None;
            self.index_buffer = None;
            return;
        }
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Panel Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Panel Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    /// Number of text labels prepared by the last update.
    #[cfg(feature = "ui")]
    pub fn label_count(&self) -> usize {
        self.text.label_count()
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&self.vertex_buffer, &self.index_buffer) else {
            return;
        };
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.num_indices, 0, 0..1);

        #[cfg(feature = "ui")]
        self.text.draw(render_pass);
    }
}

fn mk_panel_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Panel Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("panel.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Panel Render Pipeline Layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Panel Render Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[PanelVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        // Shares the scene's depth attachment but always draws on top.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: Some(false),
            depth_compare: Some(wgpu::CompareFunction::Always),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
        cache: None,
    })
}
