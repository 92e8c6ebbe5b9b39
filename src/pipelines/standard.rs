use std::collections::HashMap;

use crate::data_structures::{
    instance::InstanceRaw,
    material::{PipelineKey, Side},
    model::{self, Vertex},
    texture::Texture,
};

/// Render pipelines of the standard material, one per [`PipelineKey`].
///
/// All variants share the shader module and the pipeline layout
/// (material, camera, light). They differ in culling and blending only.
#[derive(Debug)]
pub struct StandardPipelines {
    format: wgpu::TextureFormat,
    layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl StandardPipelines {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        material_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Standard Pipeline Layout"),
            bind_group_layouts: &[
                Some(material_bind_group_layout),
                Some(camera_bind_group_layout),
                Some(light_bind_group_layout),
            ],
            immediate_size: 0,
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Standard Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("standard.wgsl").into()),
        });
        Self {
            format,
            layout,
            shader,
            pipelines: HashMap::new(),
        }
    }

    /// Build the pipeline for `key` unless it already exists.
    pub fn prepare(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        log::debug!("Creating standard pipeline for {:?}", key);
        let pipeline = mk_standard_pipeline(device, &self.layout, &self.shader, self.format, key);
        self.pipelines.insert(key, pipeline);
    }

    pub fn get(&self, key: PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&key)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

fn mk_standard_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    // Transparent surfaces blend over what is behind them and keep writing depth,
    // which matches how the door is drawn on top of its own back faces.
    let blend = if key.transparent {
        wgpu::BlendState::ALPHA_BLENDING
    } else {
        wgpu::BlendState::REPLACE
    };
    let label = format!(
        "Standard Pipeline ({}{})",
        match key.side {
            Side::Front => "front",
            Side::Back => "back",
            Side::Double => "double",
        },
        if key.transparent { ", transparent" } else { "" }
    );
    mk_render_pipeline(
        device,
        layout,
        &label,
        format,
        Some(blend),
        Some(Texture::DEPTH_FORMAT),
        key.side.cull_mode(),
        &[model::ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    label: &str,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    cull_mode: Option<wgpu::Face>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
