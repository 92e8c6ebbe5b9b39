use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::{Light, LightKind};

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new<'a>(device: &wgpu::Device, lights: impl IntoIterator<Item = &'a Light>) -> Self {
        let uniform = LightUniform::from_lights(lights);
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

/// Every light of the scene folded into what the standard shader consumes: the
/// sum of all ambient lights and a single point light.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient_colour: [f32; 3],
    pub ambient_intensity: f32,
    pub point_position: [f32; 3],
    pub point_intensity: f32,
    pub point_colour: [f32; 3],
    // Doubles as the 16 byte padding of the block; 0.0 switches the point light off.
    pub point_enabled: f32,
}

impl LightUniform {
    pub fn from_lights<'a>(lights: impl IntoIterator<Item = &'a Light>) -> Self {
        let mut uniform = Self::default();
        let mut ambient = [0.0f32; 3];
        let mut point_lights = 0;
        for light in lights {
            match light.kind {
                LightKind::Ambient => {
                    for (sum, channel) in ambient.iter_mut().zip(light.colour) {
                        *sum += channel * light.intensity;
                    }
                }
                LightKind::Point { position } => {
                    point_lights += 1;
                    if point_lights > 1 {
                        continue;
                    }
                    uniform.point_position = position.into();
                    uniform.point_colour = light.colour;
                    uniform.point_intensity = light.intensity;
                    uniform.point_enabled = 1.0;
                }
            }
        }
        if point_lights > 1 {
            log::warn!(
                "The standard shader supports one point light, {} were added. Only the first one is used.",
                point_lights
            );
        }
        // Pre-multiplied so the shader can treat the intensity as a plain scale.
        uniform.ambient_colour = ambient;
        uniform.ambient_intensity = 1.0;
        uniform
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Uniform Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
