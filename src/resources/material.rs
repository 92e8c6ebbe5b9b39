use wgpu::util::DeviceExt;

use crate::data_structures::{
    material::{MapKind, MaterialId, PipelineKey, StandardMaterial},
    texture::{Texture, TextureOptions, create_default_sampler},
};

const UNIFORM_BINDING: u32 = 0;
const SAMPLER_BINDING: u32 = 1;
const FIRST_MAP_BINDING: u32 = 2;
const ENV_BINDING: u32 = FIRST_MAP_BINDING + MapKind::ALL.len() as u32;

pub fn map_binding(kind: MapKind) -> u32 {
    FIRST_MAP_BINDING + kind.index() as u32
}

fn texture_entry(binding: u32, visibility: wgpu::ShaderStages, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    }
}

/// Uniform, one shared sampler, the seven maps in [`MapKind::ALL`] order and the
/// environment cube map.
pub fn standard_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let mut entries = vec![
        wgpu::BindGroupLayoutEntry {
            binding: UNIFORM_BINDING,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ];
    entries.extend(MapKind::ALL.iter().map(|kind| {
        // The displacement map moves vertices, everything else shades fragments.
        let visibility = match kind {
            MapKind::Displacement => wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            _ => wgpu::ShaderStages::FRAGMENT,
        };
        texture_entry(map_binding(*kind), visibility, wgpu::TextureViewDimension::D2)
    }));
    entries.push(texture_entry(
        ENV_BINDING,
        wgpu::ShaderStages::FRAGMENT,
        wgpu::TextureViewDimension::Cube,
    ));
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some("Standard material bind_group_layout"),
    })
}

/// Neutral 1x1 textures shared by every slot that has nothing better yet.
#[derive(Debug)]
pub struct Placeholders {
    maps: Vec<Texture>,
    env: Texture,
}

impl Placeholders {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let maps = MapKind::ALL
            .iter()
            .map(|kind| {
                Texture::create_solid(
                    device,
                    queue,
                    kind.neutral_texel(),
                    kind.texture_options(),
                    &format!("placeholder {}", kind.label()),
                )
            })
            .collect();
        Self {
            maps,
            env: Texture::create_blank_cube(device, queue),
        }
    }

    pub fn map(&self, kind: MapKind) -> &Texture {
        &self.maps[kind.index()]
    }

    pub fn env(&self) -> &Texture {
        &self.env
    }
}

/// GPU side of one [`StandardMaterial`].
#[derive(Debug)]
pub struct MaterialResources {
    pub id: MaterialId,
    pub key: PipelineKey,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    maps: Vec<Texture>,
    env: Texture,
    loaded: Vec<bool>,
    env_loaded: bool,
}

impl MaterialResources {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        id: MaterialId,
        material: &StandardMaterial,
        placeholders: &Placeholders,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Material Uniform Buffer", material.name)),
            contents: bytemuck::cast_slice(&[material.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = create_default_sampler(device);
        let maps: Vec<Texture> = MapKind::ALL.iter().map(|kind| placeholders.map(*kind).clone()).collect();
        let env = placeholders.env().clone();
        let bind_group = mk_bind_group(device, layout, &material.name, &uniform_buffer, &sampler, &maps, &env);
        Self {
            id,
            key: material.pipeline_key(),
            uniform_buffer,
            bind_group,
            sampler,
            maps,
            env,
            loaded: vec![false; MapKind::ALL.len()],
            env_loaded: false,
        }
    }

    /// Bind a loaded map. The bind group is rebuilt since wgpu bind groups are immutable.
    pub fn set_map(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, name: &str, kind: MapKind, texture: Texture) {
        self.maps[kind.index()] = texture;
        self.loaded[kind.index()] = true;
        self.rebuild(device, layout, name);
    }

    pub fn set_env_map(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, name: &str, texture: Texture) {
        self.env = texture;
        self.env_loaded = true;
        self.rebuild(device, layout, name);
    }

    pub fn is_loaded(&self, kind: MapKind) -> bool {
        self.loaded[kind.index()]
    }

    pub fn is_env_loaded(&self) -> bool {
        self.env_loaded
    }

    pub fn write_uniform(&self, queue: &wgpu::Queue, material: &StandardMaterial) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[material.to_uniform()]));
    }

    fn rebuild(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, name: &str) {
        self.bind_group = mk_bind_group(
            device,
            layout,
            name,
            &self.uniform_buffer,
            &self.sampler,
            &self.maps,
            &self.env,
        );
    }
}

/// Upload a decoded map with the colour space its slot expects.
pub fn upload_map(device: &wgpu::Device, queue: &wgpu::Queue, kind: MapKind, image: &image::RgbaImage, label: &str) -> Texture {
    upload_texture(device, queue, image, label, kind.texture_options())
}

pub fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &image::RgbaImage,
    label: &str,
    options: TextureOptions,
) -> Texture {
    Texture::from_rgba(device, queue, image, Some(label), options)
}

fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    name: &str,
    uniform_buffer: &wgpu::Buffer,
    sampler: &wgpu::Sampler,
    maps: &[Texture],
    env: &Texture,
) -> wgpu::BindGroup {
    let mut entries = vec![
        wgpu::BindGroupEntry {
            binding: UNIFORM_BINDING,
            resource: uniform_buffer.as_entire_binding(),
        },
        wgpu::BindGroupEntry {
            binding: SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(sampler),
        },
    ];
    entries.extend(MapKind::ALL.iter().zip(maps).map(|(kind, texture)| wgpu::BindGroupEntry {
        binding: map_binding(*kind),
        resource: wgpu::BindingResource::TextureView(&texture.view),
    }));
    entries.push(wgpu::BindGroupEntry {
        binding: ENV_BINDING,
        resource: wgpu::BindingResource::TextureView(&env.view),
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &entries,
        label: Some(&format!("{} material bind_group", name)),
    })
}
