//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around WGPU GPU texture resources,
//! and helper methods for creating depth textures, neutral placeholder maps, cube
//! maps, and loading textures from image data.

use anyhow::*;
use image::RgbaImage;

/// How an image's texels are interpreted and sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureOptions {
    /// Linear data (normal, roughness, height...) instead of sRGB encoded colour.
    pub linear: bool,
    pub filter: wgpu::FilterMode,
}

impl TextureOptions {
    pub const COLOUR: Self = Self {
        linear: false,
        filter: wgpu::FilterMode::Linear,
    };
    pub const DATA: Self = Self {
        linear: true,
        filter: wgpu::FilterMode::Linear,
    };

    pub fn format(&self) -> wgpu::TextureFormat {
        if self.linear {
            wgpu::TextureFormat::Rgba8Unorm
        } else {
            wgpu::TextureFormat::Rgba8UnormSrgb
        }
    }
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self::COLOUR
    }
}

/// A GPU texture with a view and optional sampler.
///
/// Material maps come from [`from_rgba`](Self::from_rgba) or, as placeholders,
/// [`create_solid`](Self::create_solid); environments from
/// [`create_cube`](Self::create_cube).
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Depth attachment of `size` physical pixels. Zero sizes are bumped to 1.
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        }));

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Create a 1x1 texture of a single colour.
    ///
    /// Used as the stand-in for every material map until (or unless) the real image
    /// arrives, so the shaders never need to branch on missing maps.
    pub fn create_solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        options: TextureOptions,
        label: &str,
    ) -> Texture {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        Self::from_rgba(device, queue, &image, Some(label), options)
    }

    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &RgbaImage,
        label: Option<&str>,
        options: TextureOptions,
    ) -> Self {
        let dimensions = rgba.dimensions();
        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: options.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        write_layer(queue, &texture, rgba, 0);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_sampler(device, options.filter));

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Create a cube map from six square faces ordered +x, -x, +y, -y, +z, -z.
    pub fn create_cube(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[RgbaImage],
        label: &str,
    ) -> Result<Self> {
        validate_cube_faces(faces)?;
        Ok(Self::upload_cube(device, queue, faces, label))
    }

    fn upload_cube(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[RgbaImage],
        label: &str,
    ) -> Self {
        let (width, height) = faces[0].dimensions();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TextureOptions::COLOUR.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (layer, face) in faces.iter().enumerate() {
            write_layer(queue, &texture, face, layer as u32);
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = Some(create_sampler(device, wgpu::FilterMode::Linear));

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// A 1x1 black cube map, the placeholder for materials without an environment.
    pub fn create_blank_cube(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let face = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]));
        let faces = vec![face; 6];
        Self::upload_cube(device, queue, &faces, "blank environment map")
    }
}

/// Cube faces must be six squares of the same size.
pub fn validate_cube_faces(faces: &[RgbaImage]) -> Result<()> {
    if faces.len() != 6 {
        bail!("A cube map needs 6 faces but got {}", faces.len());
    }
    let (width, height) = faces[0].dimensions();
    if width != height || width == 0 {
        bail!("Cube map faces must be square but the first face is {width}x{height}");
    }
    if let Some((idx, face)) = faces
        .iter()
        .enumerate()
        .find(|(_, face)| face.dimensions() != (width, height))
    {
        let (w, h) = face.dimensions();
        bail!("Cube map face {idx} is {w}x{h} but face 0 is {width}x{height}");
    }
    Ok(())
}

fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, rgba: &RgbaImage, layer: u32) {
    let (width, height) = rgba.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

pub fn create_sampler(device: &wgpu::Device, filter: wgpu::FilterMode) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::MipmapFilterMode::Linear,
        ..Default::default()
    })
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    create_sampler(device, wgpu::FilterMode::Linear)
}
