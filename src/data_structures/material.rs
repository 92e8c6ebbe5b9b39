//! Standard (metalness/roughness) material parameters.
//!
//! [`StandardMaterial`] is the CPU-side description: scalar factors that the debug
//! panel edits live, plus the asset paths of its texture maps. The GPU side lives
//! in [`crate::resources::material`].

use std::collections::BTreeMap;

use crate::data_structures::texture::TextureOptions;

/// Index of a material in its [`Scene`](super::scene_graph::Scene).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

/// Which faces of a mesh are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    pub fn cull_mode(&self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

/// The texture maps a standard material can sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKind {
    Colour,
    AmbientOcclusion,
    Alpha,
    Displacement,
    Metalness,
    Normal,
    Roughness,
}

impl MapKind {
    /// In bind group order.
    pub const ALL: [MapKind; 7] = [
        MapKind::Colour,
        MapKind::AmbientOcclusion,
        MapKind::Alpha,
        MapKind::Displacement,
        MapKind::Metalness,
        MapKind::Normal,
        MapKind::Roughness,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Only the colour map holds sRGB encoded colour, everything else is data.
    pub fn texture_options(&self) -> TextureOptions {
        match self {
            MapKind::Colour => TextureOptions::COLOUR,
            _ => TextureOptions::DATA,
        }
    }

    /// The texel used while the map is missing. Every value is neutral for its map:
    /// white colour, no occlusion, opaque, no displacement, full factor, flat normal.
    pub fn neutral_texel(&self) -> [u8; 4] {
        match self {
            MapKind::Displacement => [0, 0, 0, 255],
            MapKind::Normal => [127, 127, 255, 255],
            _ => [255, 255, 255, 255],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MapKind::Colour => "colour map",
            MapKind::AmbientOcclusion => "ambient occlusion map",
            MapKind::Alpha => "alpha map",
            MapKind::Displacement => "displacement map",
            MapKind::Metalness => "metalness map",
            MapKind::Normal => "normal map",
            MapKind::Roughness => "roughness map",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StandardMaterial {
    pub name: String,
    pub colour: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    pub ao_map_intensity: f32,
    pub env_map_intensity: f32,
    pub transparent: bool,
    pub side: Side,
    maps: BTreeMap<MapKind, String>,
    env_map: Option<[String; 6]>,
}

impl StandardMaterial {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            colour: [1.0, 1.0, 1.0, 1.0],
            metalness: 0.0,
            roughness: 1.0,
            displacement_scale: 1.0,
            displacement_bias: 0.0,
            ao_map_intensity: 1.0,
            env_map_intensity: 1.0,
            transparent: false,
            side: Side::Front,
            maps: BTreeMap::new(),
            env_map: None,
        }
    }

    pub fn with_map(mut self, kind: MapKind, path: &str) -> Self {
        self.maps.insert(kind, path.to_string());
        self
    }

    /// Six faces ordered +x, -x, +y, -y, +z, -z.
    pub fn with_env_map(mut self, faces: [&str; 6]) -> Self {
        self.env_map = Some(faces.map(str::to_string));
        self
    }

    pub fn map(&self, kind: MapKind) -> Option<&str> {
        self.maps.get(&kind).map(String::as_str)
    }

    pub fn maps(&self) -> impl Iterator<Item = (MapKind, &str)> {
        self.maps.iter().map(|(kind, path)| (*kind, path.as_str()))
    }

    pub fn env_map(&self) -> Option<&[String; 6]> {
        self.env_map.as_ref()
    }

    pub fn has_env_map(&self) -> bool {
        self.env_map.is_some()
    }

    pub fn pipeline_key(&self) -> PipelineKey {
        PipelineKey {
            side: self.side,
            transparent: self.transparent,
        }
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            colour: self.colour,
            metalness: self.metalness,
            roughness: self.roughness,
            displacement_scale: self.displacement_scale,
            displacement_bias: self.displacement_bias,
            ao_map_intensity: self.ao_map_intensity,
            // Without an environment the placeholder cube is black anyway, but a zero
            // keeps the shader from adding the split-sum term.
            env_map_intensity: if self.has_env_map() {
                self.env_map_intensity
            } else {
                0.0
            },
            _padding: [0.0; 2],
        }
    }
}

/// Render state that needs its own pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub side: Side,
    pub transparent: bool,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub colour: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
    pub ao_map_intensity: f32,
    pub env_map_intensity: f32,
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    pub _padding: [f32; 2],
}
