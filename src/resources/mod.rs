//! Loading assets from disk (or the page origin on the web) and turning scene
//! descriptions into GPU resources.
//!
//! Loads are fire-and-forget: a [`LoadRequest`] is resolved off the render thread
//! into a decoded [`Loaded`] image which is then uploaded by the render thread.
//! Until that happens every material slot is bound to a neutral placeholder.

use std::fmt;

use image::RgbaImage;

use crate::data_structures::{
    material::{MapKind, MaterialId},
    scene_graph::Scene,
    texture::{TextureOptions, validate_cube_faces},
};

pub mod material;
pub mod mesh;
pub mod texture;

/// Where a loaded 2D image ends up.
#[derive(Clone, Debug, PartialEq)]
pub enum TextureTarget {
    /// One map slot of a material.
    Map { material: MaterialId, kind: MapKind },
    /// Kept by name without being bound to any material.
    Library { name: String, options: TextureOptions },
}

#[derive(Clone, Debug, PartialEq)]
pub enum LoadRequest {
    Texture { target: TextureTarget, path: String },
    CubeMap { material: MaterialId, faces: [String; 6] },
}

impl fmt::Display for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadRequest::Texture { path, .. } => write!(f, "texture {}", path),
            LoadRequest::CubeMap { faces, .. } => write!(f, "cube map {}", faces.join(", ")),
        }
    }
}

/// A decoded image waiting to be uploaded.
#[derive(Clone, Debug)]
pub enum Loaded {
    Texture { target: TextureTarget, image: RgbaImage },
    CubeMap { material: MaterialId, faces: Vec<RgbaImage> },
}

impl LoadRequest {
    /// Read and decode the request's image(s).
    pub async fn resolve(self, asset_root: &str) -> anyhow::Result<Loaded> {
        match self {
            LoadRequest::Texture { target, path } => {
                let image = texture::load_rgba(asset_root, &path).await?;
                Ok(Loaded::Texture { target, image })
            }
            LoadRequest::CubeMap { material, faces } => {
                let faces = texture::load_cube_faces(asset_root, &faces).await?;
                validate_cube_faces(&faces)?;
                Ok(Loaded::CubeMap { material, faces })
            }
        }
    }
}

/// Every map and environment referenced by the scene's materials, in material order.
pub fn material_requests(scene: &Scene) -> Vec<LoadRequest> {
    let mut requests = Vec::new();
    for (id, material) in scene.material_ids() {
        requests.extend(material.maps().map(|(kind, path)| LoadRequest::Texture {
            target: TextureTarget::Map { material: id, kind },
            path: path.to_string(),
        }));
        if let Some(faces) = material.env_map() {
            requests.push(LoadRequest::CubeMap {
                material: id,
                faces: faces.clone(),
            });
        }
    }
    requests
}
