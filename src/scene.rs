//! The material showcase: a displaced, alpha-mapped door between an
//! environment-mapped sphere and torus.

use cgmath::Vector3;

use crate::{
    data_structures::{
        geometry::Geometry,
        material::{MapKind, MaterialId, Side, StandardMaterial},
        scene_graph::{Light, MeshNode, Scene},
        texture::TextureOptions,
    },
    panel::DebugPanel,
    resources::{LoadRequest, TextureTarget, material_requests},
};

pub const DOOR_MAPS: [(MapKind, &str); 7] = [
    (MapKind::Colour, "textures/door/color.jpg"),
    (MapKind::AmbientOcclusion, "textures/door/ambientOcclusion.jpg"),
    (MapKind::Alpha, "textures/door/alpha.jpg"),
    (MapKind::Displacement, "textures/door/height.jpg"),
    (MapKind::Metalness, "textures/door/metalness.jpg"),
    (MapKind::Normal, "textures/door/normal.jpg"),
    (MapKind::Roughness, "textures/door/roughness.jpg"),
];
pub const GRADIENT: &str = "textures/gradients/3.jpg";
pub const MATCAP: &str = "textures/matcaps/3.png";
pub const ENVIRONMENT_MAP: [&str; 6] = [
    "textures/environmentMaps/1/px.jpg",
    "textures/environmentMaps/1/nx.jpg",
    "textures/environmentMaps/1/py.jpg",
    "textures/environmentMaps/1/ny.jpg",
    "textures/environmentMaps/1/pz.jpg",
    "textures/environmentMaps/1/nz.jpg",
];

pub const SLIDER_STEP: f32 = 0.0001;

/// Everything the showcase needs before the first frame.
#[derive(Debug)]
pub struct Bootstrap {
    pub scene: Scene,
    pub panel: DebugPanel<Scene>,
    /// Texture loads to spawn once a GPU context exists.
    pub loads: Vec<LoadRequest>,
    pub door: MaterialId,
    pub environment: MaterialId,
}

pub fn door_material() -> StandardMaterial {
    let mut material = DOOR_MAPS
        .iter()
        .fold(StandardMaterial::new("door"), |material, (kind, path)| {
            material.with_map(*kind, path)
        });
    material.metalness = 0.0;
    material.roughness = 1.0;
    material.displacement_scale = 0.05;
    material.transparent = true;
    material.side = Side::Double;
    material
}

pub fn environment_material() -> StandardMaterial {
    let mut material = StandardMaterial::new("environment").with_env_map(ENVIRONMENT_MAP);
    material.metalness = 0.45;
    material.roughness = 0.0;
    material
}

/// Build the scene graph, its debug panel and the texture loads. Nothing is loaded
/// or uploaded here.
pub fn bootstrap() -> Bootstrap {
    let mut scene = Scene::new();
    let door = scene.add_material(door_material());
    let environment = scene.add_material(environment_material());

    scene.add_all([
        MeshNode::new("sphere", Geometry::sphere(0.5, 16, 16), environment).at(Vector3::new(-1.5, 0.0, 0.0)),
        MeshNode::new("plane", Geometry::plane(1.0, 1.0, 100, 100), door),
        MeshNode::new("torus", Geometry::torus(0.3, 0.2, 16, 32), environment).at(Vector3::new(1.5, 0.0, 0.0)),
    ]);
    scene.add_all([
        Light::ambient(Light::hex_colour(0xffffff), 0.5),
        Light::point(Light::hex_colour(0xffffff), 0.5, Vector3::new(2.0, 3.0, 4.0)),
    ]);

    let mut panel = DebugPanel::new();
    bind_scalar(&mut panel, door, "door metalness", |m| m.metalness, |m, v| m.metalness = v);
    bind_scalar(&mut panel, door, "door roughness", |m| m.roughness, |m, v| m.roughness = v);
    bind_scalar(&mut panel, environment, " metalness", |m| m.metalness, |m, v| m.metalness = v);
    bind_scalar(&mut panel, environment, " roughness", |m| m.roughness, |m, v| m.roughness = v);

    let mut loads = material_requests(&scene);
    loads.extend([GRADIENT, MATCAP].map(|path| LoadRequest::Texture {
        target: TextureTarget::Library {
            name: path.to_string(),
            options: TextureOptions::COLOUR,
        },
        path: path.to_string(),
    }));

    log::info!(
        "Scene bootstrapped with {} meshes, {} lights and {} texture loads",
        scene.mesh_count(),
        scene.light_count(),
        loads.len()
    );

    Bootstrap {
        scene,
        panel,
        loads,
        door,
        environment,
    }
}

/// Bind one `f32` field of a material to a `[0, 1]` slider.
fn bind_scalar(
    panel: &mut DebugPanel<Scene>,
    id: MaterialId,
    label: &str,
    get: fn(&StandardMaterial) -> f32,
    set: fn(&mut StandardMaterial, f32),
) {
    panel
        .add(
            move |scene| get(scene.material(id)),
            move |scene, value| set(scene.material_mut(id), value),
        )
        .min(0.0)
        .max(1.0)
        .step(SLIDER_STEP)
        .name(label);
}
