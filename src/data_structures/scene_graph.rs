//! Scene graph: the ordered set of meshes and lights plus the materials they share.
//!
//! Nodes are only ever added. There is no removal API, so a node id stays valid
//! for the lifetime of the scene.

use cgmath::Vector3;

use crate::data_structures::{
    geometry::Geometry,
    instance::Instance,
    material::{MaterialId, StandardMaterial},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// A renderable object: geometry, the material it is shaded with and its transform.
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub name: String,
    pub geometry: Geometry,
    pub material: MaterialId,
    pub transform: Instance,
}

impl MeshNode {
    pub fn new(name: &str, geometry: Geometry, material: MaterialId) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            material,
            transform: Instance::new(),
        }
    }

    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.transform.position = position;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Ambient,
    Point { position: Vector3<f32> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub colour: [f32; 3],
    pub intensity: f32,
}

impl Light {
    pub fn ambient(colour: [f32; 3], intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            colour,
            intensity,
        }
    }

    pub fn point(colour: [f32; 3], intensity: f32, position: Vector3<f32>) -> Self {
        Self {
            kind: LightKind::Point { position },
            colour,
            intensity,
        }
    }

    /// Convert a packed `0xRRGGBB` colour; anything above the low 24 bits is ignored.
    pub fn hex_colour(hex: u32) -> [f32; 3] {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        [channel(16), channel(8), channel(0)]
    }
}

#[derive(Clone, Debug)]
pub enum SceneNode {
    Mesh(MeshNode),
    Light(Light),
}

impl From<MeshNode> for SceneNode {
    fn from(mesh: MeshNode) -> Self {
        SceneNode::Mesh(mesh)
    }
}

impl From<Light> for SceneNode {
    fn from(light: Light) -> Self {
        SceneNode::Light(light)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    materials: Vec<StandardMaterial>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: StandardMaterial) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add<N: Into<SceneNode>>(&mut self, node: N) -> NodeId {
        self.nodes.push(node.into());
        NodeId(self.nodes.len() - 1)
    }

    pub fn add_all<N: Into<SceneNode>>(&mut self, nodes: impl IntoIterator<Item = N>) -> Vec<NodeId> {
        nodes.into_iter().map(|node| self.add(node)).collect()
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &MeshNode> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::Mesh(mesh) => Some(mesh),
            SceneNode::Light(_) => None,
        })
    }

    pub fn meshes_mut(&mut self) -> impl Iterator<Item = &mut MeshNode> {
        self.nodes.iter_mut().filter_map(|node| match node {
            SceneNode::Mesh(mesh) => Some(mesh),
            SceneNode::Light(_) => None,
        })
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshNode> {
        self.meshes().find(|mesh| mesh.name == name)
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::Light(light) => Some(light),
            SceneNode::Mesh(_) => None,
        })
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes().count()
    }

    pub fn light_count(&self) -> usize {
        self.lights().count()
    }

    pub fn materials(&self) -> &[StandardMaterial] {
        &self.materials
    }

    /// Material ids are only handed out by [`Scene::add_material`] and materials are
    /// never removed, so every id indexes a live material.
    pub fn material(&self, id: MaterialId) -> &StandardMaterial {
        &self.materials[id.0]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut StandardMaterial {
        &mut self.materials[id.0]
    }

    /// Ids of all materials with their descriptions, in insertion order.
    pub fn material_ids(&self) -> impl Iterator<Item = (MaterialId, &StandardMaterial)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(idx, material)| (MaterialId(idx), material))
    }
}
