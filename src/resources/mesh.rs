use wgpu::util::DeviceExt;

use crate::data_structures::{
    instance::Instance,
    material::MaterialId,
    model,
    scene_graph::MeshNode,
};

/// An uploaded mesh node: geometry buffers plus a one-element instance buffer
/// carrying its transform.
#[derive(Debug)]
pub struct MeshResources {
    pub mesh: model::Mesh,
    pub instance_buffer: wgpu::Buffer,
    pub material: MaterialId,
    position: cgmath::Vector3<f32>,
}

impl MeshResources {
    pub fn new(device: &wgpu::Device, node: &MeshNode) -> Self {
        let mesh = model::Mesh::from_geometry(device, &node.name, &node.geometry);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Instance Buffer", node.name)),
            contents: bytemuck::cast_slice(&[node.transform.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            mesh,
            instance_buffer,
            material: node.material,
            position: node.transform.position,
        }
    }

    pub fn write_transform(&mut self, queue: &wgpu::Queue, transform: &Instance) {
        self.position = transform.position;
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&[transform.to_raw()]));
    }

    /// World position of the mesh origin, used to sort transparent meshes.
    pub fn position(&self) -> cgmath::Vector3<f32> {
        self.position
    }
}
