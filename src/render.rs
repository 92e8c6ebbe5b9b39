//! GPU side of the scene and the frame's render pass.
//!
//! [`SceneResources`] mirrors a [`Scene`]: one [`MeshResources`] per mesh node, one
//! [`MaterialResources`] per material, the light uniform, the cached standard
//! pipelines and the debug panel geometry. [`SceneResources::draw`] records a single
//! pass: opaque meshes, then transparent meshes back to front, then the panel.
//!
//! Nothing here touches the window, so the same code renders into an offscreen
//! texture for tests.

use std::collections::HashMap;

use anyhow::Context as _;
use cgmath::{InnerSpace, Vector3};

use crate::{
    data_structures::{
        material::MaterialId,
        model::DrawModel,
        scene_graph::Scene,
        texture::Texture,
    },
    panel::DebugPanel,
    pipelines::{
        light::LightResources,
        panel::{PanelResources, PanelViewport},
        standard::StandardPipelines,
    },
    resources::{
        Loaded, TextureTarget,
        material::{MaterialResources, Placeholders, standard_material_layout, upload_map, upload_texture},
        mesh::MeshResources,
    },
};

/// Colour and depth attachments of one frame.
pub struct RenderTarget<'a> {
    pub colour: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

#[derive(Debug)]
pub struct SceneResources {
    pub meshes: Vec<MeshResources>,
    pub materials: Vec<MaterialResources>,
    pub light: LightResources,
    pub pipelines: StandardPipelines,
    pub panel: PanelResources,
    material_layout: wgpu::BindGroupLayout,
    library: HashMap<String, Texture>,
}

impl SceneResources {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        scene: &Scene,
    ) -> Self {
        let material_layout = standard_material_layout(device);
        let placeholders = Placeholders::new(device, queue);
        let materials: Vec<MaterialResources> = scene
            .material_ids()
            .map(|(id, material)| MaterialResources::new(device, &material_layout, id, material, &placeholders))
            .collect();
        let meshes = scene.meshes().map(|node| MeshResources::new(device, node)).collect();
        let light = LightResources::new(device, scene.lights());

        let mut pipelines = StandardPipelines::new(
            device,
            format,
            &material_layout,
            camera_bind_group_layout,
            &light.bind_group_layout,
        );
        for material in &materials {
            pipelines.prepare(device, material.key);
        }
        log::info!(
            "Created {} meshes, {} materials and {} pipelines",
            scene.mesh_count(),
            materials.len(),
            pipelines.len()
        );

        Self {
            meshes,
            materials,
            light,
            pipelines,
            panel: PanelResources::new(device, queue, format),
            material_layout,
            library: HashMap::new(),
        }
    }

    fn material(&mut self, id: MaterialId) -> anyhow::Result<&mut MaterialResources> {
        self.materials
            .iter_mut()
            .find(|material| material.id == id)
            .with_context(|| format!("No GPU resources for material {:?}", id))
    }

    /// Upload a finished load and bind it to its slot.
    pub fn apply_loaded(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        loaded: Loaded,
    ) -> anyhow::Result<()> {
        match loaded {
            Loaded::Texture {
                target: TextureTarget::Map { material, kind },
                image,
            } => {
                let name = &scene.material(material).name;
                let label = format!("{} {}", name, kind.label());
                let texture = upload_map(device, queue, kind, &image, &label);
                let layout = self.material_layout.clone();
                self.material(material)?.set_map(device, &layout, name, kind, texture);
                log::info!("Bound {}", label);
            }
            Loaded::Texture {
                target: TextureTarget::Library { name, options },
                image,
            } => {
                let texture = upload_texture(device, queue, &image, &name, options);
                log::info!("Loaded {} into the texture library", name);
                self.library.insert(name, texture);
            }
            Loaded::CubeMap { material, faces } => {
                let name = &scene.material(material).name;
                let label = format!("{} environment map", name);
                let texture = Texture::create_cube(device, queue, &faces, &label)?;
                let layout = self.material_layout.clone();
                self.material(material)?.set_env_map(device, &layout, name, texture);
                log::info!("Bound {}", label);
            }
        }
        Ok(())
    }

    pub fn library_texture(&self, name: &str) -> Option<&Texture> {
        self.library.get(name)
    }

    /// Push the material uniforms after the CPU side changed, e.g. from a slider.
    pub fn write_materials(&self, queue: &wgpu::Queue, scene: &Scene) {
        for material in &self.materials {
            material.write_uniform(queue, scene.material(material.id));
        }
    }

    pub fn write_transforms(&mut self, queue: &wgpu::Queue, scene: &Scene) {
        for (resources, node) in self.meshes.iter_mut().zip(scene.meshes()) {
            resources.write_transform(queue, &node.transform);
        }
    }

    /// Rebuild the panel geometry and text for `viewport`.
    pub fn update_panel(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        panel: &DebugPanel<Scene>,
        scene: &Scene,
        viewport: PanelViewport,
    ) {
        self.panel.update(
            device,
            queue,
            &panel.quads(scene, viewport.width),
            &panel.labels(scene, viewport.width),
            viewport,
        );
    }

    fn is_transparent(&self, mesh: &MeshResources) -> bool {
        self.materials
            .iter()
            .find(|material| material.id == mesh.material)
            .is_some_and(|material| material.key.transparent)
    }

    /// Draw order: opaque meshes in scene order, then transparent meshes furthest
    /// from the camera first.
    pub fn draw_order(&self, camera_position: Vector3<f32>) -> Vec<usize> {
        let (mut transparent, opaque): (Vec<usize>, Vec<usize>) =
            (0..self.meshes.len()).partition(|idx| self.is_transparent(&self.meshes[*idx]));
        let distance = |idx: &usize| (self.meshes[*idx].position() - camera_position).magnitude2();
        transparent.sort_by(|a, b| distance(b).total_cmp(&distance(a)));
        opaque.into_iter().chain(transparent).collect()
    }

    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: RenderTarget<'_>,
        clear_colour: wgpu::Color,
        camera_bind_group: &wgpu::BindGroup,
        camera_position: Vector3<f32>,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.colour,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });

        for idx in self.draw_order(camera_position) {
            let mesh = &self.meshes[idx];
            let Some(material) = self.materials.iter().find(|m| m.id == mesh.material) else {
                log::warn!("Mesh {} has no material, skipping", mesh.mesh.name);
                continue;
            };
            let Some(pipeline) = self.pipelines.get(material.key) else {
                log::warn!("No pipeline for {:?}, skipping {}", material.key, mesh.mesh.name);
                continue;
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_vertex_buffer(1, mesh.instance_buffer.slice(..));
            render_pass.draw_mesh_instanced(
                &mesh.mesh,
                &material.bind_group,
                0..1,
                camera_bind_group,
                &self.light.bind_group,
            );
        }

        self.panel.draw(&mut render_pass);
    }
}
