#![allow(dead_code)]

use flow_materials::context::Viewport;

pub(crate) const EPSILON: f32 = 1e-5;

pub(crate) fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() <= EPSILON,
        "expected {expected}, got {actual}"
    );
}

pub(crate) fn viewport(width: u32, height: u32, device_pixel_ratio: f64) -> Viewport {
    Viewport::new(width, height, device_pixel_ratio, 2.0)
}

#[cfg(feature = "integration-tests")]
pub(crate) use offscreen::*;

#[cfg(feature = "integration-tests")]
mod offscreen {
    use std::time::Duration;

    use flow_materials::{
        camera::{Camera, CameraResources, Projection},
        data_structures::{scene_graph::Scene, texture::Texture},
        panel::DebugPanel,
        pipelines::panel::PanelViewport,
        render::{RenderTarget, SceneResources},
        settings::Settings,
    };

    pub(crate) const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// A device without a surface, or `None` if the machine has no usable adapter.
    pub(crate) async fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await
            .ok()
    }

    /// The showcase rendered into a texture instead of a window surface.
    pub(crate) struct Offscreen {
        pub(crate) width: u32,
        pub(crate) height: u32,
        pub(crate) camera: CameraResources,
        pub(crate) projection: Projection,
        pub(crate) resources: SceneResources,
        colour: wgpu::Texture,
        depth: Texture,
    }

    impl Offscreen {
        pub(crate) fn new(
            device: &wgpu::Device,
            queue: &wgpu::Queue,
            scene: &Scene,
            panel: &DebugPanel<Scene>,
            width: u32,
            height: u32,
        ) -> Self {
            let settings = Settings::default();
            let projection = Projection::new(
                width,
                height,
                cgmath::Deg(settings.camera.fovy_deg),
                settings.camera.znear,
                settings.camera.zfar,
            );
            let mut camera = CameraResources::new(device, Camera::from(&settings.camera), &projection);
            camera.write_to_buffer(queue, &projection);
            let mut resources =
                SceneResources::new(device, queue, FORMAT, &camera.bind_group_layout, scene);
            resources.update_panel(
                device,
                queue,
                panel,
                scene,
                PanelViewport {
                    width: width as f32,
                    height: height as f32,
                    scale: 1.0,
                },
            );

            let colour = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("offscreen colour"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
                view_formats: &[],
            });
            let depth = Texture::create_depth_texture(device, [width, height], "offscreen depth");
            Self {
                width,
                height,
                camera,
                projection,
                resources,
                colour,
                depth,
            }
        }

        /// Render one frame and read it back as tightly packed RGBA rows.
        pub(crate) async fn render(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Vec<u8> {
            let view = self
                .colour
                .create_view(&wgpu::TextureViewDescriptor::default());
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("offscreen encoder"),
            });
            let position = self.camera.camera.position;
            self.resources.draw(
                &mut encoder,
                RenderTarget {
                    colour: &view,
                    depth: &self.depth.view,
                },
                wgpu::Color::BLACK,
                &self.camera.bind_group,
                cgmath::Vector3::new(position.x, position.y, position.z),
            );

            let unpadded = 4 * self.width;
            let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
            let padded = unpadded.div_ceil(align) * align;
            let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                size: (padded * self.height) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                label: None,
                mapped_at_creation: false,
            });
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &self.colour,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &output_buffer,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(padded),
                        rows_per_image: Some(self.height),
                    },
                },
                wgpu::Extent3d {
                    width: self.width,
                    height: self.height,
                    depth_or_array_layers: 1,
                },
            );
            queue.submit(std::iter::once(encoder.finish()));

            let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
            let buffer_slice = output_buffer.slice(..);
            buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
                tx.send(result).unwrap();
            });
            device
                .poll(wgpu::PollType::Wait {
                    submission_index: None,
                    timeout: Some(Duration::from_secs(3)),
                })
                .unwrap();
            rx.receive().await.unwrap().unwrap();

            let data = buffer_slice.get_mapped_range();
            data.chunks(padded as usize)
                .flat_map(|row| &row[..unpadded as usize])
                .copied()
                .collect()
        }
    }
}
