use std::sync::Arc;

use anyhow::Context as _;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    window::Window,
};

use crate::{
    camera::{Camera, CameraResources, Projection},
    controls::OrbitControls,
    data_structures::texture,
    settings::Settings,
};

/// Size of the drawing area and the pixel density it is shown at.
///
/// The window's physical size is the source of truth. The logical (CSS) size is
/// derived from it and drives the camera aspect and the panel layout. The surface
/// is sized by [`Viewport::surface_size`], which only differs from the physical
/// size when the device pixel ratio is above `max_pixel_ratio`.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    physical: PhysicalSize<u32>,
    pub device_pixel_ratio: f64,
    pub max_pixel_ratio: f64,
}

impl Viewport {
    /// A viewport of `width` x `height` logical pixels.
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64, max_pixel_ratio: f64) -> Self {
        Self {
            physical: LogicalSize::new(width, height).to_physical(device_pixel_ratio),
            device_pixel_ratio,
            max_pixel_ratio,
        }
    }

    /// Build a viewport from a window's physical size and scale factor.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64, max_pixel_ratio: f64) -> Self {
        Self {
            physical: size,
            device_pixel_ratio: scale_factor,
            max_pixel_ratio,
        }
    }

    /// Resize to `width` x `height` logical pixels.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f64) {
        self.physical = LogicalSize::new(width, height).to_physical(device_pixel_ratio);
        self.device_pixel_ratio = device_pixel_ratio;
    }

    pub fn resize_physical(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        self.physical = size;
        self.device_pixel_ratio = scale_factor;
    }

    pub fn physical_size(&self) -> PhysicalSize<u32> {
        self.physical
    }

    pub fn logical_size(&self) -> LogicalSize<f64> {
        self.physical.to_logical(self.device_pixel_ratio)
    }

    /// Logical width.
    pub fn width(&self) -> f32 {
        self.logical_size().width as f32
    }

    /// Logical height.
    pub fn height(&self) -> f32 {
        self.logical_size().height as f32
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(self.max_pixel_ratio)
    }

    pub fn aspect(&self) -> f32 {
        self.physical.width as f32 / self.physical.height.max(1) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.physical.width == 0 || self.physical.height == 0
    }

    /// Surface size in physical pixels.
    ///
    /// Equal to the physical window size unless the pixel ratio is capped, in which
    /// case the logical size is scaled by the cap instead.
    pub fn surface_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        if ratio >= self.device_pixel_ratio {
            return (self.physical.width, self.physical.height);
        }
        let scale = ratio / self.device_pixel_ratio;
        (
            (self.physical.width as f64 * scale).round() as u32,
            (self.physical.height as f64 * scale).round() as u32,
        )
    }
}

/// Apply a new window size to the viewport and keep the camera aspect in sync.
///
/// Returns the new surface size, or `None` for an empty viewport (e.g. while
/// minimised), in which case the projection keeps its previous aspect.
pub fn resize_view(
    viewport: &mut Viewport,
    projection: &mut Projection,
    size: PhysicalSize<u32>,
    scale_factor: f64,
) -> Option<(u32, u32)> {
    viewport.resize_physical(size, scale_factor);
    let (width, height) = viewport.surface_size();
    if viewport.is_empty() || width == 0 || height == 0 {
        return None;
    }
    projection.resize(size.width, size.height);
    Some((width, height))
}

/// The pixel ratio cap that applies on this platform.
///
/// A native swapchain has to match the window, so only the web canvas, which the
/// browser scales to its CSS size, is rendered at a reduced resolution.
pub fn platform_pixel_ratio_cap(settings: &Settings) -> f64 {
    if cfg!(target_arch = "wasm32") {
        settings.max_pixel_ratio
    } else {
        f64::INFINITY
    }
}

/// Everything bound to the window: GPU handles, surface, camera and its controls.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub controls: OrbitControls,
    pub viewport: Viewport,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, settings: &Settings) -> anyhow::Result<Self> {
        let viewport = Viewport::from_physical(
            window.inner_size(),
            window.scale_factor(),
            platform_pixel_ratio_cap(settings),
        );
        let (width, height) = viewport.surface_size();

        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Cannot attach a surface to the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;

        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await
            .context("Cannot create the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The standard shader writes linear colour and relies on an sRGB surface
        // for the encode. Other formats will look too dark.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface supports no texture format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = Camera::from(&settings.camera);
        let projection = Projection::new(
            viewport.physical_size().width,
            viewport.physical_size().height,
            cgmath::Deg(settings.camera.fovy_deg),
            settings.camera.znear,
            settings.camera.zfar,
        );
        let mut controls = OrbitControls::new(settings.camera.target);
        controls.enable_damping = settings.enable_damping;
        controls.damping_factor = settings.damping_factor;
        let camera = CameraResources::new(&device, camera, &projection);

        let depth_texture =
            texture::Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            controls,
            viewport,
            clear_colour: settings.clear_colour,
        })
    }

    /// Apply a new window size and pixel density.
    ///
    /// Updates the viewport, the camera aspect, the surface configuration and the
    /// depth buffer. Returns `false` (and leaves the surface untouched) for an
    /// empty viewport.
    pub fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) -> bool {
        let Some((width, height)) = resize_view(&mut self.viewport, &mut self.projection, size, scale_factor)
        else {
            return false;
        };
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        true
    }
}
