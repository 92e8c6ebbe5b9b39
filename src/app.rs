//! Window, event loop and the per-frame render loop.
//!
//! [`run`] creates the winit event loop and hands it an [`App`]. Once the window
//! exists the app builds the GPU context and the showcase scene, spawns the texture
//! loads and starts the render loop, which keeps itself alive by requesting a redraw
//! at the end of every tick.
//!
//! All mutation happens on the event loop thread. Decoded textures come back as
//! [`SceneEvent::TextureLoaded`] user events and are uploaded between frames.

use std::{fmt::Debug, iter, sync::Arc};

use anyhow::Context as _;
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::Window,
};

use crate::{
    context::Context,
    data_structures::scene_graph::Scene,
    panel::DebugPanel,
    pipelines::panel::PanelViewport,
    render::{RenderTarget, SceneResources},
    resources::{LoadRequest, Loaded},
    scene::{self, Bootstrap},
    settings::Settings,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Frame clock with an explicit stop flag.
#[derive(Debug)]
pub struct RenderLoop {
    clock: Instant,
    running: bool,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            clock: Instant::now(),
            running: true,
            frames: 0,
        }
    }

    /// Seconds since the loop started, or `None` once it was stopped.
    pub fn tick(&mut self) -> Option<f32> {
        if !self.running {
            return None;
        }
        self.frames += 1;
        Some(self.clock.elapsed().as_secs_f32())
    }

    pub fn stop(&mut self) {
        if self.running {
            log::info!("Render loop stopped after {} frames", self.frames);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Rotate every mesh as a function of elapsed seconds.
pub fn spin(scene: &mut Scene, elapsed: f32) {
    for mesh in scene.meshes_mut() {
        mesh.transform.set_euler(0.15 * elapsed, 0.2 * elapsed, 0.0);
    }
}

/// Whether pressing `key` ends the app. Only native builds have one; the web
/// build runs until the page goes away.
pub fn is_stop_key(key: &Key) -> bool {
    cfg!(not(target_arch = "wasm32")) && *key == Key::Named(NamedKey::Escape)
}

pub enum SceneEvent {
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<AppState>),
    TextureLoaded(Loaded),
    Stop,
}

impl Debug for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::TextureLoaded(Loaded::Texture { target, .. }) => {
                f.debug_tuple("TextureLoaded").field(target).finish()
            }
            Self::TextureLoaded(Loaded::CubeMap { material, .. }) => {
                f.debug_tuple("TextureLoaded").field(material).finish()
            }
            Self::Stop => f.write_str("Stop"),
        }
    }
}

/// Stops a running app from outside the event loop, e.g. from another thread.
#[derive(Clone)]
pub struct StopHandle(EventLoopProxy<SceneEvent>);

impl StopHandle {
    /// Returns `false` if the event loop is already gone.
    pub fn stop(&self) -> bool {
        self.0.send_event(SceneEvent::Stop).is_ok()
    }
}

pub struct AppState {
    pub(crate) ctx: Context,
    scene: Scene,
    panel: DebugPanel<Scene>,
    resources: SceneResources,
    render_loop: RenderLoop,
    pending_loads: Vec<LoadRequest>,
    spin_meshes: bool,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, settings: &Settings) -> anyhow::Result<Self> {
        let ctx = Context::new(window, settings).await?;
        let Bootstrap {
            scene, panel, loads, ..
        } = scene::bootstrap();
        let resources = SceneResources::new(
            &ctx.device,
            &ctx.queue,
            ctx.config.format,
            &ctx.camera.bind_group_layout,
            &scene,
        );
        Ok(Self {
            ctx,
            scene,
            panel,
            resources,
            render_loop: RenderLoop::new(),
            pending_loads: loads,
            spin_meshes: settings.spin_meshes,
            is_surface_configured: false,
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        self.is_surface_configured = self.ctx.resize(size, scale_factor);
        if self.is_surface_configured {
            log::debug!(
                "Resized to {}x{} logical, surface {}x{}",
                self.ctx.viewport.width(),
                self.ctx.viewport.height(),
                self.ctx.config.width,
                self.ctx.config.height
            );
        }
        self.panel.mark_dirty();
    }

    fn reconfigure(&mut self) {
        let window = self.ctx.window.clone();
        self.resize(window.inner_size(), window.scale_factor());
    }

    /// One frame: sample the clock, step the controls, upload the camera, render.
    fn tick(&mut self) -> Result<(), wgpu::SurfaceError> {
        let Some(elapsed) = self.render_loop.tick() else {
            return Ok(());
        };
        if self.spin_meshes {
            spin(&mut self.scene, elapsed);
            self.resources.write_transforms(&self.ctx.queue, &self.scene);
        }
        self.ctx.controls.update(&mut self.ctx.camera.camera);
        self.ctx.camera.write_to_buffer(&self.ctx.queue, &self.ctx.projection);
        self.render()
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.is_surface_configured {
            return Ok(());
        }
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if self.panel.take_dirty() {
            let viewport = PanelViewport {
                width: self.ctx.viewport.width(),
                height: self.ctx.viewport.height(),
                scale: self.ctx.config.width as f32 / self.ctx.viewport.width().max(1.0),
            };
            self.resources.update_panel(
                &self.ctx.device,
                &self.ctx.queue,
                &self.panel,
                &self.scene,
                viewport,
            );
        }

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        let camera_position = self.ctx.camera.camera.position;
        self.resources.draw(
            &mut encoder,
            RenderTarget {
                colour: &view,
                depth: &self.ctx.depth_texture.view,
            },
            self.ctx.clear_colour,
            &self.ctx.camera.bind_group,
            cgmath::Vector3::new(camera_position.x, camera_position.y, camera_position.z),
        );
        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn apply_loaded(&mut self, loaded: Loaded) {
        if let Err(e) = self
            .resources
            .apply_loaded(&self.ctx.device, &self.ctx.queue, &self.scene, loaded)
        {
            log::error!("Unable to upload texture: {:#}", e);
        }
    }

    /// Input goes to the panel first; whatever it leaves reaches the orbit controls.
    fn handle_input(&mut self, event: &WindowEvent) {
        let response = self
            .panel
            .handle_window_event(&mut self.scene, event, &self.ctx.viewport);
        if let Some((idx, value)) = response.changed {
            self.resources.write_materials(&self.ctx.queue, &self.scene);
            if let Some(slider) = self.panel.sliders().get(idx) {
                log::debug!("{} = {}", slider.label(), value);
                // Without panel text the title is the only place the value shows up.
                #[cfg(not(feature = "ui"))]
                self.ctx
                    .window
                    .set_title(&format!("{}: {}", slider.label(), value));
            }
        }
        if !response.consumed {
            self.ctx.controls.handle_window_event(
                event,
                &self.ctx.camera.camera,
                &self.ctx.projection,
                &self.ctx.viewport,
            );
        } else if let WindowEvent::CursorMoved { position, .. } = event {
            self.ctx
                .controls
                .track_cursor(position.to_logical(self.ctx.viewport.device_pixel_ratio));
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<SceneEvent>,
    settings: Settings,
    state: Option<AppState>,
    initializing: bool,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<SceneEvent>, settings: Settings) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().context("Cannot start the tokio runtime")?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            settings,
            state: None,
            initializing: false,
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    /// Hand a freshly created state its first size and start its texture loads.
    fn start(&mut self, mut state: AppState) {
        state.reconfigure();
        let loads = std::mem::take(&mut state.pending_loads);
        self.spawn_loads(loads);
        state.ctx.window.request_redraw();
        log::info!("Render loop started");
        self.state = Some(state);
    }

    /// Resolve loads off the event loop thread; results come back as user events.
    fn spawn_loads(&self, requests: Vec<LoadRequest>) {
        for request in requests {
            let proxy = self.proxy.clone();
            let asset_root = self.settings.asset_root.clone();
            let load = async move {
                let description = request.to_string();
                match request.resolve(&asset_root).await {
                    Ok(loaded) => {
                        if proxy.send_event(SceneEvent::TextureLoaded(loaded)).is_err() {
                            log::warn!("Event loop closed before {} arrived", description);
                        }
                    }
                    Err(e) => log::error!("Unable to load {}: {:#}", description, e),
                }
            };
            #[cfg(not(target_arch = "wasm32"))]
            self.async_runtime.spawn(load);
            #[cfg(target_arch = "wasm32")]
            wasm_bindgen_futures::spawn_local(load);
        }
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.render_loop.stop();
        }
        event_loop.exit();
    }
}

#[cfg(target_arch = "wasm32")]
fn find_canvas(selector: &str) -> anyhow::Result<web_sys::HtmlCanvasElement> {
    use wasm_bindgen::JsCast;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .context("No document to attach the canvas to")?;
    let element = document
        .query_selector(selector)
        .map_err(|e| anyhow::anyhow!("Invalid canvas selector {}: {:?}", selector, e))?
        .with_context(|| format!("No element matches {}", selector))?;
    element
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| anyhow::anyhow!("{} is not a canvas", selector))
}

impl ApplicationHandler<SceneEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.initializing {
            return;
        }
        self.initializing = true;

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("flow-materials");

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            match find_canvas(&self.settings.canvas_selector) {
                Ok(canvas) => window_attributes = window_attributes.with_canvas(Some(canvas)),
                Err(e) => return self.fail(event_loop, e),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, anyhow::anyhow!("Cannot create the window: {}", e)),
        };

        let settings = self.settings.clone();
        let init_future = async move { AppState::new(window, &settings).await };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => self.start(state),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(state) => {
                        if proxy.send_event(SceneEvent::Initialized(Box::new(state))).is_err() {
                            log::error!("Event loop closed during initialisation");
                        }
                    }
                    Err(e) => {
                        log::error!("{:#}", e);
                        let _ = proxy.send_event(SceneEvent::Stop);
                    }
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: SceneEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            SceneEvent::Initialized(state) => self.start(*state),
            SceneEvent::TextureLoaded(loaded) => {
                if let Some(state) = &mut self.state {
                    state.apply_loaded(loaded);
                }
            }
            SceneEvent::Stop => self.stop(event_loop),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match &event {
            WindowEvent::CloseRequested => return self.stop(event_loop),
            WindowEvent::KeyboardInput { event: key, .. }
                if key.state.is_pressed() && is_stop_key(&key.logical_key) =>
            {
                return self.stop(event_loop);
            }
            WindowEvent::Resized(size) => {
                let scale_factor = state.ctx.window.scale_factor();
                state.resize(*size, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = state.ctx.window.inner_size();
                state.resize(size, *scale_factor);
            }
            WindowEvent::RedrawRequested => {
                match state.tick() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.reconfigure(),
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                        state.render_loop.stop();
                    }
                }
                if state.render_loop.is_running() {
                    state.ctx.window.request_redraw();
                } else {
                    event_loop.exit();
                }
                return;
            }
            _ => {}
        }

        state.handle_input(&event);
    }
}

/// Open the window and run the showcase until it is closed or stopped.
pub fn run(settings: Settings) -> anyhow::Result<()> {
    run_with(settings, |_| {})
}

/// Like [`run`], handing `on_start` a [`StopHandle`] before the loop starts.
pub fn run_with(settings: Settings, on_start: impl FnOnce(StopHandle)) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).context("Could not initialize logger")?;
    }

    let event_loop: EventLoop<SceneEvent> = EventLoop::with_user_event().build()?;
    on_start(StopHandle(event_loop.create_proxy()));

    let mut app = App::new(&event_loop, settings)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run(Settings::from_env()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
