//! Literal configuration of the material showcase.
//!
//! Everything the scene needs to know up front (asset locations, camera placement,
//! surface limits) lives in [`Settings`]. The defaults reproduce the showcase as
//! shipped; the only runtime override is the `FLOW_ASSETS` environment variable for
//! native builds.

/// Environment variable that points native builds at a different asset root.
pub const ASSET_ROOT_ENV: &str = "FLOW_ASSETS";

#[derive(Clone, Debug)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fovy_deg: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [1.0, 1.0, 2.0],
            target: [0.0, 0.0, 0.0],
            fovy_deg: 75.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// Root directory (native) that all texture paths are relative to.
    pub asset_root: String,
    /// CSS selector of the canvas the web build attaches to.
    pub canvas_selector: String,
    /// Upper bound for the device pixel ratio used to size the surface.
    pub max_pixel_ratio: f64,
    pub clear_colour: wgpu::Color,
    pub camera: CameraSettings,
    pub enable_damping: bool,
    pub damping_factor: f32,
    /// Slowly rotate all meshes around x and y.
    pub spin_meshes: bool,
}

impl Settings {
    /// Defaults with the native asset root taken from `FLOW_ASSETS` if it is set.
    pub fn from_env() -> Self {
        #[allow(unused_mut)]
        let mut settings = Self::default();
        #[cfg(not(target_arch = "wasm32"))]
        if let Ok(root) = std::env::var(ASSET_ROOT_ENV) {
            log::info!("Using asset root {root} from {ASSET_ROOT_ENV}");
            settings.asset_root = root;
        }
        settings
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            asset_root: "./assets".to_string(),
            canvas_selector: "canvas.webgl".to_string(),
            max_pixel_ratio: 2.0,
            clear_colour: wgpu::Color::BLACK,
            camera: CameraSettings::default(),
            enable_damping: true,
            damping_factor: 0.05,
            spin_meshes: false,
        }
    }
}
