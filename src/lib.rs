//! flow-materials
//!
//! A small material showcase on wgpu and winit that runs natively and on the web
//! (wasm32 + WebGL2). A displaced, alpha-mapped door stands between a sphere and a
//! torus that reflect an environment cube map. Orbit controls move the camera and
//! a debug panel edits material parameters while the scene renders.
//!
//! High-level modules
//! - `app`: event loop, render loop and the glue between window, scene and GPU
//! - `camera`: camera, projection and their uniform
//! - `context`: window bound GPU context and the logical viewport
//! - `controls`: damped orbit controls
//! - `data_structures`: geometry, materials, instances, textures and the scene graph
//! - `panel`: slider panel with getter/setter bindings
//! - `pipelines`: standard, light and panel render pipelines, plus panel text with `ui`
//! - `render`: GPU resources of a scene and the frame's render pass
//! - `resources`: asset loading and per-material GPU resources
//! - `scene`: the showcase scene itself
//! - `settings`: literal configuration
//!

pub mod app;
pub mod camera;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod panel;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod settings;

pub use app::{StopHandle, run, run_with};
pub use settings::Settings;
