//! Render pipelines.
//!
//! - `standard`: metalness/roughness shading, one pipeline per side and blend mode
//! - `light`: the light uniform shared by all standard pipelines
//! - `panel`: flat coloured quads of the debug panel
//! - `text`: slider names and values on the panel (`ui` feature)

pub mod light;
pub mod panel;
pub mod standard;
#[cfg(feature = "ui")]
pub mod text;
