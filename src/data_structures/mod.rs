//! Scene data structures: geometry, materials, instances, textures and the scene graph.
//!
//! This module contains the core data types for scene representation:
//!
//! - `geometry` generates the parametric primitives (sphere, plane, torus)
//! - `instance` holds per-mesh transformation data
//! - `material` describes standard (metalness/roughness) materials
//! - `model` contains the vertex layout and uploaded GPU meshes
//! - `scene_graph` holds meshes, lights and the materials they share
//! - `texture` contains GPU texture wrapper and creation utilities

pub mod geometry;
pub mod instance;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
