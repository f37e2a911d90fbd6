//! Viewer data structures: models, textures, scene graph, and transforms.
//!
//! - `model` contains mesh and material definitions, CPU and GPU forms
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-node transformation data
//! - `scene_graph` enables hierarchical scene organization

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
