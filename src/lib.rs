//! harborview
//!
//! A minimal cross-platform 3D model viewer: one scene, one glTF model, an
//! orbit camera, rendered with wgpu natively and on the web. The crate
//! wires a small set of owned components together rather than exposing an
//! engine surface; [`run`] is the whole public story.
//!
//! High-level modules
//! - `camera`: camera types, orbit controller and uniforms for view/projection
//! - `context`: central GPU and window context that owns device/queue/pipeline
//! - `content`: the static scene content (sea plane, hemisphere light)
//! - `data_structures`: scene data models (meshes, transforms, textures, scene graph)
//! - `pipelines`: the forward mesh pipeline and the hemisphere light resources
//! - `resources`: asset fetching and glTF model loading
//! - `viewer`: the application lifecycle and event loop
//!

pub mod camera;
pub mod content;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod resources;
pub mod viewer;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use viewer::{DEFAULT_MODEL_PATH, run, run_with_model};
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point: starts the viewer against the host canvas.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    viewer::run().unwrap_throw();
}
