//! Rendering module
//!
//! The scene is painted into a flat-colored triangle list on the CPU and
//! drawn with a single WebGPU pipeline.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{SceneOptions, build_scene};
pub use vertex::Vertex;
