//! WebGPU rendering module
//!
//! The scene is rebuilt each frame as a flat-colored triangle list.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::build_scene;
pub use vertex::Vertex;
