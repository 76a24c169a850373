//! # Particle Renderer
//!
//! wgpu implementation of the simulation's `ComputeDevice`: kernel reflection,
//! compute dispatch and the instanced indirect particle draw.

pub mod backend;
pub mod camera;
pub mod mesh;
pub mod reflection;
pub mod renderer;

pub use backend::*;
pub use camera::*;
pub use mesh::*;
pub use reflection::*;
pub use renderer::*;
