//! # Particle Simulation Driver
//!
//! Owns the particle and indirect-argument buffers, steps an external compute
//! kernel in fixed substeps every frame and issues one instanced indirect draw.

pub mod device;
pub mod dispatch;
pub mod error;
pub mod indirect;
pub mod params;
pub mod simulation;

#[cfg(test)]
mod recording;

pub use device::*;
pub use dispatch::*;
pub use error::*;
pub use indirect::*;
pub use params::*;
pub use simulation::*;
