//! # Particle Physics
//!
//! Host-side particle records and the seeded generator that fills the
//! initial particle array before it is uploaded to the GPU.

pub mod constants;
pub mod particle;

pub use constants::*;
pub use particle::*;
