//! Particle records and the initial batch generator

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use rand::Rng;

use crate::constants::{SPAWN_MAX_VELOCITY, SPAWN_POSITION_RANGE};

/// GPU-compatible particle structure
///
/// Laid out as ten tightly packed f32 values so it matches a WGSL struct of
/// `array<f32, 3>, array<f32, 3>, array<f32, 4>` (40 byte stride).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Position in world space
    pub position: [f32; 3],
    /// Velocity vector
    pub velocity: [f32; 3],
    /// Linear RGBA color
    pub color: [f32; 4],
}

/// Sampling ranges for freshly spawned particles
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRanges {
    /// Horizontal axes sample `[-range/2, range/2]`, the vertical axis `[0, range]`
    pub position_range: f32,
    /// Every velocity axis samples `[-max/2, max/2]`
    pub max_velocity: f32,
}

impl Default for SpawnRanges {
    fn default() -> Self {
        Self {
            position_range: SPAWN_POSITION_RANGE,
            max_velocity: SPAWN_MAX_VELOCITY,
        }
    }
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            velocity: velocity.to_array(),
            color: color.to_array(),
        }
    }

    /// Sample a particle uniformly from `ranges`.
    ///
    /// The vertical position is one-sided so particles start above the floor.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, ranges: &SpawnRanges) -> Self {
        let pos_range = ranges.position_range;
        let max_vel = ranges.max_velocity;

        let position = Vec3::new(
            rng.random::<f32>() * pos_range - pos_range / 2.0,
            rng.random::<f32>() * pos_range,
            rng.random::<f32>() * pos_range - pos_range / 2.0,
        );
        let velocity = Vec3::new(
            rng.random::<f32>() * max_vel - max_vel / 2.0,
            rng.random::<f32>() * max_vel - max_vel / 2.0,
            rng.random::<f32>() * max_vel - max_vel / 2.0,
        );
        let color = Vec4::new(rng.random(), rng.random(), rng.random(), 1.0);

        Self::new(position, velocity, color)
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn velocity(&self) -> Vec3 {
        Vec3::from_array(self.velocity)
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }
}

/// Generate `count` particles from an explicit random source.
pub fn generate_particles<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    ranges: &SpawnRanges,
) -> Vec<Particle> {
    (0..count).map(|_| Particle::random(rng, ranges)).collect()
}
