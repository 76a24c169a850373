//! Spawn constants for the initial particle batch

/// Side length of the spawn volume. Horizontal axes are centered on the
/// origin, the vertical axis starts at zero.
pub const SPAWN_POSITION_RANGE: f32 = 3.0;

/// Width of the initial velocity interval on every axis (centered on zero)
pub const SPAWN_MAX_VELOCITY: f32 = 2.05;

/// Number of f32 lanes in one GPU particle record
pub const PARTICLE_FLOATS: usize = 10;
