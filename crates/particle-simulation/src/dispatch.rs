//! Work-group sizing for the particle kernel

use crate::error::{Result, SimulationError};

/// Particle count rounded to whole thread groups, and the matching group count.
///
/// `particle_count` is the value every buffer, the kernel parameters and the
/// indirect draw arguments are sized from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchSize {
    pub particle_count: u32,
    pub groups: u32,
    pub group_size: u32,
}

impl DispatchSize {
    pub fn new(requested: u32, group_size: u32) -> Result<Self> {
        if group_size == 0 {
            return Err(SimulationError::InvalidThreadGroupSize([group_size, 1, 1]));
        }

        let groups = requested.div_ceil(group_size);
        let particle_count =
            groups
                .checked_mul(group_size)
                .ok_or(SimulationError::ParticleCountOverflow {
                    requested,
                    group_size,
                })?;

        Ok(Self {
            particle_count,
            groups,
            group_size,
        })
    }

    /// Work-group counts for a one dimensional dispatch
    pub fn workgroups(&self) -> [u32; 3] {
        [self.groups, 1, 1]
    }
}
