//! Simulation configuration and the parameter blocks handed to the GPU

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use particle_physics::SpawnRanges;

use crate::error::{Result, SimulationError};

/// Compute entry point the kernel is looked up by
pub const KERNEL_ENTRY_POINT: &str = "CSMain";

/// Physics substeps dispatched per frame
pub const SUBSTEPS: u32 = 5;

/// Edge length of the shared draw bounds
pub const DRAW_BOUNDS_SIZE: f32 = 1000.0;

/// Axis-aligned bounding volume handed along with the draw call
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub center: Vec3,
    pub size: Vec3,
}

impl Bounds {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::splat(DRAW_BOUNDS_SIZE))
    }
}

/// Startup configuration, read once by `ParticleSimulation::initialize`.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Requested particle count (rounded up to whole thread groups)
    pub particle_count: u32,
    pub particle_diameter: f32,
    /// Half extent of the containing box
    pub box_size: f32,
    pub kernel_entry_point: String,
    pub spawn: SpawnRanges,
    pub draw_bounds: Bounds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: 512,
            particle_diameter: 0.2,
            box_size: 2.5,
            kernel_entry_point: KERNEL_ENTRY_POINT.to_string(),
            spawn: SpawnRanges::default(),
            draw_bounds: Bounds::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "particle_count must be at least 1".into(),
            ));
        }
        if !self.particle_diameter.is_finite() || self.particle_diameter <= 0.0 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "particle_diameter must be positive, got {}",
                self.particle_diameter
            )));
        }
        if !self.box_size.is_finite() || self.box_size <= 0.0 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "box_size must be positive, got {}",
                self.box_size
            )));
        }
        Ok(())
    }

    pub fn radius(&self) -> f32 {
        0.5 * self.particle_diameter
    }

    /// Containment limits for particle centers: (min x, max x, min z, max z)
    pub fn limits_xz(&self) -> [f32; 4] {
        let r = self.radius();
        [
            -self.box_size + r,
            self.box_size - r,
            -self.box_size + r,
            self.box_size - r,
        ]
    }

    pub fn floor_y(&self) -> f32 {
        -self.box_size + self.radius()
    }

    pub fn kernel_params(&self, particle_count: u32) -> KernelParams {
        KernelParams {
            limits_xz: self.limits_xz(),
            particles_count: particle_count,
            particle_diameter: self.particle_diameter,
            delta_time: 0.0,
            radius: self.radius(),
            floor_y: self.floor_y(),
            _padding: [0.0; 3],
        }
    }

    pub fn material_params(&self, unique_id: f32) -> MaterialParams {
        MaterialParams {
            radius: self.radius() * 2.0,
            unique_id,
            _padding: [0.0; 2],
        }
    }
}

/// Uniform block bound to the compute kernel (matches WGSL `SimParams`)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct KernelParams {
    pub limits_xz: [f32; 4],
    pub particles_count: u32,
    pub particle_diameter: f32,
    pub delta_time: f32,
    pub radius: f32,
    pub floor_y: f32,
    pub _padding: [f32; 3],
}

/// Uniform block bound to the particle material (matches WGSL `Material`)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialParams {
    /// Scale applied to the unit-diameter instance mesh
    pub radius: f32,
    /// Per-simulation random value, keeps separate simulations from being batched together
    pub unique_id: f32,
    pub _padding: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.particle_count, 512);
        assert_eq!(config.kernel_entry_point, "CSMain");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_values() {
        let config = SimulationConfig {
            particle_diameter: 0.2,
            box_size: 2.5,
            ..Default::default()
        };
        assert!((config.radius() - 0.1).abs() < 1e-6);
        assert!((config.floor_y() - -2.4).abs() < 1e-6);

        let limits = config.limits_xz();
        assert!((limits[0] - -2.4).abs() < 1e-6);
        assert!((limits[1] - 2.4).abs() < 1e-6);
        assert_eq!(limits[0], limits[2]);
        assert_eq!(limits[1], limits[3]);

        let material = config.material_params(0.25);
        assert!((material.radius - 0.2).abs() < 1e-6);
        assert_eq!(material.unique_id, 0.25);
    }

    #[test]
    fn test_kernel_params() {
        let config = SimulationConfig::default();
        let params = config.kernel_params(1024);
        assert_eq!(params.particles_count, 1024);
        assert_eq!(params.particle_diameter, config.particle_diameter);
        assert_eq!(params.delta_time, 0.0);
        assert_eq!(params.radius, config.radius());
        assert_eq!(params.floor_y, config.floor_y());
        assert_eq!(params.limits_xz, config.limits_xz());
    }

    #[test]
    fn test_uniform_layouts() {
        // WGSL uniform structs round up to 16 bytes
        assert_eq!(std::mem::size_of::<KernelParams>(), 48);
        assert_eq!(std::mem::size_of::<MaterialParams>(), 16);
        assert_eq!(std::mem::offset_of!(KernelParams, particles_count), 16);
        assert_eq!(std::mem::offset_of!(KernelParams, delta_time), 24);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_count = SimulationConfig {
            particle_count: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_count.validate(),
            Err(SimulationError::InvalidConfiguration(_))
        ));

        let bad_diameter = SimulationConfig {
            particle_diameter: f32::NAN,
            ..Default::default()
        };
        assert!(bad_diameter.validate().is_err());

        let bad_box = SimulationConfig {
            box_size: -1.0,
            ..Default::default()
        };
        assert!(bad_box.validate().is_err());
    }

    #[test]
    fn test_default_bounds() {
        let bounds = Bounds::default();
        assert_eq!(bounds.min(), Vec3::splat(-500.0));
        assert_eq!(bounds.max(), Vec3::splat(500.0));
    }
}
