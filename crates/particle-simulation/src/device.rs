//! The seam between the simulation driver and the GPU.
//!
//! The compute kernel, the particle material and the instance mesh are
//! external collaborators. The driver only talks to them through this trait,
//! which keeps the per-frame sequence testable without a GPU.

use particle_physics::Particle;

use crate::error::Result;
use crate::indirect::{IndirectArgs, SubMesh};
use crate::params::{Bounds, KernelParams, MaterialParams};

/// Everything the draw call references
pub struct IndirectDraw<'a, B> {
    /// Sub-mesh 0 of the bound mesh, if there is one
    pub mesh: Option<SubMesh>,
    pub bounds: Bounds,
    pub args: &'a B,
    /// Per-simulation id, see `MaterialParams::unique_id`
    pub instance_id: f32,
}

pub trait ComputeDevice {
    type Buffer;
    type Kernel;

    /// Look up a compute entry point. Missing entry points are fatal.
    fn find_kernel(&mut self, entry_point: &str) -> Result<Self::Kernel>;

    /// Thread-group size the kernel was compiled with
    fn thread_group_size(&self, kernel: &Self::Kernel) -> [u32; 3];

    /// Allocate a read-write storage buffer holding `particles`
    fn create_particle_buffer(&mut self, particles: &[Particle]) -> Self::Buffer;

    /// Allocate an indirect-arguments buffer holding `args`
    fn create_args_buffer(&mut self, args: &IndirectArgs) -> Self::Buffer;

    /// Set the kernel's constants and bind the particle buffer read-write
    fn bind_kernel(&mut self, kernel: &Self::Kernel, params: &KernelParams, particles: &Self::Buffer);

    /// Set the material's constants and bind the particle buffer read-only
    fn bind_material(&mut self, material: &MaterialParams, particles: &Self::Buffer);

    /// Index range of sub-mesh 0 of the instance mesh
    fn sub_mesh(&self) -> Option<SubMesh>;

    fn set_delta_time(&mut self, kernel: &Self::Kernel, delta_time: f32);

    fn dispatch(&mut self, kernel: &Self::Kernel, workgroups: [u32; 3]);

    fn draw_mesh_instanced_indirect(&mut self, draw: &IndirectDraw<'_, Self::Buffer>);

    /// Hand the recorded work to the device queue. Never waits.
    fn submit(&mut self);

    fn release_buffer(&mut self, buffer: Self::Buffer);
}
