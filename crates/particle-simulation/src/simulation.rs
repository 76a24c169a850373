//! GPU particle simulation driver
//!
//! Lifecycle: `initialize` once before the first frame, `step` once per frame,
//! `shutdown` (or drop) at the end. All device work is fire-and-forget: the
//! kernel dispatches are recorded before the draw and rely on submission
//! order for the compute to render handoff.

use particle_physics::generate_particles;
use rand::Rng;

use crate::device::{ComputeDevice, IndirectDraw};
use crate::dispatch::DispatchSize;
use crate::error::{Result, SimulationError};
use crate::indirect::{IndirectArgs, SubMesh};
use crate::params::{Bounds, KernelParams, SimulationConfig, SUBSTEPS};

struct SimulationState<B, K> {
    kernel: K,
    dispatch: DispatchSize,
    kernel_params: KernelParams,
    args: IndirectArgs,
    mesh: Option<SubMesh>,
    bounds: Bounds,
    unique_id: f32,

    particle_buffer: B,
    args_buffer: B,
}

/// Drives one particle simulation on a `ComputeDevice`
pub struct ParticleSimulation<D: ComputeDevice> {
    device: D,
    state: Option<SimulationState<D::Buffer, D::Kernel>>,
}

impl<D: ComputeDevice> ParticleSimulation<D> {
    /// Wrap a device. Nothing is allocated until `initialize`.
    pub fn new(device: D) -> Self {
        Self {
            device,
            state: None,
        }
    }

    /// Look up the kernel, generate the particle batch and upload it together
    /// with the indirect draw arguments.
    ///
    /// Re-initializing releases the previous buffers first. On error nothing
    /// is allocated and a previously running simulation is left untouched.
    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Result<()> {
        config.validate()?;

        let kernel = self.device.find_kernel(&config.kernel_entry_point)?;
        let group_size = self.device.thread_group_size(&kernel);
        if group_size.contains(&0) {
            return Err(SimulationError::InvalidThreadGroupSize(group_size));
        }
        let dispatch = DispatchSize::new(config.particle_count, group_size[0])?;

        self.shutdown();

        log::info!(
            "Initializing particle simulation: requested {}, rounded to {} ({} groups of {})",
            config.particle_count,
            dispatch.particle_count,
            dispatch.groups,
            dispatch.group_size
        );

        let unique_id: f32 = rng.random();
        let particles = generate_particles(rng, dispatch.particle_count as usize, &config.spawn);
        for (i, p) in particles.iter().take(4).enumerate() {
            log::debug!(
                "  [{}] pos={:?} vel={:?} color={:?}",
                i,
                p.position,
                p.velocity,
                p.color
            );
        }

        let particle_buffer = self.device.create_particle_buffer(&particles);

        let mesh = self.device.sub_mesh();
        if mesh.is_none() {
            log::warn!("No particle mesh bound, draw arguments are zeroed and nothing will render");
        }
        let args = IndirectArgs::for_mesh(mesh.as_ref(), dispatch.particle_count);
        let args_buffer = self.device.create_args_buffer(&args);
        log::debug!("Indirect args: {:?}", args.to_words());

        let kernel_params = config.kernel_params(dispatch.particle_count);
        self.device
            .bind_kernel(&kernel, &kernel_params, &particle_buffer);
        log::debug!("Kernel params: {:?}", kernel_params);

        let material = config.material_params(unique_id);
        self.device.bind_material(&material, &particle_buffer);

        self.state = Some(SimulationState {
            kernel,
            dispatch,
            kernel_params,
            args,
            mesh,
            bounds: config.draw_bounds,
            unique_id,
            particle_buffer,
            args_buffer,
        });

        log::info!("Particle simulation initialized");
        Ok(())
    }

    /// Advance one frame: `SUBSTEPS` kernel dispatches of `frame_delta / SUBSTEPS`
    /// each, then a single instanced indirect draw.
    pub fn step(&mut self, frame_delta: f32) -> Result<()> {
        let state = self.state.as_ref().ok_or(SimulationError::NotInitialized)?;

        let substep_delta = frame_delta / SUBSTEPS as f32;
        self.device.set_delta_time(&state.kernel, substep_delta);

        for _ in 0..SUBSTEPS {
            self.device
                .dispatch(&state.kernel, state.dispatch.workgroups());
        }

        self.device.draw_mesh_instanced_indirect(&IndirectDraw {
            mesh: state.mesh,
            bounds: state.bounds,
            args: &state.args_buffer,
            instance_id: state.unique_id,
        });

        self.device.submit();
        log::trace!("Stepped {} substeps of {:.5}s", SUBSTEPS, substep_delta);
        Ok(())
    }

    /// Release the device buffers. Safe to call any number of times.
    pub fn shutdown(&mut self) {
        if let Some(state) = self.state.take() {
            self.device.release_buffer(state.particle_buffer);
            self.device.release_buffer(state.args_buffer);
            log::info!("Particle simulation buffers released");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Rounded particle count, once initialized
    pub fn particle_count(&self) -> Option<u32> {
        self.state.as_ref().map(|s| s.dispatch.particle_count)
    }

    pub fn dispatch_size(&self) -> Option<DispatchSize> {
        self.state.as_ref().map(|s| s.dispatch)
    }

    pub fn indirect_args(&self) -> Option<IndirectArgs> {
        self.state.as_ref().map(|s| s.args)
    }

    pub fn kernel_params(&self) -> Option<KernelParams> {
        self.state.as_ref().map(|s| s.kernel_params)
    }

    pub fn unique_id(&self) -> Option<f32> {
        self.state.as_ref().map(|s| s.unique_id)
    }

    /// Get reference to the particle buffer.
    pub fn particle_buffer(&self) -> Option<&D::Buffer> {
        self.state.as_ref().map(|s| &s.particle_buffer)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: ComputeDevice> Drop for ParticleSimulation<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
