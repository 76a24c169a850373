//! In-memory `ComputeDevice` that records every call, used by the driver tests

use std::cell::RefCell;
use std::rc::Rc;

use particle_physics::Particle;

use crate::device::{ComputeDevice, IndirectDraw};
use crate::error::{Result, SimulationError};
use crate::indirect::{IndirectArgs, SubMesh};
use crate::params::{Bounds, KernelParams, MaterialParams};

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    FindKernel(String),
    CreateParticleBuffer { id: u32, particles: Vec<Particle> },
    CreateArgsBuffer { id: u32, args: IndirectArgs },
    BindKernel { params: KernelParams, particles: u32 },
    BindMaterial { material: MaterialParams, particles: u32 },
    SetDeltaTime(f32),
    Dispatch([u32; 3]),
    Draw {
        mesh: Option<SubMesh>,
        bounds: Bounds,
        args: u32,
        instance_id: f32,
    },
    Submit,
    Release(u32),
}

#[derive(Debug, PartialEq, Eq)]
pub struct BufferId(pub u32);

#[derive(Debug)]
pub struct RecordedKernel {
    pub group_size: [u32; 3],
}

pub struct RecordingDevice {
    kernels: Vec<(String, [u32; 3])>,
    mesh: Option<SubMesh>,
    log: Rc<RefCell<Vec<Command>>>,
    next_id: u32,
}

impl RecordingDevice {
    pub fn new(entry_point: &str, group_size: [u32; 3], mesh: Option<SubMesh>) -> Self {
        Self {
            kernels: vec![(entry_point.to_string(), group_size)],
            mesh,
            log: Rc::new(RefCell::new(Vec::new())),
            next_id: 0,
        }
    }

    /// Shared handle to the command log, stays readable after the device is dropped
    pub fn log(&self) -> Rc<RefCell<Vec<Command>>> {
        Rc::clone(&self.log)
    }

    fn record(&self, command: Command) {
        self.log.borrow_mut().push(command);
    }

    fn next_buffer(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl ComputeDevice for RecordingDevice {
    type Buffer = BufferId;
    type Kernel = RecordedKernel;

    fn find_kernel(&mut self, entry_point: &str) -> Result<Self::Kernel> {
        self.record(Command::FindKernel(entry_point.to_string()));
        self.kernels
            .iter()
            .find(|(name, _)| name == entry_point)
            .map(|(_, group_size)| RecordedKernel {
                group_size: *group_size,
            })
            .ok_or_else(|| SimulationError::KernelNotFound(entry_point.to_string()))
    }

    fn thread_group_size(&self, kernel: &Self::Kernel) -> [u32; 3] {
        kernel.group_size
    }

    fn create_particle_buffer(&mut self, particles: &[Particle]) -> Self::Buffer {
        let id = self.next_buffer();
        self.record(Command::CreateParticleBuffer {
            id,
            particles: particles.to_vec(),
        });
        BufferId(id)
    }

    fn create_args_buffer(&mut self, args: &IndirectArgs) -> Self::Buffer {
        let id = self.next_buffer();
        self.record(Command::CreateArgsBuffer { id, args: *args });
        BufferId(id)
    }

    fn bind_kernel(&mut self, _kernel: &Self::Kernel, params: &KernelParams, particles: &Self::Buffer) {
        self.record(Command::BindKernel {
            params: *params,
            particles: particles.0,
        });
    }

    fn bind_material(&mut self, material: &MaterialParams, particles: &Self::Buffer) {
        self.record(Command::BindMaterial {
            material: *material,
            particles: particles.0,
        });
    }

    fn sub_mesh(&self) -> Option<SubMesh> {
        self.mesh
    }

    fn set_delta_time(&mut self, _kernel: &Self::Kernel, delta_time: f32) {
        self.record(Command::SetDeltaTime(delta_time));
    }

    fn dispatch(&mut self, _kernel: &Self::Kernel, workgroups: [u32; 3]) {
        self.record(Command::Dispatch(workgroups));
    }

    fn draw_mesh_instanced_indirect(&mut self, draw: &IndirectDraw<'_, Self::Buffer>) {
        self.record(Command::Draw {
            mesh: draw.mesh,
            bounds: draw.bounds,
            args: draw.args.0,
            instance_id: draw.instance_id,
        });
    }

    fn submit(&mut self) {
        self.record(Command::Submit);
    }

    fn release_buffer(&mut self, buffer: Self::Buffer) {
        self.record(Command::Release(buffer.0));
    }
}
