//! wgpu implementation of `ComputeDevice`
//!
//! Dispatches and the draw of a frame are recorded into one command encoder,
//! each dispatch in its own compute pass, and handed to the queue on `submit`.
//! Ordering between the kernel writes and the vertex stage reads comes from
//! pass order alone.

use particle_physics::Particle;
use particle_simulation::{
    ComputeDevice, IndirectArgs, IndirectDraw, KernelParams, MaterialParams, Result,
    SimulationError, SubMesh,
};
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::mesh::ParticleMesh;
use crate::reflection::{compute_entry_points, KernelEntryPoint};
use crate::renderer::ParticleRenderer;

/// Compute pipeline for one kernel entry point
pub struct WgpuKernel {
    name: String,
    workgroup_size: [u32; 3],
    pipeline: wgpu::ComputePipeline,
}

impl WgpuKernel {
    pub fn name(&self) -> &str {
        &self.name
    }
}

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,

    kernel_module: wgpu::ShaderModule,
    entry_points: Vec<KernelEntryPoint>,
    kernel_layout: wgpu::BindGroupLayout,
    kernel_pipeline_layout: wgpu::PipelineLayout,
    params_buffer: wgpu::Buffer,
    kernel_bind_group: Option<wgpu::BindGroup>,

    renderer: ParticleRenderer,
    mesh: Option<ParticleMesh>,

    encoder: Option<wgpu::CommandEncoder>,
    render_target: Option<wgpu::TextureView>,
}

impl WgpuBackend {
    /// Reflect and compile `kernel_source`.
    ///
    /// The kernel must read its constants from a `@group(0) @binding(0)`
    /// uniform laid out as `KernelParams` and the particles from a
    /// `@group(0) @binding(1)` read-write storage array.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        kernel_source: &str,
        renderer: ParticleRenderer,
        mesh: Option<ParticleMesh>,
    ) -> Result<Self> {
        let entry_points = compute_entry_points(kernel_source)?;
        for ep in &entry_points {
            log::debug!(
                "Kernel entry point {} with workgroup size {:?}",
                ep.name,
                ep.workgroup_size
            );
        }

        let kernel_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Kernel Shader"),
            source: wgpu::ShaderSource::Wgsl(kernel_source.into()),
        });

        let kernel_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Kernel Bind Group Layout"),
            entries: &[
                // Params (Uniform) - Binding 0
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Particles (Storage) - Binding 1
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let kernel_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle Kernel Pipeline Layout"),
                bind_group_layouts: &[&kernel_layout],
                push_constant_ranges: &[],
            });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Kernel Params Buffer"),
            size: std::mem::size_of::<KernelParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            device,
            queue,
            kernel_module,
            entry_points,
            kernel_layout,
            kernel_pipeline_layout,
            params_buffer,
            kernel_bind_group: None,
            renderer,
            mesh,
            encoder: None,
            render_target: None,
        })
    }

    /// Color target for the next frame's draw. Cleared again on `submit`.
    pub fn set_render_target(&mut self, view: wgpu::TextureView) {
        self.render_target = Some(view);
    }

    pub fn update_camera(&self, camera: &Camera) {
        self.renderer.update_camera(&self.queue, camera);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(&self.device, width, height);
    }

    pub fn entry_points(&self) -> &[KernelEntryPoint] {
        &self.entry_points
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

fn frame_encoder<'a>(
    encoder: &'a mut Option<wgpu::CommandEncoder>,
    device: &wgpu::Device,
) -> &'a mut wgpu::CommandEncoder {
    encoder.get_or_insert_with(|| {
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Simulation Frame Encoder"),
        })
    })
}

impl ComputeDevice for WgpuBackend {
    type Buffer = wgpu::Buffer;
    type Kernel = WgpuKernel;

    fn find_kernel(&mut self, entry_point: &str) -> Result<WgpuKernel> {
        let ep = self
            .entry_points
            .iter()
            .find(|ep| ep.name == entry_point)
            .ok_or_else(|| SimulationError::KernelNotFound(entry_point.to_string()))?;

        let pipeline = self
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Particle Kernel Pipeline"),
                layout: Some(&self.kernel_pipeline_layout),
                module: &self.kernel_module,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            });

        log::info!("Compute kernel {} ready", entry_point);
        Ok(WgpuKernel {
            name: ep.name.clone(),
            workgroup_size: ep.workgroup_size,
            pipeline,
        })
    }

    fn thread_group_size(&self, kernel: &WgpuKernel) -> [u32; 3] {
        kernel.workgroup_size
    }

    fn create_particle_buffer(&mut self, particles: &[Particle]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Particle Buffer"),
                contents: bytemuck::cast_slice(particles),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
            })
    }

    fn create_args_buffer(&mut self, args: &IndirectArgs) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Particle Indirect Args Buffer"),
                contents: bytemuck::bytes_of(args),
                usage: wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::COPY_DST,
            })
    }

    fn bind_kernel(&mut self, kernel: &WgpuKernel, params: &KernelParams, particles: &wgpu::Buffer) {
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));

        self.kernel_bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Kernel Bind Group"),
            layout: &self.kernel_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: particles.as_entire_binding(),
                },
            ],
        }));
        log::debug!("Bound particle buffer to kernel {}", kernel.name);
    }

    fn bind_material(&mut self, material: &MaterialParams, particles: &wgpu::Buffer) {
        self.renderer
            .bind_material(&self.device, &self.queue, material, particles);
    }

    fn sub_mesh(&self) -> Option<SubMesh> {
        self.mesh.as_ref().map(ParticleMesh::sub_mesh)
    }

    fn set_delta_time(&mut self, _kernel: &WgpuKernel, delta_time: f32) {
        let offset = std::mem::offset_of!(KernelParams, delta_time) as wgpu::BufferAddress;
        self.queue
            .write_buffer(&self.params_buffer, offset, bytemuck::bytes_of(&delta_time));
    }

    fn dispatch(&mut self, kernel: &WgpuKernel, workgroups: [u32; 3]) {
        let Some(bind_group) = &self.kernel_bind_group else {
            log::warn!("Kernel {} dispatched before its buffers were bound", kernel.name);
            return;
        };

        let encoder = frame_encoder(&mut self.encoder, &self.device);
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Particle Kernel Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&kernel.pipeline);
        compute_pass.set_bind_group(0, bind_group, &[]);
        compute_pass.dispatch_workgroups(workgroups[0], workgroups[1], workgroups[2]);
    }

    fn draw_mesh_instanced_indirect(&mut self, draw: &IndirectDraw<'_, wgpu::Buffer>) {
        // No culling against draw.bounds here; wgpu has no engine-side batching to feed
        let (Some(mesh), Some(target)) = (&self.mesh, &self.render_target) else {
            log::trace!(
                "Skipping particle draw (mesh bound: {}, target set: {})",
                self.mesh.is_some(),
                self.render_target.is_some()
            );
            return;
        };

        let encoder = frame_encoder(&mut self.encoder, &self.device);
        self.renderer.draw_indirect(encoder, target, mesh, draw.args);
        log::trace!(
            "Particle draw {:.4} within {:?}..{:?}",
            draw.instance_id,
            draw.bounds.min(),
            draw.bounds.max()
        );
    }

    fn submit(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.queue.submit(std::iter::once(encoder.finish()));
        }
        self.render_target = None;
    }

    fn release_buffer(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }
}
