//! Procedural instance mesh for the particles

use bytemuck::{Pod, Zeroable};
use particle_simulation::SubMesh;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// CPU-side mesh with a single sub-mesh covering all indices
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Latitude/longitude sphere of unit diameter centered on the origin.
    ///
    /// The material scales it by the particle diameter.
    pub fn uv_sphere(sectors: u32, stacks: u32) -> Self {
        let sectors = sectors.max(3);
        let stacks = stacks.max(2);
        let radius = 0.5;

        let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);
        for i in 0..=stacks {
            let phi = std::f32::consts::PI * i as f32 / stacks as f32;
            let (ring, y) = phi.sin_cos();

            for j in 0..=sectors {
                let theta = std::f32::consts::TAU * j as f32 / sectors as f32;
                let (sin_t, cos_t) = theta.sin_cos();
                let normal = [ring * cos_t, y, ring * sin_t];
                vertices.push(MeshVertex {
                    position: normal.map(|n| n * radius),
                    normal,
                });
            }
        }

        let mut indices = Vec::with_capacity((stacks * sectors * 6) as usize);
        for i in 0..stacks {
            for j in 0..sectors {
                let k1 = i * (sectors + 1) + j;
                let k2 = k1 + sectors + 1;
                indices.extend_from_slice(&[k1, k2, k1 + 1, k1 + 1, k2, k2 + 1]);
            }
        }

        Self { vertices, indices }
    }

    pub fn sub_mesh(&self) -> SubMesh {
        SubMesh {
            index_count: self.indices.len() as u32,
            index_start: 0,
            base_vertex: 0,
        }
    }
}

/// Mesh uploaded to the GPU
pub struct ParticleMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    sub_mesh: SubMesh,
}

impl ParticleMesh {
    pub fn new(device: &wgpu::Device, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            sub_mesh: data.sub_mesh(),
        }
    }

    pub fn sub_mesh(&self) -> SubMesh {
        self.sub_mesh
    }
}
