//! Indirect draw arguments and the mesh metadata they are built from

use bytemuck::{Pod, Zeroable};

/// Index range of one sub-mesh
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubMesh {
    pub index_count: u32,
    pub index_start: u32,
    pub base_vertex: u32,
}

/// Arguments for an indexed, instanced indirect draw.
///
/// Same layout as the five words wgpu reads for `draw_indexed_indirect`.
/// `base_vertex` is signed on the device side; values above `i32::MAX` are
/// not produced by any mesh this crate builds.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct IndirectArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: u32,
    pub first_instance: u32,
}

impl IndirectArgs {
    /// Draw every instance of `mesh`, or nothing at all when no mesh is bound.
    pub fn for_mesh(mesh: Option<&SubMesh>, instance_count: u32) -> Self {
        match mesh {
            Some(mesh) => Self {
                index_count: mesh.index_count,
                instance_count,
                first_index: mesh.index_start,
                base_vertex: mesh.base_vertex,
                first_instance: 0,
            },
            None => Self::zeroed(),
        }
    }

    pub fn to_words(&self) -> [u32; 5] {
        [
            self.index_count,
            self.instance_count,
            self.first_index,
            self.base_vertex,
            self.first_instance,
        ]
    }
}
