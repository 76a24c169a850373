//! Compute entry point reflection for WGSL kernels
//!
//! wgpu does not report a pipeline's workgroup size, so the kernel source is
//! parsed with naga up front and the `@workgroup_size` of every compute entry
//! point is recorded.

use particle_simulation::{Result, SimulationError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelEntryPoint {
    pub name: String,
    pub workgroup_size: [u32; 3],
}

/// List the compute entry points declared in `source`.
pub fn compute_entry_points(source: &str) -> Result<Vec<KernelEntryPoint>> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| SimulationError::ShaderParse(e.emit_to_string(source)))?;

    Ok(module
        .entry_points
        .iter()
        .filter(|ep| ep.stage == naga::ShaderStage::Compute)
        .map(|ep| KernelEntryPoint {
            name: ep.name.clone(),
            workgroup_size: ep.workgroup_size,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KERNELS: &str = r#"
@group(0) @binding(0) var<storage, read_write> data: array<f32>;

@compute @workgroup_size(64)
fn CSMain(@builtin(global_invocation_id) id: vec3<u32>) {
    data[id.x] = data[id.x] * 2.0;
}

@compute @workgroup_size(8, 8, 1)
fn clear(@builtin(global_invocation_id) id: vec3<u32>) {
    data[id.x] = 0.0;
}

@vertex
fn vertex() -> @builtin(position) vec4<f32> {
    return vec4<f32>(0.0);
}
"#;

    #[test]
    fn test_lists_compute_entry_points() {
        let entry_points = compute_entry_points(KERNELS).unwrap();
        assert_eq!(
            entry_points,
            vec![
                KernelEntryPoint {
                    name: "CSMain".into(),
                    workgroup_size: [64, 1, 1],
                },
                KernelEntryPoint {
                    name: "clear".into(),
                    workgroup_size: [8, 8, 1],
                },
            ]
        );
    }

    #[test]
    fn test_parse_error() {
        let err = compute_entry_points("fn broken( {").unwrap_err();
        assert!(matches!(err, SimulationError::ShaderParse(_)));
    }

    #[test]
    fn test_no_compute_entry_points() {
        let source = "@vertex fn vertex() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }";
        assert!(compute_entry_points(source).unwrap().is_empty());
    }
}
