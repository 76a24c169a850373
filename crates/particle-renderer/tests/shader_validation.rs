use std::fs;
use std::path::{Path, PathBuf};

fn shader_dirs() -> Vec<PathBuf> {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    vec![
        manifest.join("src/shaders"),
        manifest.join("../../assets/shaders"),
    ]
}

fn parse(path: &Path) -> Result<naga::Module, String> {
    let source = fs::read_to_string(path).map_err(|e| format!("{:?}: {}", path, e))?;
    naga::front::wgsl::parse_str(&source).map_err(|e| {
        format!(
            "Failed to parse {:?}:\n{}",
            path.file_name().unwrap(),
            e.emit_to_string(&source)
        )
    })
}

#[test]
fn validate_all_shaders() {
    let mut errors = Vec::new();
    let mut checked = 0;

    for dir in shader_dirs() {
        if !dir.exists() {
            panic!("Shader directory not found: {:?}", dir);
        }

        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.extension().map_or(true, |ext| ext != "wgsl") {
                continue;
            }

            let module = match parse(&path) {
                Ok(module) => module,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };

            let mut validator = naga::valid::Validator::new(
                naga::valid::ValidationFlags::all(),
                naga::valid::Capabilities::all(),
            );
            if let Err(e) = validator.validate(&module) {
                errors.push(format!(
                    "Failed to validate {:?}:\n{:?}",
                    path.file_name().unwrap(),
                    e
                ));
            }
            checked += 1;
        }
    }

    if !errors.is_empty() {
        panic!("Shader validation failed:\n{}", errors.join("\n"));
    }
    assert!(checked >= 2, "expected the material and kernel shaders");
}

#[test]
fn reference_kernel_exposes_csmain() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/shaders/simple_physics.wgsl");
    let source = fs::read_to_string(&path).unwrap();

    let entry_points = particle_renderer::compute_entry_points(&source).unwrap();
    let kernel = entry_points
        .iter()
        .find(|ep| ep.name == "CSMain")
        .expect("CSMain entry point");
    assert!(kernel.workgroup_size.iter().all(|&n| n > 0));
    assert_eq!(&kernel.workgroup_size[1..], &[1, 1]);
}

#[test]
fn material_shader_has_vertex_and_fragment() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/shaders/particle.wgsl");
    let module = parse(&path).unwrap();

    let stages: Vec<_> = module
        .entry_points
        .iter()
        .map(|ep| (ep.name.as_str(), ep.stage))
        .collect();
    assert!(stages.contains(&("vertex", naga::ShaderStage::Vertex)));
    assert!(stages.contains(&("fragment", naga::ShaderStage::Fragment)));
}
