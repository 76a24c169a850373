use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Compute kernel entry point not found: {0}")]
    KernelNotFound(String),

    #[error("Kernel source could not be parsed: {0}")]
    ShaderParse(String),

    #[error("Invalid kernel thread group size: {0:?}")]
    InvalidThreadGroupSize([u32; 3]),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Particle count {requested} overflows when rounded up to groups of {group_size}")]
    ParticleCountOverflow { requested: u32, group_size: u32 },

    #[error("Simulation has not been initialized")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, SimulationError>;
