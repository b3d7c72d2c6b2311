//! Core functionality for Shaderlink
//!
//! This crate provides strongly typed handles over a host graphics API, the
//! [`GlHost`] trait describing that API, and [`create_shader_program`], which
//! compiles a vertex and a fragment shader and links them into a program.
//! [`HeadlessHost`] implements the trait in memory for tests and tooling.

pub mod builder;
pub mod config;
pub mod error;
pub mod gl;
pub mod handle;
pub mod headless;
pub mod host;
pub mod logging;

pub use builder::{
    create_shader_program, BuildOptions, CleanupPolicy, ShaderProgramBuilder,
};
pub use config::{BuildConfig, ConfigManager, LoggingConfig, ShaderlinkConfig};
pub use error::{BuildError, Result, ShaderlinkError};
pub use gl::{GlEnum, ShaderStage};
pub use handle::{ContextHandle, ProgramHandle, ShaderHandle};
pub use headless::{HeadlessHost, HostCall};
pub use host::GlHost;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        builder::{create_shader_program, BuildOptions, CleanupPolicy, ShaderProgramBuilder},
        error::{BuildError, Result, ShaderlinkError},
        gl::ShaderStage,
        handle::{ContextHandle, ProgramHandle, ShaderHandle},
        host::GlHost,
    };
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install `config` as the global configuration and initialize logging.
///
/// A configuration installed earlier is replaced. Fails if a `tracing`
/// subscriber is already installed; the configuration is applied either way.
pub fn init(config: ShaderlinkConfig) -> Result<&'static ConfigManager> {
    let logging = config.logging.clone();
    let manager = config::init_config_with(config);
    logging::init_with(&logging)?;
    shaderlink_info!(logging::LogCategory::Core, "Shaderlink Core v{} initialized", VERSION);
    Ok(manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
