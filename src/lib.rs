//! Shaderlink - compile and link shader programs against a WebGL-like host
//!
//! The core crate defines the host API as the [`GlHost`] trait and builds
//! programs through it. The web crate adds browser backends: a `web-sys`
//! WebGL host and a raw `env.gl_*` import table.
//!
//! ```rust
//! use shaderlink::prelude::*;
//! use shaderlink::HeadlessHost;
//!
//! fn main() -> Result<()> {
//!     let host = HeadlessHost::new();
//!     let context = host.acquire_context("canvas")?;
//!     let program = create_shader_program(
//!         &host,
//!         context,
//!         "void main(){gl_Position=vec4(0,0,0,1);}",
//!         "void main(){gl_FragColor=vec4(1,0,0,1);}",
//!     )?;
//!     assert!(!program.is_null());
//!     Ok(())
//! }
//! ```

pub use shaderlink_core;
pub use shaderlink_web;

pub use shaderlink_core::{
    create_shader_program, init, BuildError, BuildOptions, CleanupPolicy, ConfigManager,
    GlHost, HeadlessHost, ShaderProgramBuilder, ShaderStage, ShaderlinkConfig, ShaderlinkError,
};

/// Unified prelude module that exports all commonly used types
pub mod prelude {
    pub use shaderlink_core::prelude::*;

    #[cfg(target_arch = "wasm32")]
    pub use shaderlink_web::{ShaderLinker, WebGlHost};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(VERSION, shaderlink_core::VERSION);
    }

    #[test]
    fn test_facade_builds_through_core() {
        let host = HeadlessHost::new();
        let context = host.acquire_context("canvas").unwrap();
        let err = create_shader_program(&host, context, "void main(){}", "void main(){}")
            .unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStage::Vertex));
    }
}
