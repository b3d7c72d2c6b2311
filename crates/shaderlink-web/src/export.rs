//! Build entry shared by the C-ABI `createShaderProgram` export.

use shaderlink_core::config;
use shaderlink_core::handle::ContextHandle;
use shaderlink_core::logging::LogCategory;
use shaderlink_core::{shaderlink_error, GlHost, ShaderProgramBuilder};
use std::ffi::CStr;

/// Build a program on context `gl` of `host` from C strings.
///
/// Returns the program id, or `0` when a source is missing or the build
/// fails; failures are logged. Options come from the global
/// [`ConfigManager`](shaderlink_core::ConfigManager) when one is installed.
/// Bytes that are not valid UTF-8 reach the host as U+FFFD.
pub fn create_program_from_c<H: GlHost + ?Sized>(
    host: &H,
    gl: u32,
    vertex_source: Option<&CStr>,
    fragment_source: Option<&CStr>,
) -> u32 {
    let (Some(vertex), Some(fragment)) = (vertex_source, fragment_source) else {
        shaderlink_error!(LogCategory::Web, "createShaderProgram called with a null source");
        return 0;
    };

    let options = config::get_config_manager()
        .map(|manager| manager.build_options())
        .unwrap_or_default();

    match ShaderProgramBuilder::new(host, ContextHandle::from_raw(gl))
        .with_options(options)
        .build(&vertex.to_string_lossy(), &fragment.to_string_lossy())
    {
        Ok(program) => program.raw(),
        Err(err) => {
            shaderlink_error!(LogCategory::Web, "{}", err);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shaderlink_core::{CleanupPolicy, HeadlessHost, HostCall, ShaderlinkConfig};

    const VERTEX: &[u8] = b"void main(){gl_Position=vec4(0,0,0,1);}\0";
    const FRAGMENT: &[u8] = b"void main(){gl_FragColor=vec4(1,0,0,1);}\0";

    fn c_str(bytes: &[u8]) -> &CStr {
        CStr::from_bytes_with_nul(bytes).unwrap()
    }

    fn host_with_context() -> (HeadlessHost, u32) {
        let host = HeadlessHost::new();
        let context = host.acquire_context("canvas").unwrap();
        host.clear_calls();
        (host, context.raw())
    }

    #[test]
    fn test_null_source_returns_zero_without_host_calls() {
        let (host, gl) = host_with_context();

        assert_eq!(create_program_from_c(&host, gl, None, Some(c_str(FRAGMENT))), 0);
        assert_eq!(create_program_from_c(&host, gl, Some(c_str(VERTEX)), None), 0);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn test_vertex_failure_returns_zero() {
        let (host, gl) = host_with_context();

        let program =
            create_program_from_c(&host, gl, Some(c_str(b"not valid glsl\0")), Some(c_str(FRAGMENT)));

        assert_eq!(program, 0);
        assert_eq!(host.program_count(), 0);
        assert!(!host
            .calls()
            .iter()
            .any(|call| matches!(call, HostCall::CreateProgram { .. })));
    }

    #[test]
    fn test_success_returns_linked_program_id() {
        let (host, gl) = host_with_context();

        let program = create_program_from_c(&host, gl, Some(c_str(VERTEX)), Some(c_str(FRAGMENT)));

        assert_ne!(program, 0);
        assert!(host.is_program_linked(shaderlink_core::ProgramHandle::from_raw(program)));
    }

    #[test]
    fn test_invalid_utf8_is_replaced_before_upload() {
        let (host, gl) = host_with_context();

        create_program_from_c(&host, gl, Some(c_str(b"void \xff main\0")), Some(c_str(FRAGMENT)));

        let shader = host
            .calls()
            .iter()
            .find_map(|call| match call {
                HostCall::CreateShader { shader, .. } => Some(*shader),
                _ => None,
            })
            .unwrap();
        assert_eq!(
            host.shader_source_text(shader).as_deref(),
            Some("void \u{fffd} main")
        );
    }

    // The only test in this binary that installs the global configuration
    #[test]
    fn test_global_config_options_apply() {
        let mut settings = ShaderlinkConfig::default();
        settings.build.cleanup = CleanupPolicy::DeleteAfterLink;
        config::init_config_with(settings);
        let (host, gl) = host_with_context();

        let program = create_program_from_c(&host, gl, Some(c_str(VERTEX)), Some(c_str(FRAGMENT)));

        assert_ne!(program, 0);
        assert!(host
            .attached_shaders(shaderlink_core::ProgramHandle::from_raw(program))
            .is_empty());
    }
}
