//! The host graphics API as seen from Rust.
//!
//! Every call is a synchronous request against a context owned by the host.
//! Methods take `&self` because the host API is stateful behind an opaque
//! context, the same way a `WebGlRenderingContext` is used.

use crate::error::Result;
use crate::gl::{GlEnum, ShaderStage};
use crate::handle::{ContextHandle, ProgramHandle, ShaderHandle};

/// Host-provided shader and program primitives.
pub trait GlHost {
    /// Acquire a drawing context for the given surface identifier
    fn acquire_context(&self, surface: &str) -> Result<ContextHandle>;

    fn create_shader(&self, context: ContextHandle, stage: ShaderStage) -> ShaderHandle;
    fn shader_source(&self, context: ContextHandle, shader: ShaderHandle, source: &str);
    fn compile_shader(&self, context: ContextHandle, shader: ShaderHandle);
    /// Boolean-as-int shader query, e.g. `COMPILE_STATUS`
    fn shader_parameter(&self, context: ContextHandle, shader: ShaderHandle, pname: GlEnum) -> i32;
    /// Diagnostic log, at most `max_len - 1` bytes
    fn shader_info_log(&self, context: ContextHandle, shader: ShaderHandle, max_len: usize) -> String;

    fn create_program(&self, context: ContextHandle) -> ProgramHandle;
    fn attach_shader(&self, context: ContextHandle, program: ProgramHandle, shader: ShaderHandle);
    fn link_program(&self, context: ContextHandle, program: ProgramHandle);
    /// Boolean-as-int program query, e.g. `LINK_STATUS`
    fn program_parameter(&self, context: ContextHandle, program: ProgramHandle, pname: GlEnum) -> i32;
    /// Diagnostic log, at most `max_len - 1` bytes
    fn program_info_log(&self, context: ContextHandle, program: ProgramHandle, max_len: usize) -> String;

    fn detach_shader(&self, context: ContextHandle, program: ProgramHandle, shader: ShaderHandle);
    fn delete_shader(&self, context: ContextHandle, shader: ShaderHandle);
    fn delete_program(&self, context: ContextHandle, program: ProgramHandle);
}

impl<H: GlHost + ?Sized> GlHost for &H {
    fn acquire_context(&self, surface: &str) -> Result<ContextHandle> {
        (**self).acquire_context(surface)
    }
    fn create_shader(&self, context: ContextHandle, stage: ShaderStage) -> ShaderHandle {
        (**self).create_shader(context, stage)
    }
    fn shader_source(&self, context: ContextHandle, shader: ShaderHandle, source: &str) {
        (**self).shader_source(context, shader, source)
    }
    fn compile_shader(&self, context: ContextHandle, shader: ShaderHandle) {
        (**self).compile_shader(context, shader)
    }
    fn shader_parameter(&self, context: ContextHandle, shader: ShaderHandle, pname: GlEnum) -> i32 {
        (**self).shader_parameter(context, shader, pname)
    }
    fn shader_info_log(&self, context: ContextHandle, shader: ShaderHandle, max_len: usize) -> String {
        (**self).shader_info_log(context, shader, max_len)
    }
    fn create_program(&self, context: ContextHandle) -> ProgramHandle {
        (**self).create_program(context)
    }
    fn attach_shader(&self, context: ContextHandle, program: ProgramHandle, shader: ShaderHandle) {
        (**self).attach_shader(context, program, shader)
    }
    fn link_program(&self, context: ContextHandle, program: ProgramHandle) {
        (**self).link_program(context, program)
    }
    fn program_parameter(&self, context: ContextHandle, program: ProgramHandle, pname: GlEnum) -> i32 {
        (**self).program_parameter(context, program, pname)
    }
    fn program_info_log(&self, context: ContextHandle, program: ProgramHandle, max_len: usize) -> String {
        (**self).program_info_log(context, program, max_len)
    }
    fn detach_shader(&self, context: ContextHandle, program: ProgramHandle, shader: ShaderHandle) {
        (**self).detach_shader(context, program, shader)
    }
    fn delete_shader(&self, context: ContextHandle, shader: ShaderHandle) {
        (**self).delete_shader(context, shader)
    }
    fn delete_program(&self, context: ContextHandle, program: ProgramHandle) {
        (**self).delete_program(context, program)
    }
}

/// Clip a diagnostic log the way a caller-supplied buffer of `max_len`
/// bytes would: one byte is reserved for the terminator and the cut never
/// splits a UTF-8 sequence.
pub fn truncate_info_log(log: &str, max_len: usize) -> String {
    let limit = max_len.saturating_sub(1);
    if log.len() <= limit {
        return log.to_string();
    }
    let mut end = limit;
    while !log.is_char_boundary(end) {
        end -= 1;
    }
    log[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_log_untouched() {
        assert_eq!(truncate_info_log("ok", 512), "ok");
        assert_eq!(truncate_info_log("abc", 4), "abc");
    }

    #[test]
    fn test_truncate_reserves_terminator() {
        assert_eq!(truncate_info_log("abcdef", 4), "abc");
        assert_eq!(truncate_info_log("abcdef", 1), "");
        assert_eq!(truncate_info_log("abcdef", 0), "");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // 'é' is two bytes; a 3 byte budget leaves room for "a" plus half of 'é'
        assert_eq!(truncate_info_log("aéb", 3), "a");
        assert_eq!(truncate_info_log("aéb", 4), "aé");
    }
}
