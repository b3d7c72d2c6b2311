//! Host backend over the raw `gl_*` import table.
//!
//! A host embedding this module provides the functions below under the
//! `env` import module, each taking a context id as its first argument.
//! Shader and program ids cross the boundary as plain integers and log text
//! is written into a caller-owned buffer. `createShaderProgram` is exported
//! with the same C signature, returning `0` on failure.

use crate::bounded::{read_bounded_log, to_c_string};
use crate::export::create_program_from_c;
use shaderlink_core::gl::{GlEnum, ShaderStage};
use shaderlink_core::handle::{ContextHandle, ProgramHandle, ShaderHandle};
use shaderlink_core::{GlHost, Result, ShaderlinkError};
use std::ffi::{c_char, CStr};

#[cfg(not(feature = "cleanup-imports"))]
use shaderlink_core::{logging::LogCategory, shaderlink_warn};

#[link(wasm_import_module = "env")]
extern "C" {
    fn gl_getContext(canvas: *const c_char) -> u32;
    fn gl_createShader(gl: u32, shader_type: GlEnum) -> u32;
    fn gl_shaderSource(gl: u32, shader: u32, source: *const c_char);
    fn gl_compileShader(gl: u32, shader: u32);
    fn gl_getShaderParameter(gl: u32, shader: u32, pname: GlEnum) -> i32;
    fn gl_getShaderInfoLog(gl: u32, shader: u32, info_log: *mut c_char, max_length: u32);

    fn gl_createProgram(gl: u32) -> u32;
    fn gl_attachShader(gl: u32, program: u32, shader: u32);
    fn gl_linkProgram(gl: u32, program: u32);
    fn gl_getProgramParameter(gl: u32, program: u32, pname: GlEnum) -> i32;
    fn gl_getProgramInfoLog(gl: u32, program: u32, info_log: *mut c_char, max_length: u32);
}

// Cleanup entry points are not part of the base table; hosts opt in
#[cfg(feature = "cleanup-imports")]
#[link(wasm_import_module = "env")]
extern "C" {
    fn gl_detachShader(gl: u32, program: u32, shader: u32);
    fn gl_deleteShader(gl: u32, shader: u32);
    fn gl_deleteProgram(gl: u32, program: u32);
}

/// [`GlHost`] that forwards every call to the `env.gl_*` imports.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportedHost;

impl GlHost for ImportedHost {
    fn acquire_context(&self, surface: &str) -> Result<ContextHandle> {
        let canvas = to_c_string(surface);
        // SAFETY: `canvas` is NUL-terminated and outlives the call
        let raw = unsafe { gl_getContext(canvas.as_ptr()) };
        let context = ContextHandle::from_raw(raw);
        if context.is_null() {
            return Err(ShaderlinkError::context_unavailable(format!(
                "host returned no context for {:?}",
                surface
            )));
        }
        Ok(context)
    }

    fn create_shader(&self, context: ContextHandle, stage: ShaderStage) -> ShaderHandle {
        ShaderHandle::from_raw(unsafe { gl_createShader(context.raw(), stage.gl_enum()) })
    }

    fn shader_source(&self, context: ContextHandle, shader: ShaderHandle, source: &str) {
        let source = to_c_string(source);
        // SAFETY: `source` is NUL-terminated and outlives the call
        unsafe { gl_shaderSource(context.raw(), shader.raw(), source.as_ptr()) }
    }

    fn compile_shader(&self, context: ContextHandle, shader: ShaderHandle) {
        unsafe { gl_compileShader(context.raw(), shader.raw()) }
    }

    fn shader_parameter(&self, context: ContextHandle, shader: ShaderHandle, pname: GlEnum) -> i32 {
        unsafe { gl_getShaderParameter(context.raw(), shader.raw(), pname) }
    }

    fn shader_info_log(&self, context: ContextHandle, shader: ShaderHandle, max_len: usize) -> String {
        read_bounded_log(max_len, |buffer, len| {
            // SAFETY: `buffer` holds `len` writable bytes
            unsafe { gl_getShaderInfoLog(context.raw(), shader.raw(), buffer, len) }
        })
    }

    fn create_program(&self, context: ContextHandle) -> ProgramHandle {
        ProgramHandle::from_raw(unsafe { gl_createProgram(context.raw()) })
    }

    fn attach_shader(&self, context: ContextHandle, program: ProgramHandle, shader: ShaderHandle) {
        unsafe { gl_attachShader(context.raw(), program.raw(), shader.raw()) }
    }

    fn link_program(&self, context: ContextHandle, program: ProgramHandle) {
        unsafe { gl_linkProgram(context.raw(), program.raw()) }
    }

    fn program_parameter(&self, context: ContextHandle, program: ProgramHandle, pname: GlEnum) -> i32 {
        unsafe { gl_getProgramParameter(context.raw(), program.raw(), pname) }
    }

    fn program_info_log(&self, context: ContextHandle, program: ProgramHandle, max_len: usize) -> String {
        read_bounded_log(max_len, |buffer, len| {
            // SAFETY: `buffer` holds `len` writable bytes
            unsafe { gl_getProgramInfoLog(context.raw(), program.raw(), buffer, len) }
        })
    }

    #[cfg(feature = "cleanup-imports")]
    fn detach_shader(&self, context: ContextHandle, program: ProgramHandle, shader: ShaderHandle) {
        unsafe { gl_detachShader(context.raw(), program.raw(), shader.raw()) }
    }

    #[cfg(feature = "cleanup-imports")]
    fn delete_shader(&self, context: ContextHandle, shader: ShaderHandle) {
        unsafe { gl_deleteShader(context.raw(), shader.raw()) }
    }

    #[cfg(feature = "cleanup-imports")]
    fn delete_program(&self, context: ContextHandle, program: ProgramHandle) {
        unsafe { gl_deleteProgram(context.raw(), program.raw()) }
    }

    #[cfg(not(feature = "cleanup-imports"))]
    fn detach_shader(&self, _context: ContextHandle, program: ProgramHandle, shader: ShaderHandle) {
        shaderlink_warn!(LogCategory::Web, %program, %shader, "gl_detachShader is not imported");
    }

    #[cfg(not(feature = "cleanup-imports"))]
    fn delete_shader(&self, _context: ContextHandle, shader: ShaderHandle) {
        shaderlink_warn!(LogCategory::Web, %shader, "gl_deleteShader is not imported");
    }

    #[cfg(not(feature = "cleanup-imports"))]
    fn delete_program(&self, _context: ContextHandle, program: ProgramHandle) {
        shaderlink_warn!(LogCategory::Web, %program, "gl_deleteProgram is not imported");
    }
}

/// C-ABI entry point with the binding header's signature.
///
/// Returns the linked program id, or `0` if a source is null, either stage
/// failed to compile or the program failed to link. See
/// [`create_program_from_c`] for how sources and options are handled.
///
/// # Safety
///
/// Both source pointers must be null or point at NUL-terminated strings
/// that stay valid for the duration of the call.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn createShaderProgram(
    gl: u32,
    vertex_source: *const c_char,
    fragment_source: *const c_char,
) -> u32 {
    let vertex = if vertex_source.is_null() {
        None
    } else {
        Some(CStr::from_ptr(vertex_source))
    };
    let fragment = if fragment_source.is_null() {
        None
    } else {
        Some(CStr::from_ptr(fragment_source))
    };
    create_program_from_c(&ImportedHost, gl, vertex, fragment)
}
