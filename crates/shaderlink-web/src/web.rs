//! WebGL backend built on `web-sys`

use crate::table::ObjectTable;
use shaderlink_core::gl::{GlEnum, ShaderStage};
use shaderlink_core::handle::{ContextHandle, ProgramHandle, ShaderHandle};
use shaderlink_core::host::truncate_info_log;
use shaderlink_core::logging::LogCategory;
use shaderlink_core::{
    config, shaderlink_debug, shaderlink_info, shaderlink_warn, BuildError, BuildOptions,
    CleanupPolicy, GlHost, Result, ShaderProgramBuilder, ShaderlinkError,
};
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, HtmlCanvasElement, WebGlProgram, WebGlRenderingContext, WebGlShader,
    Window as WebWindow,
};

/// [`GlHost`] over the browser's WebGL 1 API.
///
/// WebGL objects are JS references, so each one is stored in a table and
/// handed out as its integer id.
#[derive(Default)]
pub struct WebGlHost {
    surfaces: RefCell<HashMap<String, ContextHandle>>,
    contexts: RefCell<ObjectTable<WebGlRenderingContext>>,
    shaders: RefCell<ObjectTable<WebGlShader>>,
    programs: RefCell<ObjectTable<WebGlProgram>>,
}

impl WebGlHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn web_window() -> Result<WebWindow> {
        web_sys::window().ok_or_else(|| ShaderlinkError::context_unavailable("no window"))
    }

    fn document() -> Result<Document> {
        Self::web_window()?
            .document()
            .ok_or_else(|| ShaderlinkError::context_unavailable("no document"))
    }

    fn find_canvas(id: &str) -> Result<HtmlCanvasElement> {
        Self::document()?
            .get_element_by_id(id)
            .ok_or_else(|| {
                ShaderlinkError::context_unavailable(format!("no element with id {:?}", id))
            })?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| {
                ShaderlinkError::context_unavailable(format!("element {:?} is not a canvas", id))
            })
    }

    /// The rendering context behind `context`
    pub fn gl(&self, context: ContextHandle) -> Option<WebGlRenderingContext> {
        self.contexts.borrow().get(context.raw()).cloned()
    }

    /// The WebGL program behind `program`, for use with the raw context
    pub fn program(&self, program: ProgramHandle) -> Option<WebGlProgram> {
        self.programs.borrow().get(program.raw()).cloned()
    }

    fn shader(&self, shader: ShaderHandle) -> Option<WebGlShader> {
        self.shaders.borrow().get(shader.raw()).cloned()
    }

    fn parameter_to_int(value: JsValue) -> i32 {
        match value.as_bool() {
            Some(flag) => flag as i32,
            None => value.as_f64().map(|number| number as i32).unwrap_or(0),
        }
    }
}

impl GlHost for WebGlHost {
    fn acquire_context(&self, surface: &str) -> Result<ContextHandle> {
        if let Some(handle) = self.surfaces.borrow().get(surface) {
            return Ok(*handle);
        }

        let canvas = Self::find_canvas(surface)?;
        let gl = canvas
            .get_context("webgl")
            .map_err(|e| {
                ShaderlinkError::context_unavailable(format!("getContext failed: {:?}", e))
            })?
            .ok_or_else(|| ShaderlinkError::context_unavailable("WebGL is not supported"))?
            .dyn_into::<WebGlRenderingContext>()
            .map_err(|_| ShaderlinkError::context_unavailable("unexpected context type"))?;

        let handle = ContextHandle::from_raw(self.contexts.borrow_mut().insert(gl));
        self.surfaces
            .borrow_mut()
            .insert(surface.to_string(), handle);
        shaderlink_info!(LogCategory::Web, %handle, canvas = surface, "acquired WebGL context");
        Ok(handle)
    }

    fn create_shader(&self, context: ContextHandle, stage: ShaderStage) -> ShaderHandle {
        let created = self
            .gl(context)
            .and_then(|gl| gl.create_shader(stage.gl_enum()));
        match created {
            Some(shader) => ShaderHandle::from_raw(self.shaders.borrow_mut().insert(shader)),
            None => ShaderHandle::NULL,
        }
    }

    fn shader_source(&self, context: ContextHandle, shader: ShaderHandle, source: &str) {
        if let (Some(gl), Some(shader)) = (self.gl(context), self.shader(shader)) {
            gl.shader_source(&shader, source);
        }
    }

    fn compile_shader(&self, context: ContextHandle, shader: ShaderHandle) {
        if let (Some(gl), Some(shader)) = (self.gl(context), self.shader(shader)) {
            gl.compile_shader(&shader);
        }
    }

    fn shader_parameter(&self, context: ContextHandle, shader: ShaderHandle, pname: GlEnum) -> i32 {
        match (self.gl(context), self.shader(shader)) {
            (Some(gl), Some(shader)) => Self::parameter_to_int(gl.get_shader_parameter(&shader, pname)),
            _ => 0,
        }
    }

    fn shader_info_log(&self, context: ContextHandle, shader: ShaderHandle, max_len: usize) -> String {
        let log = match (self.gl(context), self.shader(shader)) {
            (Some(gl), Some(shader)) => gl.get_shader_info_log(&shader).unwrap_or_default(),
            _ => String::new(),
        };
        truncate_info_log(&log, max_len)
    }

    fn create_program(&self, context: ContextHandle) -> ProgramHandle {
        match self.gl(context).and_then(|gl| gl.create_program()) {
            Some(program) => ProgramHandle::from_raw(self.programs.borrow_mut().insert(program)),
            None => ProgramHandle::NULL,
        }
    }

    fn attach_shader(&self, context: ContextHandle, program: ProgramHandle, shader: ShaderHandle) {
        if let (Some(gl), Some(program), Some(shader)) =
            (self.gl(context), self.program(program), self.shader(shader))
        {
            gl.attach_shader(&program, &shader);
        }
    }

    fn link_program(&self, context: ContextHandle, program: ProgramHandle) {
        if let (Some(gl), Some(program)) = (self.gl(context), self.program(program)) {
            gl.link_program(&program);
        }
    }

    fn program_parameter(&self, context: ContextHandle, program: ProgramHandle, pname: GlEnum) -> i32 {
        match (self.gl(context), self.program(program)) {
            (Some(gl), Some(program)) => {
                Self::parameter_to_int(gl.get_program_parameter(&program, pname))
            }
            _ => 0,
        }
    }

    fn program_info_log(&self, context: ContextHandle, program: ProgramHandle, max_len: usize) -> String {
        let log = match (self.gl(context), self.program(program)) {
            (Some(gl), Some(program)) => gl.get_program_info_log(&program).unwrap_or_default(),
            _ => String::new(),
        };
        truncate_info_log(&log, max_len)
    }

    fn detach_shader(&self, context: ContextHandle, program: ProgramHandle, shader: ShaderHandle) {
        if let (Some(gl), Some(program), Some(shader)) =
            (self.gl(context), self.program(program), self.shader(shader))
        {
            gl.detach_shader(&program, &shader);
        }
    }

    fn delete_shader(&self, context: ContextHandle, shader: ShaderHandle) {
        // Unknown contexts leave the table untouched
        let Some(gl) = self.gl(context) else {
            return;
        };
        if let Some(shader) = self.shaders.borrow_mut().remove(shader.raw()) {
            gl.delete_shader(Some(&shader));
        }
    }

    fn delete_program(&self, context: ContextHandle, program: ProgramHandle) {
        let Some(gl) = self.gl(context) else {
            return;
        };
        if let Some(program) = self.programs.borrow_mut().remove(program.raw()) {
            gl.delete_program(Some(&program));
        }
    }
}

/// Install the panic hook, route `tracing` output to the browser console and
/// create the global configuration. Safe to call more than once.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    if tracing_wasm::try_set_as_global_default().is_err() {
        shaderlink_debug!(LogCategory::Web, "tracing subscriber already installed");
    }
    config::init_config();
    shaderlink_info!(LogCategory::Web, "shaderlink web backend initialized");
}

fn build_error_to_js(err: &BuildError) -> JsValue {
    let error = js_sys::Error::new(&err.to_string());
    let stage = err
        .stage()
        .map(|stage| JsValue::from_str(stage.as_str()))
        .unwrap_or(JsValue::NULL);
    // Reflect::set only fails on frozen objects
    let _ = js_sys::Reflect::set(&error, &"stage".into(), &stage);
    let _ = js_sys::Reflect::set(&error, &"log".into(), &JsValue::from_str(err.log()));
    error.into()
}

/// Shader program builder bound to one canvas, exported to JavaScript.
#[wasm_bindgen]
pub struct ShaderLinker {
    host: WebGlHost,
    context: ContextHandle,
    options: BuildOptions,
}

#[wasm_bindgen]
impl ShaderLinker {
    /// Acquire a WebGL context on the canvas with id `canvas_id`
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> std::result::Result<ShaderLinker, JsValue> {
        let host = WebGlHost::new();
        let context = host
            .acquire_context(canvas_id)
            .map_err(|e| JsValue::from(js_sys::Error::new(&e.to_string())))?;
        let options = config::get_config_manager()
            .map(|manager| manager.build_options())
            .unwrap_or_default();
        Ok(Self {
            host,
            context,
            options,
        })
    }

    /// Compile and link a program, returning its id.
    ///
    /// Throws an `Error` carrying `stage` (`"vertex"`, `"fragment"` or
    /// `null` for link failures) and the driver's `log`.
    #[wasm_bindgen(js_name = createShaderProgram)]
    pub fn create_shader_program(
        &self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> std::result::Result<u32, JsValue> {
        ShaderProgramBuilder::new(&self.host, self.context)
            .with_options(self.options)
            .build(vertex_source, fragment_source)
            .map(u32::from)
            .map_err(|err| {
                shaderlink_warn!(LogCategory::Web, "{}", err);
                build_error_to_js(&err)
            })
    }

    /// One of `"retain"`, `"delete_on_failure"` or `"delete_after_link"`
    #[wasm_bindgen(js_name = setCleanupPolicy)]
    pub fn set_cleanup_policy(&mut self, name: &str) -> std::result::Result<(), JsValue> {
        let policy = CleanupPolicy::from_name(name).ok_or_else(|| {
            JsValue::from(js_sys::Error::new(&format!("unknown cleanup policy {:?}", name)))
        })?;
        shaderlink_debug!(LogCategory::Web, policy = policy.as_str(), "cleanup policy set");
        self.options.cleanup = policy;
        Ok(())
    }

    /// The WebGL program for a handle returned by `createShaderProgram`
    pub fn program(&self, handle: u32) -> Option<WebGlProgram> {
        self.host.program(ProgramHandle::from_raw(handle))
    }

    /// The rendering context this linker builds against
    pub fn context(&self) -> Option<WebGlRenderingContext> {
        self.host.gl(self.context)
    }
}
