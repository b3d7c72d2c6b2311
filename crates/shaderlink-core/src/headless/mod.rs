//! In-memory host for tests, benches and native tooling.
//!
//! `HeadlessHost` implements [`GlHost`] without a GPU. It keeps every object
//! in a table, runs a small source check on compile and an interface check
//! on link, and records each call it receives so callers can assert on the
//! exact sequence.

mod glsl;

use crate::error::{Result, ShaderlinkError};
use crate::gl::{
    GlEnum, ShaderStage, ATTACHED_SHADERS, COMPILE_STATUS, DELETE_STATUS, LINK_STATUS,
    SHADER_TYPE,
};
use crate::handle::{ContextHandle, ProgramHandle, ShaderHandle};
use crate::host::{truncate_info_log, GlHost};
use crate::logging::LogCategory;
use crate::shaderlink_trace;
use glsl::{Interface, Qualifier};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::HashMap;

/// One call received by a [`HeadlessHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    AcquireContext { surface: String },
    CreateShader { stage: ShaderStage, shader: ShaderHandle },
    ShaderSource { shader: ShaderHandle },
    CompileShader { shader: ShaderHandle },
    ShaderParameter { shader: ShaderHandle, pname: GlEnum },
    ShaderInfoLog { shader: ShaderHandle },
    CreateProgram { program: ProgramHandle },
    AttachShader { program: ProgramHandle, shader: ShaderHandle },
    LinkProgram { program: ProgramHandle },
    ProgramParameter { program: ProgramHandle, pname: GlEnum },
    ProgramInfoLog { program: ProgramHandle },
    DetachShader { program: ProgramHandle, shader: ShaderHandle },
    DeleteShader { shader: ShaderHandle },
    DeleteProgram { program: ProgramHandle },
}

#[derive(Debug)]
struct ContextState {
    lost: bool,
}

#[derive(Debug)]
struct ShaderObject {
    context: ContextHandle,
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
    interface: Option<Interface>,
    deleted: bool,
}

#[derive(Debug)]
struct ProgramObject {
    context: ContextHandle,
    attached: SmallVec<[ShaderHandle; 2]>,
    linked: bool,
    log: String,
    deleted: bool,
}

#[derive(Debug, Default)]
struct HeadlessState {
    surfaces: HashMap<String, ContextHandle>,
    contexts: HashMap<ContextHandle, ContextState>,
    shaders: HashMap<ShaderHandle, ShaderObject>,
    programs: HashMap<ProgramHandle, ProgramObject>,
    next_context: u32,
    next_object: u32,
    calls: Vec<HostCall>,
}

impl HeadlessState {
    fn is_live(&self, context: ContextHandle) -> bool {
        self.contexts.get(&context).map_or(false, |c| !c.lost)
    }

    fn next_object_id(&mut self) -> u32 {
        self.next_object += 1;
        self.next_object
    }

    fn shader_mut(&mut self, context: ContextHandle, shader: ShaderHandle) -> Option<&mut ShaderObject> {
        if !self.is_live(context) {
            return None;
        }
        self.shaders
            .get_mut(&shader)
            .filter(|s| s.context == context)
    }

    fn shader(&self, context: ContextHandle, shader: ShaderHandle) -> Option<&ShaderObject> {
        if !self.is_live(context) {
            return None;
        }
        self.shaders.get(&shader).filter(|s| s.context == context)
    }

    fn program_mut(&mut self, context: ContextHandle, program: ProgramHandle) -> Option<&mut ProgramObject> {
        if !self.is_live(context) {
            return None;
        }
        self.programs
            .get_mut(&program)
            .filter(|p| p.context == context)
    }

    fn program(&self, context: ContextHandle, program: ProgramHandle) -> Option<&ProgramObject> {
        if !self.is_live(context) {
            return None;
        }
        self.programs.get(&program).filter(|p| p.context == context)
    }

    /// Check the attached shaders of `program`, returning the link log on failure
    fn link(&self, program: &ProgramObject) -> std::result::Result<(), String> {
        let mut vertex = None;
        let mut fragment = None;
        for handle in &program.attached {
            let Some(shader) = self.shaders.get(handle) else {
                continue;
            };
            match shader.stage {
                ShaderStage::Vertex => vertex = Some(shader),
                ShaderStage::Fragment => fragment = Some(shader),
            }
        }

        let vertex = vertex.ok_or("Missing or invalid vertex shader.")?;
        let fragment = fragment.ok_or("Missing or invalid fragment shader.")?;
        let (Some(vs), Some(fs)) = (&vertex.interface, &fragment.interface) else {
            let stage = if vertex.compiled { "fragment" } else { "vertex" };
            return Err(format!("Attached {} shader is not compiled.", stage));
        };

        for varying in fs.with_qualifier(Qualifier::Varying) {
            match vs.find(Qualifier::Varying, &varying.name) {
                None => {
                    return Err(format!(
                        "Varying `{}` is declared in the fragment shader, but is not declared in the vertex shader.",
                        varying.name
                    ))
                }
                Some(declared) if declared.ty != varying.ty => {
                    return Err(format!(
                        "Varying `{}` has type {} in the vertex shader but {} in the fragment shader.",
                        varying.name, declared.ty, varying.ty
                    ))
                }
                Some(_) => {}
            }
        }

        for uniform in fs.with_qualifier(Qualifier::Uniform) {
            if let Some(declared) = vs.find(Qualifier::Uniform, &uniform.name) {
                if declared.ty != uniform.ty {
                    return Err(format!(
                        "Uniform `{}` has type {} in the vertex shader but {} in the fragment shader.",
                        uniform.name, declared.ty, uniform.ty
                    ));
                }
            }
        }

        Ok(())
    }
}

/// GPU-less [`GlHost`] backed by in-memory object tables.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    state: Mutex<HeadlessState>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a lost context: creation returns null handles and every
    /// query on its objects reports 0 from now on.
    pub fn lose_context(&self, context: ContextHandle) {
        if let Some(state) = self.state.lock().contexts.get_mut(&context) {
            state.lost = true;
        }
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Number of shader objects created and not deleted
    pub fn shader_count(&self) -> usize {
        self.state.lock().shaders.values().filter(|s| !s.deleted).count()
    }

    /// Number of program objects created and not deleted
    pub fn program_count(&self) -> usize {
        self.state.lock().programs.values().filter(|p| !p.deleted).count()
    }

    pub fn is_shader_deleted(&self, shader: ShaderHandle) -> bool {
        self.state
            .lock()
            .shaders
            .get(&shader)
            .map_or(false, |s| s.deleted)
    }

    pub fn is_program_deleted(&self, program: ProgramHandle) -> bool {
        self.state
            .lock()
            .programs
            .get(&program)
            .map_or(false, |p| p.deleted)
    }

    pub fn is_program_linked(&self, program: ProgramHandle) -> bool {
        self.state
            .lock()
            .programs
            .get(&program)
            .map_or(false, |p| p.linked)
    }

    pub fn attached_shaders(&self, program: ProgramHandle) -> Vec<ShaderHandle> {
        self.state
            .lock()
            .programs
            .get(&program)
            .map(|p| p.attached.to_vec())
            .unwrap_or_default()
    }

    /// Source last uploaded to `shader`
    pub fn shader_source_text(&self, shader: ShaderHandle) -> Option<String> {
        self.state.lock().shaders.get(&shader).map(|s| s.source.clone())
    }

    fn record(state: &mut HeadlessState, call: HostCall) {
        shaderlink_trace!(LogCategory::Host, call = ?call, "headless call");
        state.calls.push(call);
    }
}

impl GlHost for HeadlessHost {
    fn acquire_context(&self, surface: &str) -> Result<ContextHandle> {
        let mut state = self.state.lock();
        Self::record(
            &mut state,
            HostCall::AcquireContext {
                surface: surface.to_string(),
            },
        );
        if surface.is_empty() {
            return Err(ShaderlinkError::context_unavailable("empty surface id"));
        }
        if let Some(&context) = state.surfaces.get(surface) {
            return Ok(context);
        }
        state.next_context += 1;
        let context = ContextHandle::from_raw(state.next_context);
        state.surfaces.insert(surface.to_string(), context);
        state.contexts.insert(context, ContextState { lost: false });
        Ok(context)
    }

    fn create_shader(&self, context: ContextHandle, stage: ShaderStage) -> ShaderHandle {
        let mut state = self.state.lock();
        let shader = if state.is_live(context) {
            let shader = ShaderHandle::from_raw(state.next_object_id());
            state.shaders.insert(
                shader,
                ShaderObject {
                    context,
                    stage,
                    source: String::new(),
                    compiled: false,
                    log: String::new(),
                    interface: None,
                    deleted: false,
                },
            );
            shader
        } else {
            ShaderHandle::NULL
        };
        Self::record(&mut state, HostCall::CreateShader { stage, shader });
        shader
    }

    fn shader_source(&self, context: ContextHandle, shader: ShaderHandle, source: &str) {
        let mut state = self.state.lock();
        Self::record(&mut state, HostCall::ShaderSource { shader });
        if let Some(object) = state.shader_mut(context, shader).filter(|s| !s.deleted) {
            object.source = source.to_string();
        }
    }

    fn compile_shader(&self, context: ContextHandle, shader: ShaderHandle) {
        let mut state = self.state.lock();
        Self::record(&mut state, HostCall::CompileShader { shader });
        if let Some(object) = state.shader_mut(context, shader).filter(|s| !s.deleted) {
            match glsl::check(object.stage, &object.source) {
                Ok(interface) => {
                    object.compiled = true;
                    object.log.clear();
                    object.interface = Some(interface);
                }
                Err(log) => {
                    object.compiled = false;
                    object.log = log;
                    object.interface = None;
                }
            }
        }
    }

    fn shader_parameter(&self, context: ContextHandle, shader: ShaderHandle, pname: GlEnum) -> i32 {
        let mut state = self.state.lock();
        Self::record(&mut state, HostCall::ShaderParameter { shader, pname });
        let Some(object) = state.shader(context, shader) else {
            return 0;
        };
        match pname {
            COMPILE_STATUS => object.compiled as i32,
            DELETE_STATUS => object.deleted as i32,
            SHADER_TYPE => object.stage.gl_enum() as i32,
            _ => 0,
        }
    }

    fn shader_info_log(&self, context: ContextHandle, shader: ShaderHandle, max_len: usize) -> String {
        let mut state = self.state.lock();
        Self::record(&mut state, HostCall::ShaderInfoLog { shader });
        state
            .shader(context, shader)
            .map(|s| truncate_info_log(&s.log, max_len))
            .unwrap_or_default()
    }

    fn create_program(&self, context: ContextHandle) -> ProgramHandle {
        let mut state = self.state.lock();
        let program = if state.is_live(context) {
            let program = ProgramHandle::from_raw(state.next_object_id());
            state.programs.insert(
                program,
                ProgramObject {
                    context,
                    attached: SmallVec::new(),
                    linked: false,
                    log: String::new(),
                    deleted: false,
                },
            );
            program
        } else {
            ProgramHandle::NULL
        };
        Self::record(&mut state, HostCall::CreateProgram { program });
        program
    }

    fn attach_shader(&self, context: ContextHandle, program: ProgramHandle, shader: ShaderHandle) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        Self::record(state, HostCall::AttachShader { program, shader });
        let Some(stage) = state
            .shader(context, shader)
            .filter(|s| !s.deleted)
            .map(|s| s.stage)
        else {
            return;
        };
        let shaders = &state.shaders;
        let Some(object) = state
            .programs
            .get_mut(&program)
            .filter(|p| p.context == context && !p.deleted)
        else {
            return;
        };
        // A program holds at most one shader per stage
        let stage_taken = object
            .attached
            .iter()
            .any(|h| shaders.get(h).map_or(false, |s| s.stage == stage));
        if !stage_taken {
            object.attached.push(shader);
        }
    }

    fn link_program(&self, context: ContextHandle, program: ProgramHandle) {
        let mut state = self.state.lock();
        Self::record(&mut state, HostCall::LinkProgram { program });
        let Some(object) = state.program(context, program).filter(|p| !p.deleted) else {
            return;
        };
        let outcome = state.link(object);
        if let Some(object) = state.program_mut(context, program) {
            match outcome {
                Ok(()) => {
                    object.linked = true;
                    object.log.clear();
                }
                Err(log) => {
                    object.linked = false;
                    object.log = log;
                }
            }
        }
    }

    fn program_parameter(&self, context: ContextHandle, program: ProgramHandle, pname: GlEnum) -> i32 {
        let mut state = self.state.lock();
        Self::record(&mut state, HostCall::ProgramParameter { program, pname });
        let Some(object) = state.program(context, program) else {
            return 0;
        };
        match pname {
            LINK_STATUS => object.linked as i32,
            DELETE_STATUS => object.deleted as i32,
            ATTACHED_SHADERS => object.attached.len() as i32,
            _ => 0,
        }
    }

    fn program_info_log(&self, context: ContextHandle, program: ProgramHandle, max_len: usize) -> String {
        let mut state = self.state.lock();
        Self::record(&mut state, HostCall::ProgramInfoLog { program });
        state
            .program(context, program)
            .map(|p| truncate_info_log(&p.log, max_len))
            .unwrap_or_default()
    }

    fn detach_shader(&self, context: ContextHandle, program: ProgramHandle, shader: ShaderHandle) {
        let mut state = self.state.lock();
        Self::record(&mut state, HostCall::DetachShader { program, shader });
        if let Some(object) = state.program_mut(context, program) {
            object.attached.retain(|h| *h != shader);
        }
    }

    fn delete_shader(&self, context: ContextHandle, shader: ShaderHandle) {
        let mut state = self.state.lock();
        Self::record(&mut state, HostCall::DeleteShader { shader });
        if let Some(object) = state.shader_mut(context, shader) {
            object.deleted = true;
        }
    }

    fn delete_program(&self, context: ContextHandle, program: ProgramHandle) {
        let mut state = self.state.lock();
        Self::record(&mut state, HostCall::DeleteProgram { program });
        if let Some(object) = state.program_mut(context, program) {
            object.deleted = true;
            object.attached.clear();
        }
    }
}
