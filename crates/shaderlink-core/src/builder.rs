//! Vertex + fragment compile, link, and status checks.
//!
//! A build walks a fixed sequence of host calls:
//!
//! ```text
//! Start -> VertexCompiling -> VertexCompiled -> FragmentCompiling
//!       -> FragmentCompiled -> Linking -> Linked
//! ```
//!
//! Any status check can jump straight to `Failed`. Nothing survives between
//! builds; the builder only borrows the host and remembers its options.

use crate::error::BuildError;
use crate::gl::{status_is_set, ShaderStage, COMPILE_STATUS, LINK_STATUS};
use crate::handle::{ContextHandle, ProgramHandle, ShaderHandle};
use crate::host::GlHost;
use crate::logging::LogCategory;
use crate::{shaderlink_debug, shaderlink_trace, shaderlink_warn};

/// Log buffer size of the `gl_get*InfoLog` bindings
pub const DEFAULT_INFO_LOG_CAPACITY: usize = 512;

/// What happens to host objects once a build has finished with them.
///
/// `Retain` issues no deletion calls at all. The other policies are opt-in
/// and add calls after the status checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CleanupPolicy {
    #[default]
    Retain,
    /// Delete every object created by a build that failed
    DeleteOnFailure,
    /// `DeleteOnFailure`, and detach + delete both shaders after a link
    DeleteAfterLink,
}

impl CleanupPolicy {
    pub const fn deletes_on_failure(self) -> bool {
        !matches!(self, CleanupPolicy::Retain)
    }

    pub const fn deletes_after_link(self) -> bool {
        matches!(self, CleanupPolicy::DeleteAfterLink)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            CleanupPolicy::Retain => "retain",
            CleanupPolicy::DeleteOnFailure => "delete_on_failure",
            CleanupPolicy::DeleteAfterLink => "delete_after_link",
        }
    }

    /// Parse the snake_case name used in config files
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "retain" => Some(CleanupPolicy::Retain),
            "delete_on_failure" => Some(CleanupPolicy::DeleteOnFailure),
            "delete_after_link" => Some(CleanupPolicy::DeleteAfterLink),
            _ => None,
        }
    }
}

/// Per-builder options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Bytes requested when fetching a diagnostic log, terminator included
    pub info_log_capacity: usize,
    pub cleanup: CleanupPolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            info_log_capacity: DEFAULT_INFO_LOG_CAPACITY,
            cleanup: CleanupPolicy::Retain,
        }
    }
}

/// Progress of a single build, traced at `Builder` level
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BuildState {
    Start,
    VertexCompiling,
    VertexCompiled,
    FragmentCompiling,
    FragmentCompiled,
    Linking,
    Linked,
    Failed(BuildError),
}

impl BuildState {
    fn is_terminal(&self) -> bool {
        matches!(self, BuildState::Linked | BuildState::Failed(_))
    }

    fn compiling(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => BuildState::VertexCompiling,
            ShaderStage::Fragment => BuildState::FragmentCompiling,
        }
    }

    fn compiled(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => BuildState::VertexCompiled,
            ShaderStage::Fragment => BuildState::FragmentCompiled,
        }
    }
}

/// Compiles and links shader programs against one context.
pub struct ShaderProgramBuilder<'h, H: GlHost + ?Sized> {
    host: &'h H,
    context: ContextHandle,
    options: BuildOptions,
}

impl<'h, H: GlHost + ?Sized> ShaderProgramBuilder<'h, H> {
    pub fn new(host: &'h H, context: ContextHandle) -> Self {
        Self {
            host,
            context,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn info_log_capacity(mut self, capacity: usize) -> Self {
        self.options.info_log_capacity = capacity;
        self
    }

    pub fn cleanup(mut self, policy: CleanupPolicy) -> Self {
        self.options.cleanup = policy;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn context(&self) -> ContextHandle {
        self.context
    }

    /// Compile both stages and link them into a new program.
    ///
    /// Returns the program only if both compile checks and the link check
    /// reported success.
    pub fn build(
        &self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, BuildError> {
        let mut state = BuildState::Start;

        let vertex = match self.compile_stage(&mut state, ShaderStage::Vertex, vertex_source) {
            Ok(shader) => shader,
            Err((shader, err)) => {
                if self.options.cleanup.deletes_on_failure() {
                    self.host.delete_shader(self.context, shader);
                }
                return Err(self.fail(&mut state, err));
            }
        };

        let fragment =
            match self.compile_stage(&mut state, ShaderStage::Fragment, fragment_source) {
                Ok(shader) => shader,
                Err((shader, err)) => {
                    if self.options.cleanup.deletes_on_failure() {
                        self.host.delete_shader(self.context, shader);
                        self.host.delete_shader(self.context, vertex);
                    }
                    return Err(self.fail(&mut state, err));
                }
            };

        advance(&mut state, BuildState::Linking);
        let program = self.host.create_program(self.context);
        self.host.attach_shader(self.context, program, vertex);
        self.host.attach_shader(self.context, program, fragment);
        self.host.link_program(self.context, program);

        let status = self
            .host
            .program_parameter(self.context, program, LINK_STATUS);
        if !status_is_set(status) {
            let log = self.host.program_info_log(
                self.context,
                program,
                self.options.info_log_capacity,
            );
            if self.options.cleanup.deletes_on_failure() {
                self.host.delete_program(self.context, program);
                self.host.delete_shader(self.context, vertex);
                self.host.delete_shader(self.context, fragment);
            }
            return Err(self.fail(&mut state, BuildError::ProgramLink { log }));
        }

        if self.options.cleanup.deletes_after_link() {
            for shader in [vertex, fragment] {
                self.host.detach_shader(self.context, program, shader);
                self.host.delete_shader(self.context, shader);
            }
        }

        advance(&mut state, BuildState::Linked);
        shaderlink_debug!(
            LogCategory::Builder,
            context = %self.context,
            program = %program,
            "linked shader program"
        );
        Ok(program)
    }

    /// Create, upload, compile and check one stage. On failure the shader
    /// handle is handed back so the caller can apply the cleanup policy.
    fn compile_stage(
        &self,
        state: &mut BuildState,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderHandle, (ShaderHandle, BuildError)> {
        advance(state, BuildState::compiling(stage));

        let shader = self.host.create_shader(self.context, stage);
        self.host.shader_source(self.context, shader, source);
        self.host.compile_shader(self.context, shader);

        let status = self
            .host
            .shader_parameter(self.context, shader, COMPILE_STATUS);
        if !status_is_set(status) {
            let log =
                self.host
                    .shader_info_log(self.context, shader, self.options.info_log_capacity);
            return Err((shader, BuildError::ShaderCompile { stage, log }));
        }

        advance(state, BuildState::compiled(stage));
        Ok(shader)
    }

    fn fail(&self, state: &mut BuildState, err: BuildError) -> BuildError {
        shaderlink_warn!(
            LogCategory::Builder,
            context = %self.context,
            stage = ?err.stage(),
            "{}",
            err
        );
        advance(state, BuildState::Failed(err.clone()));
        err
    }
}

fn advance(state: &mut BuildState, next: BuildState) {
    debug_assert!(!state.is_terminal(), "build already finished as {:?}", state);
    shaderlink_trace!(LogCategory::Builder, from = ?state, to = ?next, "build state");
    *state = next;
}

/// Compile `vertex_source` and `fragment_source` and link them into a program
/// on `context`, using default options.
pub fn create_shader_program<H: GlHost + ?Sized>(
    host: &H,
    context: ContextHandle,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<ProgramHandle, BuildError> {
    ShaderProgramBuilder::new(host, context).build(vertex_source, fragment_source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{ShaderStage, COMPILE_STATUS, LINK_STATUS};
    use crate::headless::{HeadlessHost, HostCall};
    use pretty_assertions::assert_eq;

    const VERTEX: &str = "void main(){gl_Position=vec4(0,0,0,1);}";
    const FRAGMENT: &str = "void main(){gl_FragColor=vec4(1,0,0,1);}";

    fn host_with_context() -> (HeadlessHost, ContextHandle) {
        let host = HeadlessHost::new();
        let context = host.acquire_context("canvas").unwrap();
        host.clear_calls();
        (host, context)
    }

    fn shader(raw: u32) -> ShaderHandle {
        ShaderHandle::from_raw(raw)
    }

    fn program(raw: u32) -> ProgramHandle {
        ProgramHandle::from_raw(raw)
    }

    #[test]
    fn test_successful_build_call_sequence() {
        let (host, context) = host_with_context();

        let linked = create_shader_program(&host, context, VERTEX, FRAGMENT).unwrap();
        assert_eq!(linked, program(3));

        assert_eq!(
            host.calls(),
            vec![
                HostCall::CreateShader { stage: ShaderStage::Vertex, shader: shader(1) },
                HostCall::ShaderSource { shader: shader(1) },
                HostCall::CompileShader { shader: shader(1) },
                HostCall::ShaderParameter { shader: shader(1), pname: COMPILE_STATUS },
                HostCall::CreateShader { stage: ShaderStage::Fragment, shader: shader(2) },
                HostCall::ShaderSource { shader: shader(2) },
                HostCall::CompileShader { shader: shader(2) },
                HostCall::ShaderParameter { shader: shader(2), pname: COMPILE_STATUS },
                HostCall::CreateProgram { program: program(3) },
                HostCall::AttachShader { program: program(3), shader: shader(1) },
                HostCall::AttachShader { program: program(3), shader: shader(2) },
                HostCall::LinkProgram { program: program(3) },
                HostCall::ProgramParameter { program: program(3), pname: LINK_STATUS },
            ]
        );
    }

    #[test]
    fn test_vertex_failure_stops_before_fragment() {
        let (host, context) = host_with_context();

        let err = create_shader_program(&host, context, "not valid glsl", FRAGMENT).unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStage::Vertex));
        assert!(err.log().contains("'not' : syntax error"), "log: {}", err.log());

        assert_eq!(
            host.calls(),
            vec![
                HostCall::CreateShader { stage: ShaderStage::Vertex, shader: shader(1) },
                HostCall::ShaderSource { shader: shader(1) },
                HostCall::CompileShader { shader: shader(1) },
                HostCall::ShaderParameter { shader: shader(1), pname: COMPILE_STATUS },
                HostCall::ShaderInfoLog { shader: shader(1) },
            ]
        );
        assert_eq!(host.program_count(), 0);
    }

    #[test]
    fn test_info_log_capacity_is_forwarded() {
        let (host, context) = host_with_context();

        let err = ShaderProgramBuilder::new(&host, context)
            .info_log_capacity(8)
            .build("not valid glsl", FRAGMENT)
            .unwrap_err();
        assert_eq!(err.log(), "ERROR: ");
    }

    #[test]
    fn test_delete_on_failure_releases_compiled_vertex() {
        let (host, context) = host_with_context();

        let err = ShaderProgramBuilder::new(&host, context)
            .cleanup(CleanupPolicy::DeleteOnFailure)
            .build(VERTEX, "void main(){")
            .unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStage::Fragment));

        let calls = host.calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[
                HostCall::DeleteShader { shader: shader(2) },
                HostCall::DeleteShader { shader: shader(1) },
            ]
        );
        assert!(host.is_shader_deleted(shader(1)));
        assert!(host.is_shader_deleted(shader(2)));
    }

    #[test]
    fn test_delete_after_link_detaches_both_shaders() {
        let (host, context) = host_with_context();

        let linked = ShaderProgramBuilder::new(&host, context)
            .cleanup(CleanupPolicy::DeleteAfterLink)
            .build(VERTEX, FRAGMENT)
            .unwrap();

        let calls = host.calls();
        assert_eq!(
            &calls[calls.len() - 4..],
            &[
                HostCall::DetachShader { program: linked, shader: shader(1) },
                HostCall::DeleteShader { shader: shader(1) },
                HostCall::DetachShader { program: linked, shader: shader(2) },
                HostCall::DeleteShader { shader: shader(2) },
            ]
        );
        assert!(host.attached_shaders(linked).is_empty());
        assert!(host.is_program_linked(linked));
    }

    #[test]
    fn test_build_state_terminal() {
        assert!(BuildState::Linked.is_terminal());
        assert!(BuildState::Failed(BuildError::ProgramLink { log: String::new() }).is_terminal());
        assert!(!BuildState::Linking.is_terminal());
        assert_eq!(BuildState::compiled(ShaderStage::Fragment), BuildState::FragmentCompiled);
    }

    #[test]
    fn test_advance_walks_to_linked() {
        let mut state = BuildState::Start;
        for next in [
            BuildState::compiling(ShaderStage::Vertex),
            BuildState::compiled(ShaderStage::Vertex),
            BuildState::Linking,
            BuildState::Linked,
        ] {
            advance(&mut state, next);
        }
        assert_eq!(state, BuildState::Linked);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "build already finished")]
    fn test_advance_refuses_to_leave_terminal_state() {
        let mut state = BuildState::Failed(BuildError::ProgramLink { log: String::new() });
        advance(&mut state, BuildState::Linking);
    }

    #[test]
    fn test_cleanup_policy_flags() {
        assert!(!CleanupPolicy::Retain.deletes_on_failure());
        assert!(CleanupPolicy::DeleteOnFailure.deletes_on_failure());
        assert!(!CleanupPolicy::DeleteOnFailure.deletes_after_link());
        assert!(CleanupPolicy::DeleteAfterLink.deletes_after_link());
        assert_eq!(CleanupPolicy::from_name("delete_on_failure"), Some(CleanupPolicy::DeleteOnFailure));
        assert_eq!(CleanupPolicy::from_name(CleanupPolicy::Retain.as_str()), Some(CleanupPolicy::Retain));
        assert_eq!(CleanupPolicy::from_name("sometimes"), None);
    }
}
