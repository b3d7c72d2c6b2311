//! Error types for Shaderlink

use crate::gl::ShaderStage;
use thiserror::Error;

/// Why a `createShaderProgram` call did not produce a program.
///
/// Both kinds are terminal: the sequence stops at the first failed status
/// check and nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("program failed to link: {log}")]
    ProgramLink { log: String },
}

impl BuildError {
    /// Stage that failed to compile, `None` for link failures
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            BuildError::ShaderCompile { stage, .. } => Some(*stage),
            BuildError::ProgramLink { .. } => None,
        }
    }

    /// Diagnostic log reported by the host (may be empty)
    pub fn log(&self) -> &str {
        match self {
            BuildError::ShaderCompile { log, .. } | BuildError::ProgramLink { log } => log,
        }
    }
}

/// Main error type for Shaderlink operations
#[derive(Debug, Error)]
pub enum ShaderlinkError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl ShaderlinkError {
    /// Create a context error from a string
    pub fn context_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ContextUnavailable(msg.into())
    }

    /// Create a configuration error from a string
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an other error from a string
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}

/// Result type alias for Shaderlink operations
pub type Result<T> = std::result::Result<T, ShaderlinkError>;
