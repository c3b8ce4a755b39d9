//! Error types for the GPU core
//!
//! Recoverable failures reported by the graphics driver (shader compilation,
//! program linking, framebuffer completeness) and by resource bookkeeping.
//! Contract violations are not represented here: they go through
//! `engine_assert!` and abort the caller.

use std::fmt;

/// Result type for GPU core operations
pub type Result<T> = std::result::Result<T, Error>;

/// GPU core errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error reported by the driver
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, attachment, etc.)
    InvalidResource(String),

    /// Initialization failed (context, managers)
    InitializationFailed(String),

    /// A shader stage failed to compile (carries the compiler log)
    ShaderCompilationFailed(String),

    /// A shader program failed to link (carries the linker log)
    ShaderLinkFailed(String),

    /// A framebuffer failed the driver completeness check
    FramebufferIncomplete(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ShaderCompilationFailed(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::ShaderLinkFailed(msg) => write!(f, "Shader link failed: {}", msg),
            Error::FramebufferIncomplete(msg) => write!(f, "Framebuffer incomplete: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
