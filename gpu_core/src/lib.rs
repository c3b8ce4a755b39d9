/*!
# GPU Core

Resource-management core of a rasterizing renderer running over a stateful,
GL-style graphics driver.

Every driver call goes through the `GraphicsDriver` trait, so the managers run
unchanged over a real backend or the recording mock used by the tests.

## Architecture

- **BufferManager**: Slot pool of typed GPU memory buffers
- **ShaderManager**: Content-addressed compiled and linked shader programs
- **TextureManager**: Named 2D texture storage
- **RenderTargetManager**: G-buffer textures and framebuffers, rebuilt on resize
- **PipelineManager**: Slot pool of packed fixed-function pipeline states
- **GpuContext**: Owns the driver and all managers, in dependency order

Contract violations (wrong ids, double creation, storage overflow) are logged
and panic; recoverable driver failures are returned as `gpu::Error`.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
mod utils;
mod config;
mod context;
pub mod driver;
pub mod event;
pub mod buffer;
pub mod shader;
pub mod texture;
pub mod target;
pub mod pipeline;

// Main gpu namespace module
pub mod gpu {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Context and its configuration
    pub use crate::config::GpuConfig;
    pub use crate::context::GpuContext;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Driver abstraction
    pub mod driver {
        pub use crate::driver::*;
    }

    // Resize events
    pub mod event {
        pub use crate::event::*;
    }

    // Memory buffers
    pub mod buffer {
        pub use crate::buffer::*;
    }

    // Shader programs
    pub mod shader {
        pub use crate::shader::*;
    }

    // Textures
    pub mod texture {
        pub use crate::texture::*;
    }

    // Render targets and framebuffers
    pub mod target {
        pub use crate::target::*;
    }

    // Pipelines
    pub mod pipeline {
        pub use crate::pipeline::*;
    }
}

// Re-export math library at crate root
pub use glam;
