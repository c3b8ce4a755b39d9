/// Pipelines: packed fixed-function state bound atomically with a framebuffer and program

pub mod state;
pub mod packed;
pub mod pipeline;
pub mod pipeline_manager;

pub use state::*;
pub use packed::{dequantize_color, quantize_color, PackedBlendState, PackedGlobalState, PackedStencilFace};
pub use pipeline::{Pipeline, PipelineId, MAX_PIPELINE_COUNT};
pub(crate) use pipeline::PipelineContext;
pub use pipeline_manager::PipelineManager;
