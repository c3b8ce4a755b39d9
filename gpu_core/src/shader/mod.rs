/// Shader module - stage preprocessing, program compilation/linking,
/// uniform reflection and the content-addressed program cache

pub mod preprocess;
pub mod uniform;
pub mod shader_program;
pub mod shader_manager;

pub use preprocess::*;
pub use uniform::*;
pub use shader_program::*;
pub use shader_manager::*;
