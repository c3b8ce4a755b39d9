/// Render targets: role-named framebuffers and their textures

pub mod frame_buffer;
pub mod render_target_manager;

pub use frame_buffer::*;
pub use render_target_manager::*;
