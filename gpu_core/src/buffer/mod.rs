/// Buffer module - linear GPU memory buffers and their slot pool

pub mod memory_buffer;
pub mod buffer_manager;

pub use memory_buffer::*;
pub use buffer_manager::*;
