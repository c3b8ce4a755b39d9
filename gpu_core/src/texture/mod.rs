/// Texture module - texture descriptors and the texture allocation collaborator

pub mod texture;
pub mod texture_manager;

pub use texture::*;
pub use texture_manager::*;
