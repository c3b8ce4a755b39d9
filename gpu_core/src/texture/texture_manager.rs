/// Texture allocation collaborator
///
/// Owns native textures, addressed by generation-checked `TextureId` keys and
/// by unique name. Render targets allocate and release their textures here.
/// Uses a SlotMap for O(1) insert/remove with stable keys.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::driver::{ObjectKind, SharedDriver};
use crate::error::{Error, Result};
use crate::texture::{Texture, Texture2DCreateInfo, TextureDesc, TextureId, TextureType};
use crate::utils::lock;
use crate::{engine_bail, engine_debug};

const SOURCE: &str = "gpu::TextureManager";

pub struct TextureManager {
    driver: SharedDriver,
    textures: SlotMap<TextureId, Texture>,
    names: FxHashMap<String, TextureId>,
}

impl TextureManager {
    pub fn new(driver: SharedDriver) -> Self {
        Self {
            driver,
            textures: SlotMap::with_key(),
            names: FxHashMap::default(),
        }
    }

    /// Allocate a 2D texture with immutable storage
    pub fn allocate_texture_2d(&mut self, name: &str, info: &Texture2DCreateInfo) -> Result<TextureId> {
        self.allocate_texture(name, &TextureDesc::from(info))
    }

    /// Allocate a texture of any type with immutable storage
    ///
    /// # Errors
    ///
    /// Fails if the name is already used or a dimension is zero.
    pub fn allocate_texture(&mut self, name: &str, desc: &TextureDesc) -> Result<TextureId> {
        if self.names.contains_key(name) {
            engine_bail!(SOURCE, "Texture '{}' already exists", name);
        }
        if desc.width == 0 || desc.height == 0 || desc.depth_or_layers == 0 || desc.mip_levels == 0 {
            return Err(Error::InvalidResource(format!(
                "Texture '{}' has a zero dimension ({}x{}x{}, {} mips)",
                name, desc.width, desc.height, desc.depth_or_layers, desc.mip_levels
            )));
        }
        if desc.texture_type == TextureType::Cube && desc.width != desc.height {
            return Err(Error::InvalidResource(format!(
                "Cube texture '{}' faces must be square ({}x{})",
                name, desc.width, desc.height
            )));
        }

        let handle = {
            let mut driver = lock(&self.driver);
            let handle = driver.create_texture(desc);
            if cfg!(debug_assertions) {
                driver.object_label(ObjectKind::Texture, handle, name);
            }
            handle
        };
        if handle == 0 {
            engine_bail!(SOURCE, "Driver failed to create texture '{}'", name);
        }

        let id = self.textures.insert(Texture {
            name: name.to_string(),
            desc: *desc,
            handle,
        });
        self.names.insert(name.to_string(), id);
        engine_debug!(SOURCE, "Allocated texture '{}' ({}x{} {:?})", name, desc.width, desc.height, desc.format);
        Ok(id)
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id)
    }

    pub fn texture_id(&self, name: &str) -> Option<TextureId> {
        self.names.get(name).copied()
    }

    pub fn texture_by_name(&self, name: &str) -> Option<&Texture> {
        self.texture_id(name).and_then(|id| self.textures.get(id))
    }

    /// Release a texture by name, `false` if no texture has that name
    pub fn deallocate_texture(&mut self, name: &str) -> bool {
        let Some(id) = self.names.remove(name) else {
            return false;
        };
        if let Some(texture) = self.textures.remove(id) {
            lock(&self.driver).delete_texture(texture.handle);
            engine_debug!(SOURCE, "Deallocated texture '{}'", name);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Drop for TextureManager {
    fn drop(&mut self) {
        let mut driver = lock(&self.driver);
        for (_, texture) in self.textures.drain() {
            driver.delete_texture(texture.handle);
        }
    }
}

#[cfg(test)]
#[path = "texture_manager_tests.rs"]
mod tests;
