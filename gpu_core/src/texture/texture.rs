/// Texture descriptors and the engine-side texture record

use slotmap::new_key_type;

new_key_type! {
    /// Stable key for a texture owned by the TextureManager.
    ///
    /// Keys carry a generation: a key to a deallocated texture never
    /// resolves to a texture allocated later in the same slot.
    pub struct TextureId;
}

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Tex1D,
    Tex2D,
    Tex2DArray,
    Tex3D,
    Cube,
}

/// Texture storage format
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    // Color formats
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    R16G16B16A16_SFLOAT,
    R32G32B32A32_SFLOAT,
    R11G11B10_UFLOAT,

    // Depth/stencil formats
    D16_UNORM,
    D32_SFLOAT,
    D24_UNORM_S8_UINT,
    D32_SFLOAT_S8_UINT,
}

impl TextureFormat {
    /// Whether the format has a depth component
    pub fn has_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM
                | TextureFormat::D32_SFLOAT
                | TextureFormat::D24_UNORM_S8_UINT
                | TextureFormat::D32_SFLOAT_S8_UINT
        )
    }

    /// Whether the format has a stencil component
    pub fn has_stencil(self) -> bool {
        matches!(self, TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_SFLOAT_S8_UINT)
    }
}

/// Full texture descriptor passed to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub texture_type: TextureType,
    pub width: u32,
    pub height: u32,
    /// Depth for 3D textures, layer count for arrays, 1 otherwise
    pub depth_or_layers: u32,
    pub mip_levels: u32,
    pub format: TextureFormat,
}

/// Descriptor for a 2D texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture2DCreateInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub mip_levels: u32,
}

impl Texture2DCreateInfo {
    /// Single-mip 2D texture, the shape of every render target
    pub fn render_target(width: u32, height: u32, format: TextureFormat) -> Self {
        Self { width, height, format, mip_levels: 1 }
    }
}

impl From<&Texture2DCreateInfo> for TextureDesc {
    fn from(info: &Texture2DCreateInfo) -> Self {
        Self {
            texture_type: TextureType::Tex2D,
            width: info.width,
            height: info.height,
            depth_or_layers: 1,
            mip_levels: info.mip_levels,
            format: info.format,
        }
    }
}

/// Texture owned by the TextureManager
#[derive(Debug, Clone)]
pub struct Texture {
    pub(crate) name: String,
    pub(crate) desc: TextureDesc,
    pub(crate) handle: u32,
}

impl Texture {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture_type(&self) -> TextureType {
        self.desc.texture_type
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn format(&self) -> TextureFormat {
        self.desc.format
    }

    pub fn mip_levels(&self) -> u32 {
        self.desc.mip_levels
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn native_handle(&self) -> u32 {
        self.handle
    }

    pub fn is_valid(&self) -> bool {
        self.handle != 0
    }

    pub fn is_2d(&self) -> bool {
        self.desc.texture_type == TextureType::Tex2D
    }
}
