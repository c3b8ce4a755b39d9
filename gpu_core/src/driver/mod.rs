/// Graphics driver boundary
///
/// The driver is the only wire-level interface of the crate: every manager
/// operation reduces to a bounded, ordered sequence of calls on this trait.
/// The trait mirrors the object model of a stateful, handle-based graphics API
/// (direct-state-access style). Native handles are plain `u32`, 0 meaning "none".
///
/// Enumerations crossing the boundary are the engine's own types; translating
/// them to native constants is up to the driver implementation.

use std::sync::{Arc, Mutex};

use crate::buffer::BufferCreationFlags;
use crate::pipeline::{
    BlendFactor, BlendOp, ColorComponentFlags, CompareFunc, CullMode, FrontFace, LogicOp,
    PolygonMode, StencilOp,
};
use crate::shader::{ShaderStageType, UniformType, UniformValue};
use crate::texture::TextureDesc;

// Mock driver for tests (no GPU required)
#[cfg(test)]
pub mod mock_driver;

/// Shared, lockable driver handle held by every manager and resource object
pub type SharedDriver = Arc<Mutex<dyn GraphicsDriver>>;

// ============================================================================
// Boundary types
// ============================================================================

/// Buffer binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data
    Array,
    /// Vertex indices
    ElementArray,
    /// Uniform (constant) block storage, indexable
    Uniform,
    /// Shader storage (unordered access), indexable
    ShaderStorage,
}

impl BufferTarget {
    /// Whether the target has indexed binding points
    pub fn is_indexed(self) -> bool {
        matches!(self, BufferTarget::Uniform | BufferTarget::ShaderStorage)
    }
}

/// Buffer mapping access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapAccess {
    Read,
    Write,
    ReadWrite,
}

/// Server-side capability toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Blend,
    ColorLogicOp,
    DepthTest,
    StencilTest,
    CullFace,
    PolygonOffsetFill,
    PolygonOffsetLine,
    PolygonOffsetPoint,
}

/// Polygon face selector for per-face stencil state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilFace {
    Front,
    Back,
}

/// Framebuffer attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    /// Color attachment at the given index
    Color(u32),
    Depth,
    Stencil,
    DepthStencil,
}

/// Result of the driver framebuffer completeness check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    Complete,
    Undefined,
    IncompleteAttachment,
    IncompleteMissingAttachment,
    IncompleteDrawBuffer,
    IncompleteReadBuffer,
    Unsupported,
    IncompleteMultisample,
    IncompleteLayerTargets,
    /// A status code the engine does not know about
    Unknown(u32),
}

impl FramebufferStatus {
    /// Human-readable reason for an incomplete status
    ///
    /// Returns `None` for `Complete` and for unknown codes.
    pub fn failure_reason(self) -> Option<&'static str> {
        match self {
            FramebufferStatus::Complete | FramebufferStatus::Unknown(_) => None,
            FramebufferStatus::Undefined =>
                Some("the default framebuffer is bound but does not exist"),
            FramebufferStatus::IncompleteAttachment =>
                Some("one of the attachment points is framebuffer incomplete"),
            FramebufferStatus::IncompleteMissingAttachment =>
                Some("the framebuffer has no image attached"),
            FramebufferStatus::IncompleteDrawBuffer =>
                Some("a draw buffer references an attachment point with no image"),
            FramebufferStatus::IncompleteReadBuffer =>
                Some("the read buffer references an attachment point with no image"),
            FramebufferStatus::Unsupported =>
                Some("the combination of attached image formats is not supported"),
            FramebufferStatus::IncompleteMultisample =>
                Some("attached images do not share the same sample count or fixed sample locations"),
            FramebufferStatus::IncompleteLayerTargets =>
                Some("attachments are not all layered, or layered attachments target different texture types"),
        }
    }
}

/// Clip-space origin for clip control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipOrigin {
    LowerLeft,
    UpperLeft,
}

/// Clip-space depth range for clip control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipDepth {
    NegativeOneToOne,
    ZeroToOne,
}

/// Kind of native object a debug label is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Buffer,
    Program,
    Texture,
    Framebuffer,
}

/// Active uniform reported by program introspection
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveUniform {
    /// Uniform name as declared in the shader (arrays without the `[0]` suffix)
    pub name: String,
    /// Location, -1 for uniforms inside blocks
    pub location: i32,
    /// Declared type
    pub uniform_type: UniformType,
    /// Array element count (1 for non-arrays)
    pub count: u32,
}

// ============================================================================
// GraphicsDriver trait
// ============================================================================

/// Native graphics driver
///
/// Implemented by the backend binding (and by the mock driver in tests).
/// Calls execute immediately on the calling thread against one context.
pub trait GraphicsDriver: Send {
    // ----- Limits and debugging -----

    /// Maximum number of color attachments per framebuffer
    fn max_color_attachments(&self) -> u32;

    /// Attach a debug label to a native object
    fn object_label(&mut self, kind: ObjectKind, handle: u32, label: &str);

    // ----- Buffers -----

    fn create_buffer(&mut self) -> u32;

    /// Allocate immutable storage, optionally initialised from `data`
    fn buffer_storage(&mut self, buffer: u32, size: u64, data: Option<&[u8]>, flags: BufferCreationFlags);

    fn delete_buffer(&mut self, buffer: u32);

    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32);

    fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, buffer: u32);

    fn buffer_sub_data(&mut self, buffer: u32, offset: u64, data: &[u8]);

    /// Fill `size` bytes starting at `offset` with `value`
    fn clear_buffer_sub_data(&mut self, buffer: u32, offset: u64, size: u64, value: u8);

    /// Map the whole buffer, null on failure
    fn map_buffer(&mut self, buffer: u32, access: MapAccess) -> *mut u8;

    /// Unmap, `false` if the contents became corrupt while mapped
    fn unmap_buffer(&mut self, buffer: u32) -> bool;

    // ----- Shaders and programs -----

    fn create_shader(&mut self, stage: ShaderStageType) -> u32;

    fn shader_source(&mut self, shader: u32, source: &str);

    fn compile_shader(&mut self, shader: u32);

    fn shader_compile_status(&self, shader: u32) -> bool;

    fn shader_info_log(&self, shader: u32) -> String;

    fn delete_shader(&mut self, shader: u32);

    fn create_program(&mut self) -> u32;

    fn attach_shader(&mut self, program: u32, shader: u32);

    fn detach_shader(&mut self, program: u32, shader: u32);

    fn link_program(&mut self, program: u32);

    fn program_link_status(&self, program: u32) -> bool;

    fn program_info_log(&self, program: u32) -> String;

    fn delete_program(&mut self, program: u32);

    fn use_program(&mut self, program: u32);

    fn active_uniforms(&self, program: u32) -> Vec<ActiveUniform>;

    /// Write a uniform of `program` without binding it
    fn program_uniform(&mut self, program: u32, location: i32, value: &UniformValue);

    // ----- Textures -----

    /// Create a texture with immutable storage
    fn create_texture(&mut self, desc: &TextureDesc) -> u32;

    fn delete_texture(&mut self, texture: u32);

    // ----- Framebuffers -----

    fn create_framebuffer(&mut self) -> u32;

    fn framebuffer_texture(&mut self, framebuffer: u32, attachment: AttachmentPoint, texture: u32, level: u32);

    fn check_framebuffer_status(&self, framebuffer: u32) -> FramebufferStatus;

    fn delete_framebuffer(&mut self, framebuffer: u32);

    /// Bind for drawing, 0 binds the default framebuffer
    fn bind_framebuffer(&mut self, framebuffer: u32);

    fn clear_framebuffer_color(&mut self, framebuffer: u32, draw_buffer: u32, color: [f32; 4]);

    fn clear_framebuffer_depth(&mut self, framebuffer: u32, depth: f32);

    fn clear_framebuffer_stencil(&mut self, framebuffer: u32, stencil: i32);

    fn clear_framebuffer_depth_stencil(&mut self, framebuffer: u32, depth: f32, stencil: i32);

    /// Route fragment outputs 0..count to color attachments 0..count of the bound framebuffer
    fn draw_buffers(&mut self, count: u32);

    // ----- Fixed-function state -----

    fn enable(&mut self, cap: Capability);

    fn disable(&mut self, cap: Capability);

    fn enable_indexed(&mut self, cap: Capability, index: u32);

    fn disable_indexed(&mut self, cap: Capability, index: u32);

    fn color_mask_indexed(&mut self, index: u32, mask: ColorComponentFlags);

    fn blend_equation_separate_indexed(&mut self, index: u32, color_op: BlendOp, alpha_op: BlendOp);

    fn blend_func_separate_indexed(
        &mut self,
        index: u32,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    );

    fn blend_color(&mut self, color: [f32; 4]);

    fn logic_op(&mut self, op: LogicOp);

    fn depth_mask(&mut self, write: bool);

    fn depth_func(&mut self, func: CompareFunc);

    fn polygon_offset_clamp(&mut self, slope_factor: f32, constant_factor: f32, clamp: f32);

    fn polygon_mode(&mut self, mode: PolygonMode);

    fn stencil_func_separate(&mut self, face: StencilFace, func: CompareFunc, reference: u8, mask: u8);

    fn stencil_mask_separate(&mut self, face: StencilFace, mask: u8);

    fn stencil_op_separate(&mut self, face: StencilFace, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp);

    fn front_face(&mut self, face: FrontFace);

    /// Select culled faces; only called with culling enabled
    fn cull_face(&mut self, mode: CullMode);

    fn line_width(&mut self, width: f32);

    fn clip_control(&mut self, origin: ClipOrigin, depth: ClipDepth);
}
