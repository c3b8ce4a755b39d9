/// Engine enum to OpenGL constant translation
///
/// Pure functions, no GL context needed. Every engine enumeration that crosses
/// the driver boundary has exactly one native counterpart here.

use gl::types::{GLbitfield, GLenum};
use gpu_core::gpu::buffer::BufferCreationFlags;
use gpu_core::gpu::driver::{
    AttachmentPoint, BufferTarget, Capability, ClipDepth, ClipOrigin, FramebufferStatus,
    MapAccess, ObjectKind, StencilFace,
};
use gpu_core::gpu::pipeline::{
    BlendFactor, BlendOp, CompareFunc, CullMode, FrontFace, LogicOp, PolygonMode, StencilOp,
};
use gpu_core::gpu::shader::{ShaderStageType, UniformType};
use gpu_core::gpu::texture::{TextureFormat, TextureType};

// ===== Buffers =====

pub(crate) fn buffer_storage_flags(flags: BufferCreationFlags) -> GLbitfield {
    let mut bits = 0;
    if flags.contains(BufferCreationFlags::DYNAMIC_STORAGE) {
        bits |= gl::DYNAMIC_STORAGE_BIT;
    }
    if flags.contains(BufferCreationFlags::READABLE) {
        bits |= gl::MAP_READ_BIT;
    }
    if flags.contains(BufferCreationFlags::WRITABLE) {
        bits |= gl::MAP_WRITE_BIT;
    }
    if flags.contains(BufferCreationFlags::PERSISTENT) {
        bits |= gl::MAP_PERSISTENT_BIT;
    }
    if flags.contains(BufferCreationFlags::COHERENT) {
        bits |= gl::MAP_COHERENT_BIT;
    }
    if flags.contains(BufferCreationFlags::CLIENT_STORAGE) {
        bits |= gl::CLIENT_STORAGE_BIT;
    }
    bits
}

pub(crate) fn buffer_target(target: BufferTarget) -> GLenum {
    match target {
        BufferTarget::Array => gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
        BufferTarget::Uniform => gl::UNIFORM_BUFFER,
        BufferTarget::ShaderStorage => gl::SHADER_STORAGE_BUFFER,
    }
}

pub(crate) fn map_access(access: MapAccess) -> GLenum {
    match access {
        MapAccess::Read => gl::READ_ONLY,
        MapAccess::Write => gl::WRITE_ONLY,
        MapAccess::ReadWrite => gl::READ_WRITE,
    }
}

// ===== Shaders =====

pub(crate) fn shader_stage(stage: ShaderStageType) -> GLenum {
    match stage {
        ShaderStageType::Vertex => gl::VERTEX_SHADER,
        ShaderStageType::Pixel => gl::FRAGMENT_SHADER,
    }
}

/// Engine type of an active uniform, `None` for types the engine does not reflect
pub(crate) fn uniform_type(gl_type: GLenum) -> Option<UniformType> {
    let uniform_type = match gl_type {
        gl::BOOL => UniformType::Bool,
        gl::INT => UniformType::Int,
        gl::UNSIGNED_INT => UniformType::UInt,
        gl::FLOAT => UniformType::Float,
        gl::FLOAT_VEC2 => UniformType::Vec2,
        gl::FLOAT_VEC3 => UniformType::Vec3,
        gl::FLOAT_VEC4 => UniformType::Vec4,
        gl::INT_VEC2 => UniformType::IVec2,
        gl::INT_VEC3 => UniformType::IVec3,
        gl::INT_VEC4 => UniformType::IVec4,
        gl::UNSIGNED_INT_VEC2 => UniformType::UVec2,
        gl::UNSIGNED_INT_VEC3 => UniformType::UVec3,
        gl::UNSIGNED_INT_VEC4 => UniformType::UVec4,
        gl::FLOAT_MAT2 => UniformType::Mat2,
        gl::FLOAT_MAT3 => UniformType::Mat3,
        gl::FLOAT_MAT4 => UniformType::Mat4,
        gl::SAMPLER_2D => UniformType::Sampler2D,
        gl::SAMPLER_2D_ARRAY => UniformType::Sampler2DArray,
        gl::SAMPLER_3D => UniformType::Sampler3D,
        gl::SAMPLER_CUBE => UniformType::SamplerCube,
        gl::IMAGE_2D => UniformType::Image2D,
        _ => return None,
    };
    Some(uniform_type)
}

/// Uniform name without the `[0]` suffix GL reports for arrays
pub(crate) fn uniform_base_name(name: &str) -> &str {
    name.strip_suffix("[0]").unwrap_or(name)
}

// ===== Textures and framebuffers =====

pub(crate) fn texture_target(texture_type: TextureType) -> GLenum {
    match texture_type {
        TextureType::Tex1D => gl::TEXTURE_1D,
        TextureType::Tex2D => gl::TEXTURE_2D,
        TextureType::Tex2DArray => gl::TEXTURE_2D_ARRAY,
        TextureType::Tex3D => gl::TEXTURE_3D,
        TextureType::Cube => gl::TEXTURE_CUBE_MAP,
    }
}

pub(crate) fn texture_internal_format(format: TextureFormat) -> GLenum {
    match format {
        TextureFormat::R8G8B8A8_UNORM => gl::RGBA8,
        TextureFormat::R8G8B8A8_SRGB => gl::SRGB8_ALPHA8,
        TextureFormat::R16G16B16A16_SFLOAT => gl::RGBA16F,
        TextureFormat::R32G32B32A32_SFLOAT => gl::RGBA32F,
        TextureFormat::R11G11B10_UFLOAT => gl::R11F_G11F_B10F,
        TextureFormat::D16_UNORM => gl::DEPTH_COMPONENT16,
        TextureFormat::D32_SFLOAT => gl::DEPTH_COMPONENT32F,
        TextureFormat::D24_UNORM_S8_UINT => gl::DEPTH24_STENCIL8,
        TextureFormat::D32_SFLOAT_S8_UINT => gl::DEPTH32F_STENCIL8,
    }
}

pub(crate) fn attachment_point(attachment: AttachmentPoint) -> GLenum {
    match attachment {
        AttachmentPoint::Color(index) => gl::COLOR_ATTACHMENT0 + index,
        AttachmentPoint::Depth => gl::DEPTH_ATTACHMENT,
        AttachmentPoint::Stencil => gl::STENCIL_ATTACHMENT,
        AttachmentPoint::DepthStencil => gl::DEPTH_STENCIL_ATTACHMENT,
    }
}

pub(crate) fn framebuffer_status(status: GLenum) -> FramebufferStatus {
    match status {
        gl::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
        gl::FRAMEBUFFER_UNDEFINED => FramebufferStatus::Undefined,
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
        gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => FramebufferStatus::IncompleteMissingAttachment,
        gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferStatus::IncompleteDrawBuffer,
        gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => FramebufferStatus::IncompleteReadBuffer,
        gl::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
        gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferStatus::IncompleteMultisample,
        gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => FramebufferStatus::IncompleteLayerTargets,
        other => FramebufferStatus::Unknown(other),
    }
}

pub(crate) fn object_identifier(kind: ObjectKind) -> GLenum {
    match kind {
        ObjectKind::Buffer => gl::BUFFER,
        ObjectKind::Program => gl::PROGRAM,
        ObjectKind::Texture => gl::TEXTURE,
        ObjectKind::Framebuffer => gl::FRAMEBUFFER,
    }
}

// ===== Fixed-function state =====

pub(crate) fn capability(cap: Capability) -> GLenum {
    match cap {
        Capability::Blend => gl::BLEND,
        Capability::ColorLogicOp => gl::COLOR_LOGIC_OP,
        Capability::DepthTest => gl::DEPTH_TEST,
        Capability::StencilTest => gl::STENCIL_TEST,
        Capability::CullFace => gl::CULL_FACE,
        Capability::PolygonOffsetFill => gl::POLYGON_OFFSET_FILL,
        Capability::PolygonOffsetLine => gl::POLYGON_OFFSET_LINE,
        Capability::PolygonOffsetPoint => gl::POLYGON_OFFSET_POINT,
    }
}

pub(crate) fn blend_factor(factor: BlendFactor) -> GLenum {
    match factor {
        BlendFactor::Zero => gl::ZERO,
        BlendFactor::One => gl::ONE,
        BlendFactor::SrcColor => gl::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => gl::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => gl::DST_COLOR,
        BlendFactor::OneMinusDstColor => gl::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => gl::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => gl::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => gl::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColor => gl::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => gl::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => gl::CONSTANT_ALPHA,
        BlendFactor::OneMinusConstantAlpha => gl::ONE_MINUS_CONSTANT_ALPHA,
    }
}

pub(crate) fn blend_op(op: BlendOp) -> GLenum {
    match op {
        BlendOp::Add => gl::FUNC_ADD,
        BlendOp::Subtract => gl::FUNC_SUBTRACT,
        BlendOp::ReverseSubtract => gl::FUNC_REVERSE_SUBTRACT,
        BlendOp::Min => gl::MIN,
        BlendOp::Max => gl::MAX,
    }
}

pub(crate) fn compare_func(func: CompareFunc) -> GLenum {
    match func {
        CompareFunc::Never => gl::NEVER,
        CompareFunc::Less => gl::LESS,
        CompareFunc::Equal => gl::EQUAL,
        CompareFunc::LessOrEqual => gl::LEQUAL,
        CompareFunc::Greater => gl::GREATER,
        CompareFunc::NotEqual => gl::NOTEQUAL,
        CompareFunc::GreaterOrEqual => gl::GEQUAL,
        CompareFunc::Always => gl::ALWAYS,
    }
}

pub(crate) fn stencil_op(op: StencilOp) -> GLenum {
    match op {
        StencilOp::Keep => gl::KEEP,
        StencilOp::Zero => gl::ZERO,
        StencilOp::Replace => gl::REPLACE,
        StencilOp::IncrementAndClamp => gl::INCR,
        StencilOp::DecrementAndClamp => gl::DECR,
        StencilOp::Invert => gl::INVERT,
        StencilOp::IncrementAndWrap => gl::INCR_WRAP,
        StencilOp::DecrementAndWrap => gl::DECR_WRAP,
    }
}

pub(crate) fn logic_op(op: LogicOp) -> GLenum {
    match op {
        LogicOp::Clear => gl::CLEAR,
        LogicOp::And => gl::AND,
        LogicOp::AndReverse => gl::AND_REVERSE,
        LogicOp::Copy => gl::COPY,
        LogicOp::AndInverted => gl::AND_INVERTED,
        LogicOp::NoOp => gl::NOOP,
        LogicOp::Xor => gl::XOR,
        LogicOp::Or => gl::OR,
        LogicOp::Nor => gl::NOR,
        LogicOp::Equivalent => gl::EQUIV,
        LogicOp::Invert => gl::INVERT,
        LogicOp::OrReverse => gl::OR_REVERSE,
        LogicOp::CopyInverted => gl::COPY_INVERTED,
        LogicOp::OrInverted => gl::OR_INVERTED,
        LogicOp::Nand => gl::NAND,
        LogicOp::Set => gl::SET,
    }
}

pub(crate) fn stencil_face(face: StencilFace) -> GLenum {
    match face {
        StencilFace::Front => gl::FRONT,
        StencilFace::Back => gl::BACK,
    }
}

pub(crate) fn polygon_mode(mode: PolygonMode) -> GLenum {
    match mode {
        PolygonMode::Fill => gl::FILL,
        PolygonMode::Line => gl::LINE,
        PolygonMode::Point => gl::POINT,
    }
}

/// Culled faces, `None` when culling must be disabled
pub(crate) fn cull_face(mode: CullMode) -> Option<GLenum> {
    match mode {
        CullMode::None => None,
        CullMode::Front => Some(gl::FRONT),
        CullMode::Back => Some(gl::BACK),
        CullMode::FrontAndBack => Some(gl::FRONT_AND_BACK),
    }
}

pub(crate) fn front_face(face: FrontFace) -> GLenum {
    match face {
        FrontFace::CounterClockwise => gl::CCW,
        FrontFace::Clockwise => gl::CW,
    }
}

pub(crate) fn clip_origin(origin: ClipOrigin) -> GLenum {
    match origin {
        ClipOrigin::LowerLeft => gl::LOWER_LEFT,
        ClipOrigin::UpperLeft => gl::UPPER_LEFT,
    }
}

pub(crate) fn clip_depth(depth: ClipDepth) -> GLenum {
    match depth {
        ClipDepth::NegativeOneToOne => gl::NEGATIVE_ONE_TO_ONE,
        ClipDepth::ZeroToOne => gl::ZERO_TO_ONE,
    }
}

#[cfg(test)]
#[path = "gl_translate_tests.rs"]
mod tests;
