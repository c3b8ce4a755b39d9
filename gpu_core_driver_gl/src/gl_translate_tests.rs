//! Unit tests for the OpenGL constant translation
//!
//! Pure mapping checks, no GL context required.

use super::*;

// ============================================================================
// BUFFER TRANSLATION TESTS
// ============================================================================

#[test]
fn test_buffer_storage_flags_map_one_to_one() {
    assert_eq!(buffer_storage_flags(BufferCreationFlags::empty()), 0);
    assert_eq!(buffer_storage_flags(BufferCreationFlags::DYNAMIC_STORAGE), gl::DYNAMIC_STORAGE_BIT);
    assert_eq!(
        buffer_storage_flags(BufferCreationFlags::READABLE | BufferCreationFlags::WRITABLE),
        gl::MAP_READ_BIT | gl::MAP_WRITE_BIT
    );
    assert_eq!(
        buffer_storage_flags(
            BufferCreationFlags::PERSISTENT | BufferCreationFlags::COHERENT | BufferCreationFlags::CLIENT_STORAGE
        ),
        gl::MAP_PERSISTENT_BIT | gl::MAP_COHERENT_BIT | gl::CLIENT_STORAGE_BIT
    );
}

#[test]
fn test_buffer_targets_and_map_access() {
    assert_eq!(buffer_target(BufferTarget::Array), gl::ARRAY_BUFFER);
    assert_eq!(buffer_target(BufferTarget::ElementArray), gl::ELEMENT_ARRAY_BUFFER);
    assert_eq!(buffer_target(BufferTarget::Uniform), gl::UNIFORM_BUFFER);
    assert_eq!(buffer_target(BufferTarget::ShaderStorage), gl::SHADER_STORAGE_BUFFER);

    assert_eq!(map_access(MapAccess::Read), gl::READ_ONLY);
    assert_eq!(map_access(MapAccess::Write), gl::WRITE_ONLY);
    assert_eq!(map_access(MapAccess::ReadWrite), gl::READ_WRITE);
}

// ============================================================================
// SHADER TRANSLATION TESTS
// ============================================================================

#[test]
fn test_shader_stages() {
    assert_eq!(shader_stage(ShaderStageType::Vertex), gl::VERTEX_SHADER);
    assert_eq!(shader_stage(ShaderStageType::Pixel), gl::FRAGMENT_SHADER);
}

#[test]
fn test_uniform_types_from_gl() {
    assert_eq!(uniform_type(gl::FLOAT_VEC4), Some(UniformType::Vec4));
    assert_eq!(uniform_type(gl::UNSIGNED_INT_VEC2), Some(UniformType::UVec2));
    assert_eq!(uniform_type(gl::FLOAT_MAT4), Some(UniformType::Mat4));
    assert_eq!(uniform_type(gl::SAMPLER_CUBE), Some(UniformType::SamplerCube));
    assert_eq!(uniform_type(gl::IMAGE_2D), Some(UniformType::Image2D));
}

#[test]
fn test_unreflected_uniform_types_are_rejected() {
    assert_eq!(uniform_type(gl::DOUBLE), None);
    assert_eq!(uniform_type(gl::BOOL_VEC3), None);
    assert_eq!(uniform_type(gl::SAMPLER_2D_SHADOW), None);
}

#[test]
fn test_uniform_base_name_strips_array_suffix() {
    assert_eq!(uniform_base_name("u_lights[0]"), "u_lights");
    assert_eq!(uniform_base_name("u_model"), "u_model");
    assert_eq!(uniform_base_name("u_bones[3]"), "u_bones[3]");
}

// ============================================================================
// TEXTURE AND FRAMEBUFFER TRANSLATION TESTS
// ============================================================================

#[test]
fn test_texture_formats() {
    assert_eq!(texture_internal_format(TextureFormat::R8G8B8A8_UNORM), gl::RGBA8);
    assert_eq!(texture_internal_format(TextureFormat::R8G8B8A8_SRGB), gl::SRGB8_ALPHA8);
    assert_eq!(texture_internal_format(TextureFormat::R16G16B16A16_SFLOAT), gl::RGBA16F);
    assert_eq!(texture_internal_format(TextureFormat::R11G11B10_UFLOAT), gl::R11F_G11F_B10F);
    assert_eq!(texture_internal_format(TextureFormat::D32_SFLOAT), gl::DEPTH_COMPONENT32F);
    assert_eq!(texture_internal_format(TextureFormat::D24_UNORM_S8_UINT), gl::DEPTH24_STENCIL8);
    assert_eq!(texture_internal_format(TextureFormat::D32_SFLOAT_S8_UINT), gl::DEPTH32F_STENCIL8);
}

#[test]
fn test_texture_targets() {
    assert_eq!(texture_target(TextureType::Tex2D), gl::TEXTURE_2D);
    assert_eq!(texture_target(TextureType::Tex2DArray), gl::TEXTURE_2D_ARRAY);
    assert_eq!(texture_target(TextureType::Cube), gl::TEXTURE_CUBE_MAP);
}

#[test]
fn test_attachment_points() {
    assert_eq!(attachment_point(AttachmentPoint::Color(0)), gl::COLOR_ATTACHMENT0);
    assert_eq!(attachment_point(AttachmentPoint::Color(2)), gl::COLOR_ATTACHMENT2);
    assert_eq!(attachment_point(AttachmentPoint::Depth), gl::DEPTH_ATTACHMENT);
    assert_eq!(attachment_point(AttachmentPoint::DepthStencil), gl::DEPTH_STENCIL_ATTACHMENT);
}

#[test]
fn test_framebuffer_status_codes() {
    assert_eq!(framebuffer_status(gl::FRAMEBUFFER_COMPLETE), FramebufferStatus::Complete);
    assert_eq!(framebuffer_status(gl::FRAMEBUFFER_UNSUPPORTED), FramebufferStatus::Unsupported);
    assert_eq!(
        framebuffer_status(gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT),
        FramebufferStatus::IncompleteMissingAttachment
    );
    assert_eq!(
        framebuffer_status(gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS),
        FramebufferStatus::IncompleteLayerTargets
    );
    assert_eq!(framebuffer_status(0x1234), FramebufferStatus::Unknown(0x1234));
}

#[test]
fn test_every_incomplete_status_has_a_reason() {
    let codes = [
        gl::FRAMEBUFFER_UNDEFINED,
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT,
        gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT,
        gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER,
        gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER,
        gl::FRAMEBUFFER_UNSUPPORTED,
        gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE,
        gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS,
    ];
    for code in codes {
        assert!(framebuffer_status(code).failure_reason().is_some(), "no reason for 0x{:X}", code);
    }
}

// ============================================================================
// FIXED-FUNCTION STATE TRANSLATION TESTS
// ============================================================================

#[test]
fn test_blend_factors() {
    assert_eq!(blend_factor(BlendFactor::Zero), gl::ZERO);
    assert_eq!(blend_factor(BlendFactor::One), gl::ONE);
    assert_eq!(blend_factor(BlendFactor::OneMinusSrcAlpha), gl::ONE_MINUS_SRC_ALPHA);
    assert_eq!(blend_factor(BlendFactor::ConstantColor), gl::CONSTANT_COLOR);
    assert_eq!(blend_factor(BlendFactor::OneMinusConstantAlpha), gl::ONE_MINUS_CONSTANT_ALPHA);
}

#[test]
fn test_blend_ops() {
    assert_eq!(blend_op(BlendOp::Add), gl::FUNC_ADD);
    assert_eq!(blend_op(BlendOp::Subtract), gl::FUNC_SUBTRACT);
    assert_eq!(blend_op(BlendOp::ReverseSubtract), gl::FUNC_REVERSE_SUBTRACT);
    assert_eq!(blend_op(BlendOp::Min), gl::MIN);
    assert_eq!(blend_op(BlendOp::Max), gl::MAX);
}

#[test]
fn test_compare_funcs() {
    assert_eq!(compare_func(CompareFunc::Never), gl::NEVER);
    assert_eq!(compare_func(CompareFunc::LessOrEqual), gl::LEQUAL);
    assert_eq!(compare_func(CompareFunc::NotEqual), gl::NOTEQUAL);
    assert_eq!(compare_func(CompareFunc::GreaterOrEqual), gl::GEQUAL);
    assert_eq!(compare_func(CompareFunc::Always), gl::ALWAYS);
}

#[test]
fn test_stencil_ops_distinguish_clamp_and_wrap() {
    assert_eq!(stencil_op(StencilOp::IncrementAndClamp), gl::INCR);
    assert_eq!(stencil_op(StencilOp::IncrementAndWrap), gl::INCR_WRAP);
    assert_eq!(stencil_op(StencilOp::DecrementAndClamp), gl::DECR);
    assert_eq!(stencil_op(StencilOp::DecrementAndWrap), gl::DECR_WRAP);
    assert_eq!(stencil_op(StencilOp::Zero), gl::ZERO);
}

#[test]
fn test_logic_ops_are_distinct() {
    let ops = [
        LogicOp::Clear, LogicOp::And, LogicOp::AndReverse, LogicOp::Copy,
        LogicOp::AndInverted, LogicOp::NoOp, LogicOp::Xor, LogicOp::Or,
        LogicOp::Nor, LogicOp::Equivalent, LogicOp::Invert, LogicOp::OrReverse,
        LogicOp::CopyInverted, LogicOp::OrInverted, LogicOp::Nand, LogicOp::Set,
    ];
    let mut native: Vec<GLenum> = ops.iter().map(|&op| logic_op(op)).collect();
    native.sort_unstable();
    native.dedup();
    assert_eq!(native.len(), ops.len());
    assert_eq!(logic_op(LogicOp::Equivalent), gl::EQUIV);
}

#[test]
fn test_capabilities() {
    assert_eq!(capability(Capability::ColorLogicOp), gl::COLOR_LOGIC_OP);
    assert_eq!(capability(Capability::PolygonOffsetFill), gl::POLYGON_OFFSET_FILL);
    assert_eq!(capability(Capability::PolygonOffsetLine), gl::POLYGON_OFFSET_LINE);
    assert_eq!(capability(Capability::PolygonOffsetPoint), gl::POLYGON_OFFSET_POINT);
}

#[test]
fn test_cull_none_disables_culling() {
    assert_eq!(cull_face(CullMode::None), None);
    assert_eq!(cull_face(CullMode::Front), Some(gl::FRONT));
    assert_eq!(cull_face(CullMode::Back), Some(gl::BACK));
    assert_eq!(cull_face(CullMode::FrontAndBack), Some(gl::FRONT_AND_BACK));
}

#[test]
fn test_raster_and_clip_state() {
    assert_eq!(front_face(FrontFace::CounterClockwise), gl::CCW);
    assert_eq!(front_face(FrontFace::Clockwise), gl::CW);
    assert_eq!(polygon_mode(PolygonMode::Line), gl::LINE);
    assert_eq!(stencil_face(StencilFace::Back), gl::BACK);
    assert_eq!(clip_origin(ClipOrigin::LowerLeft), gl::LOWER_LEFT);
    assert_eq!(clip_depth(ClipDepth::ZeroToOne), gl::ZERO_TO_ONE);
}

#[test]
fn test_object_identifiers() {
    assert_eq!(object_identifier(ObjectKind::Buffer), gl::BUFFER);
    assert_eq!(object_identifier(ObjectKind::Program), gl::PROGRAM);
    assert_eq!(object_identifier(ObjectKind::Texture), gl::TEXTURE);
    assert_eq!(object_identifier(ObjectKind::Framebuffer), gl::FRAMEBUFFER);
}
