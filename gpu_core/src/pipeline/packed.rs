/// Packed pipeline state
///
/// Every enumerated or boolean toggle of a pipeline is narrowed into a fixed
/// bit range of one integer. The packed words are plain values: two pipelines
/// with the same state have equal words, and hashing a word covers every
/// field it holds.

use crate::driver::StencilFace;
use crate::pipeline::{
    BlendFactor, BlendOp, ColorComponentFlags, CompareFunc, CullMode, FrontFace, LogicOp,
    PolygonMode, PrimitiveTopology, StencilOp,
};

/// Accessor pair for an enumeration stored at `$offset`
macro_rules! enum_field {
    ($get:ident, $set:ident, $ty:ident, $offset:expr) => {
        pub fn $get(&self) -> $ty {
            $ty::from_bits(self.field($offset, $ty::BIT_WIDTH))
        }

        pub fn $set(&mut self, value: $ty) {
            self.set_field($offset, $ty::BIT_WIDTH, value.bits());
        }
    };
}

/// Accessor pair for a one-bit flag stored at `$offset`
macro_rules! flag_field {
    ($get:ident, $set:ident, $offset:expr) => {
        pub fn $get(&self) -> bool {
            self.field($offset, 1) != 0
        }

        pub fn $set(&mut self, value: bool) {
            self.set_field($offset, 1, value as u32);
        }
    };
}

// ============================================================================
// Global state
// ============================================================================

mod global {
    use super::*;

    pub const TOPOLOGY: u32 = 0;
    pub const FRONT_FACE: u32 = TOPOLOGY + PrimitiveTopology::BIT_WIDTH;
    pub const POLYGON_MODE: u32 = FRONT_FACE + FrontFace::BIT_WIDTH;
    pub const CULL_MODE: u32 = POLYGON_MODE + PolygonMode::BIT_WIDTH;
    pub const DEPTH_BIAS_ENABLE: u32 = CULL_MODE + CullMode::BIT_WIDTH;
    pub const DEPTH_TEST_ENABLE: u32 = DEPTH_BIAS_ENABLE + 1;
    pub const DEPTH_WRITE_ENABLE: u32 = DEPTH_TEST_ENABLE + 1;
    pub const DEPTH_COMPARE: u32 = DEPTH_WRITE_ENABLE + 1;
    pub const STENCIL_TEST_ENABLE: u32 = DEPTH_COMPARE + CompareFunc::BIT_WIDTH;
    pub const FRONT_STENCIL: u32 = STENCIL_TEST_ENABLE + 1;
    pub const BACK_STENCIL: u32 = FRONT_STENCIL + STENCIL_FACE_BITS;
    pub const LOGIC_OP_ENABLE: u32 = BACK_STENCIL + STENCIL_FACE_BITS;
    pub const LOGIC_OP: u32 = LOGIC_OP_ENABLE + 1;
    pub const END: u32 = LOGIC_OP + LogicOp::BIT_WIDTH;

    // Per-face stencil layout, relative to the face offset
    pub const STENCIL_FAIL: u32 = 0;
    pub const STENCIL_DEPTH_FAIL: u32 = STENCIL_FAIL + StencilOp::BIT_WIDTH;
    pub const STENCIL_PASS: u32 = STENCIL_DEPTH_FAIL + StencilOp::BIT_WIDTH;
    pub const STENCIL_COMPARE: u32 = STENCIL_PASS + StencilOp::BIT_WIDTH;
    pub const STENCIL_WRITE_ENABLE: u32 = STENCIL_COMPARE + CompareFunc::BIT_WIDTH;
    pub const STENCIL_FACE_BITS: u32 = STENCIL_WRITE_ENABLE + 1;
}

const _: () = assert!(global::END <= u64::BITS);

/// Fixed-function toggles of a pipeline, packed into one 64-bit word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedGlobalState(u64);

impl PackedGlobalState {
    pub fn raw(self) -> u64 {
        self.0
    }

    fn field(&self, offset: u32, width: u32) -> u32 {
        ((self.0 >> offset) & ((1u64 << width) - 1)) as u32
    }

    fn set_field(&mut self, offset: u32, width: u32, value: u32) {
        let mask = ((1u64 << width) - 1) << offset;
        self.0 = (self.0 & !mask) | ((u64::from(value) << offset) & mask);
    }

    enum_field!(primitive_topology, set_primitive_topology, PrimitiveTopology, global::TOPOLOGY);
    enum_field!(front_face, set_front_face, FrontFace, global::FRONT_FACE);
    enum_field!(polygon_mode, set_polygon_mode, PolygonMode, global::POLYGON_MODE);
    enum_field!(cull_mode, set_cull_mode, CullMode, global::CULL_MODE);
    flag_field!(depth_bias_enable, set_depth_bias_enable, global::DEPTH_BIAS_ENABLE);
    flag_field!(depth_test_enable, set_depth_test_enable, global::DEPTH_TEST_ENABLE);
    flag_field!(depth_write_enable, set_depth_write_enable, global::DEPTH_WRITE_ENABLE);
    enum_field!(depth_compare_func, set_depth_compare_func, CompareFunc, global::DEPTH_COMPARE);
    flag_field!(stencil_test_enable, set_stencil_test_enable, global::STENCIL_TEST_ENABLE);
    flag_field!(logic_op_enable, set_logic_op_enable, global::LOGIC_OP_ENABLE);
    enum_field!(logic_op, set_logic_op, LogicOp, global::LOGIC_OP);

    pub fn stencil_face(&self, face: StencilFace) -> PackedStencilFace {
        let offset = stencil_offset(face);
        PackedStencilFace {
            fail_op: StencilOp::from_bits(self.field(offset + global::STENCIL_FAIL, StencilOp::BIT_WIDTH)),
            depth_fail_op: StencilOp::from_bits(self.field(offset + global::STENCIL_DEPTH_FAIL, StencilOp::BIT_WIDTH)),
            pass_op: StencilOp::from_bits(self.field(offset + global::STENCIL_PASS, StencilOp::BIT_WIDTH)),
            compare_func: CompareFunc::from_bits(self.field(offset + global::STENCIL_COMPARE, CompareFunc::BIT_WIDTH)),
            write_enable: self.field(offset + global::STENCIL_WRITE_ENABLE, 1) != 0,
        }
    }

    pub fn set_stencil_face(&mut self, face: StencilFace, state: PackedStencilFace) {
        let offset = stencil_offset(face);
        self.set_field(offset + global::STENCIL_FAIL, StencilOp::BIT_WIDTH, state.fail_op.bits());
        self.set_field(offset + global::STENCIL_DEPTH_FAIL, StencilOp::BIT_WIDTH, state.depth_fail_op.bits());
        self.set_field(offset + global::STENCIL_PASS, StencilOp::BIT_WIDTH, state.pass_op.bits());
        self.set_field(offset + global::STENCIL_COMPARE, CompareFunc::BIT_WIDTH, state.compare_func.bits());
        self.set_field(offset + global::STENCIL_WRITE_ENABLE, 1, state.write_enable as u32);
    }
}

fn stencil_offset(face: StencilFace) -> u32 {
    match face {
        StencilFace::Front => global::FRONT_STENCIL,
        StencilFace::Back => global::BACK_STENCIL,
    }
}

/// Enumerated stencil state of one face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedStencilFace {
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub compare_func: CompareFunc,
    pub write_enable: bool,
}

// ============================================================================
// Blend state
// ============================================================================

mod blend {
    use super::*;

    pub const WRITE_MASK: u32 = 0;
    pub const WRITE_MASK_BITS: u32 = 4;
    pub const SRC_COLOR: u32 = WRITE_MASK + WRITE_MASK_BITS;
    pub const DST_COLOR: u32 = SRC_COLOR + BlendFactor::BIT_WIDTH;
    pub const COLOR_OP: u32 = DST_COLOR + BlendFactor::BIT_WIDTH;
    pub const SRC_ALPHA: u32 = COLOR_OP + BlendOp::BIT_WIDTH;
    pub const DST_ALPHA: u32 = SRC_ALPHA + BlendFactor::BIT_WIDTH;
    pub const ALPHA_OP: u32 = DST_ALPHA + BlendFactor::BIT_WIDTH;
    pub const ENABLE: u32 = ALPHA_OP + BlendOp::BIT_WIDTH;
    pub const END: u32 = ENABLE + 1;
}

const _: () = assert!(blend::END <= u32::BITS);

/// Blend state of one color attachment, packed into one 32-bit word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedBlendState(u32);

impl PackedBlendState {
    pub fn raw(self) -> u32 {
        self.0
    }

    fn field(&self, offset: u32, width: u32) -> u32 {
        (self.0 >> offset) & ((1u32 << width) - 1)
    }

    fn set_field(&mut self, offset: u32, width: u32, value: u32) {
        let mask = ((1u32 << width) - 1) << offset;
        self.0 = (self.0 & !mask) | ((value << offset) & mask);
    }

    pub fn color_write_mask(&self) -> ColorComponentFlags {
        ColorComponentFlags::from_bits_truncate(self.field(blend::WRITE_MASK, blend::WRITE_MASK_BITS))
    }

    pub fn set_color_write_mask(&mut self, mask: ColorComponentFlags) {
        self.set_field(blend::WRITE_MASK, blend::WRITE_MASK_BITS, mask.bits());
    }

    enum_field!(src_color_factor, set_src_color_factor, BlendFactor, blend::SRC_COLOR);
    enum_field!(dst_color_factor, set_dst_color_factor, BlendFactor, blend::DST_COLOR);
    enum_field!(color_blend_op, set_color_blend_op, BlendOp, blend::COLOR_OP);
    enum_field!(src_alpha_factor, set_src_alpha_factor, BlendFactor, blend::SRC_ALPHA);
    enum_field!(dst_alpha_factor, set_dst_alpha_factor, BlendFactor, blend::DST_ALPHA);
    enum_field!(alpha_blend_op, set_alpha_blend_op, BlendOp, blend::ALPHA_OP);
    flag_field!(blend_enable, set_blend_enable, blend::ENABLE);

    /// Whether any of the four factors reads the blend-constant register
    pub fn uses_constant_factor(&self) -> bool {
        [
            self.src_color_factor(),
            self.dst_color_factor(),
            self.src_alpha_factor(),
            self.dst_alpha_factor(),
        ]
        .iter()
        .any(|factor| factor.uses_constant())
    }
}

/// Quantize a clear color to 8 bits per channel, clamping to [0, 1]
pub fn quantize_color(color: [f32; 4]) -> [u8; 4] {
    color.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Expand a quantized clear color back to floats
pub fn dequantize_color(color: [u8; 4]) -> [f32; 4] {
    color.map(|channel| f32::from(channel) / 255.0)
}

#[cfg(test)]
#[path = "packed_tests.rs"]
mod tests;
