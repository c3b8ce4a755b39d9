/// Pipeline state descriptors
///
/// Vulkan/D3D-style create-info structures consumed by `Pipeline::create`,
/// and the enumerations they are made of. Every enumeration is narrowed into
/// a fixed number of bits when packed, so each one carries its bit width and
/// a checked decoder.

use bitflags::bitflags;

use crate::shader::ProgramId;
use crate::target::FrameBufferId;

/// Define a packable state enumeration
///
/// Generates the enum with explicit discriminants, its bit width, `bits()` and
/// a `from_bits()` decoder that treats unknown values as a contract violation.
macro_rules! packed_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $width:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// Number of bits used in packed state
            pub const BIT_WIDTH: u32 = $width;

            /// Packed representation
            pub const fn bits(self) -> u32 {
                self as u32
            }

            /// Decode a packed value
            pub fn from_bits(bits: u32) -> Self {
                match bits {
                    $( $value => $name::$variant, )+
                    _ => crate::engine_assert_fail!(
                        "gpu::PipelineManager",
                        "Invalid packed {} value: {}",
                        stringify!($name),
                        bits
                    ),
                }
            }
        }
    };
}

packed_enum! {
    /// Primitive assembly topology
    PrimitiveTopology: 3 {
        PointList = 0,
        LineList = 1,
        LineStrip = 2,
        TriangleList = 3,
        TriangleStrip = 4,
        TriangleFan = 5,
    }
}

packed_enum! {
    /// Front-facing winding order
    FrontFace: 1 {
        CounterClockwise = 0,
        Clockwise = 1,
    }
}

packed_enum! {
    /// Polygon rasterization mode
    PolygonMode: 2 {
        Fill = 0,
        Line = 1,
        Point = 2,
    }
}

packed_enum! {
    /// Face culling mode
    CullMode: 2 {
        /// Culling disabled
        None = 0,
        Front = 1,
        Back = 2,
        FrontAndBack = 3,
    }
}

packed_enum! {
    /// Depth and stencil comparison function
    CompareFunc: 3 {
        Never = 0,
        Less = 1,
        Equal = 2,
        LessOrEqual = 3,
        Greater = 4,
        NotEqual = 5,
        GreaterOrEqual = 6,
        Always = 7,
    }
}

packed_enum! {
    /// Stencil buffer update operation
    StencilOp: 3 {
        Keep = 0,
        Zero = 1,
        Replace = 2,
        IncrementAndClamp = 3,
        DecrementAndClamp = 4,
        Invert = 5,
        IncrementAndWrap = 6,
        DecrementAndWrap = 7,
    }
}

packed_enum! {
    /// Blend factor
    BlendFactor: 4 {
        Zero = 0,
        One = 1,
        SrcColor = 2,
        OneMinusSrcColor = 3,
        DstColor = 4,
        OneMinusDstColor = 5,
        SrcAlpha = 6,
        OneMinusSrcAlpha = 7,
        DstAlpha = 8,
        OneMinusDstAlpha = 9,
        ConstantColor = 10,
        OneMinusConstantColor = 11,
        ConstantAlpha = 12,
        OneMinusConstantAlpha = 13,
    }
}

impl BlendFactor {
    /// Whether the factor reads the shared blend-constant register
    pub fn uses_constant(self) -> bool {
        matches!(
            self,
            BlendFactor::ConstantColor
                | BlendFactor::OneMinusConstantColor
                | BlendFactor::ConstantAlpha
                | BlendFactor::OneMinusConstantAlpha
        )
    }
}

packed_enum! {
    /// Blend equation
    BlendOp: 3 {
        Add = 0,
        Subtract = 1,
        ReverseSubtract = 2,
        Min = 3,
        Max = 4,
    }
}

packed_enum! {
    /// Framebuffer logic operation
    LogicOp: 4 {
        Clear = 0,
        And = 1,
        AndReverse = 2,
        Copy = 3,
        AndInverted = 4,
        NoOp = 5,
        Xor = 6,
        Or = 7,
        Nor = 8,
        Equivalent = 9,
        Invert = 10,
        OrReverse = 11,
        CopyInverted = 12,
        OrInverted = 13,
        Nand = 14,
        Set = 15,
    }
}

bitflags! {
    /// Color channel write mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorComponentFlags: u32 {
        const R = 1 << 0;
        const G = 1 << 1;
        const B = 1 << 2;
        const A = 1 << 3;
    }
}

// ============================================================================
// Create-info structures
// ============================================================================

/// Input assembly state
#[derive(Debug, Clone, Copy)]
pub struct InputAssemblyStateCreateInfo {
    pub topology: PrimitiveTopology,
}

impl Default for InputAssemblyStateCreateInfo {
    fn default() -> Self {
        Self { topology: PrimitiveTopology::TriangleList }
    }
}

/// Rasterization state
#[derive(Debug, Clone, Copy)]
pub struct RasterizationStateCreateInfo {
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth_bias_enable: bool,
    pub depth_bias_constant_factor: f32,
    pub depth_bias_clamp: f32,
    pub depth_bias_slope_factor: f32,
    pub line_width: f32,
}

impl Default for RasterizationStateCreateInfo {
    fn default() -> Self {
        Self {
            polygon_mode: PolygonMode::Fill,
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            depth_bias_enable: false,
            depth_bias_constant_factor: 0.0,
            depth_bias_clamp: 0.0,
            depth_bias_slope_factor: 0.0,
            line_width: 1.0,
        }
    }
}

/// Per-face stencil state
#[derive(Debug, Clone, Copy)]
pub struct StencilOpState {
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub compare_func: CompareFunc,
    pub compare_mask: u8,
    pub reference: u8,
    pub write_enable: bool,
    pub write_mask: u8,
}

impl Default for StencilOpState {
    fn default() -> Self {
        Self {
            fail_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            compare_func: CompareFunc::Always,
            compare_mask: 0xFF,
            reference: 0,
            write_enable: false,
            write_mask: 0xFF,
        }
    }
}

/// Depth and stencil state
#[derive(Debug, Clone, Copy)]
pub struct DepthStencilStateCreateInfo {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_func: CompareFunc,
    pub stencil_test_enable: bool,
    pub front: StencilOpState,
    pub back: StencilOpState,
}

impl Default for DepthStencilStateCreateInfo {
    fn default() -> Self {
        Self {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_func: CompareFunc::Less,
            stencil_test_enable: false,
            front: StencilOpState::default(),
            back: StencilOpState::default(),
        }
    }
}

/// Blend state of one color attachment
#[derive(Debug, Clone, Copy)]
pub struct ColorBlendAttachmentState {
    pub blend_enable: bool,
    pub src_color_factor: BlendFactor,
    pub dst_color_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_factor: BlendFactor,
    pub dst_alpha_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    pub color_write_mask: ColorComponentFlags,
}

impl Default for ColorBlendAttachmentState {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_color_factor: BlendFactor::One,
            dst_color_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_factor: BlendFactor::One,
            dst_alpha_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            color_write_mask: ColorComponentFlags::all(),
        }
    }
}

/// Color blend state
#[derive(Debug, Clone, Copy)]
pub struct ColorBlendStateCreateInfo<'a> {
    pub logic_op_enable: bool,
    pub logic_op: LogicOp,
    /// One entry per framebuffer color attachment
    pub attachments: &'a [ColorBlendAttachmentState],
    pub blend_constants: [f32; 4],
}

/// Clear values captured by the pipeline
#[derive(Debug, Clone, Copy)]
pub struct FrameBufferClearValues<'a> {
    /// One RGBA color per framebuffer color attachment, clamped to [0, 1]
    pub color_attachment_clear_colors: &'a [[f32; 4]],
    pub depth: f32,
    pub stencil: u8,
}

/// Full pipeline description
#[derive(Debug, Clone, Copy)]
pub struct PipelineCreateInfo<'a> {
    pub input_assembly_state: &'a InputAssemblyStateCreateInfo,
    pub rasterization_state: &'a RasterizationStateCreateInfo,
    pub depth_stencil_state: &'a DepthStencilStateCreateInfo,
    pub color_blend_state: &'a ColorBlendStateCreateInfo<'a>,
    pub clear_values: &'a FrameBufferClearValues<'a>,
    pub frame_buffer: FrameBufferId,
    pub shader_program: ProgramId,
}
