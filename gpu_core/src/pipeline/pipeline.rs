/// Pipeline objects
///
/// A pipeline captures every piece of fixed-function state a draw depends on,
/// plus the framebuffer role it renders into and the shader program it runs.
/// Binding reapplies the whole state in a fixed order so nothing left by a
/// previous pipeline bleeds through.
///
/// The framebuffer and program are held as identities and resolved through
/// their managers on every use, so a pipeline whose targets were destroyed
/// reads as invalid instead of dangling.

use std::sync::{Arc, Mutex};

use crate::driver::{Capability, GraphicsDriver, SharedDriver, StencilFace};
use crate::pipeline::{
    dequantize_color, quantize_color, CullMode, PackedBlendState, PackedGlobalState,
    PackedStencilFace, PipelineCreateInfo, PolygonMode, PrimitiveTopology, StencilOpState,
};
use crate::shader::{ProgramId, ShaderManager};
use crate::target::{FrameBufferId, RenderTargetManager};
use crate::utils::{lock, slot_id, HashCombiner};
use crate::{engine_assert, engine_trace};

const SOURCE: &str = "gpu::PipelineManager";

/// Maximum number of pipelines (id 0 is reserved)
pub const MAX_PIPELINE_COUNT: u32 = 8192;

slot_id! {
    /// Dense slot id of a pipeline
    PipelineId, capacity = MAX_PIPELINE_COUNT
}

/// Shared handles every pipeline resolves its references through
pub(crate) struct PipelineContext {
    pub(crate) driver: SharedDriver,
    pub(crate) render_targets: Arc<Mutex<RenderTargetManager>>,
    pub(crate) shaders: Arc<Mutex<ShaderManager>>,
    pub(crate) reversed_depth: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ColorAttachmentState {
    clear_color: [u8; 4],
    blend: PackedBlendState,
}

/// Stencil values kept outside the packed word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StencilMasks {
    compare_mask: u8,
    reference: u8,
    write_mask: u8,
}

impl From<&StencilOpState> for StencilMasks {
    fn from(state: &StencilOpState) -> Self {
        Self {
            compare_mask: state.compare_mask,
            reference: state.reference,
            write_mask: state.write_mask,
        }
    }
}

impl From<&StencilOpState> for PackedStencilFace {
    fn from(state: &StencilOpState) -> Self {
        Self {
            fail_op: state.fail_op,
            depth_fail_op: state.depth_fail_op,
            pass_op: state.pass_op,
            compare_func: state.compare_func,
            write_enable: state.write_enable,
        }
    }
}

pub struct Pipeline {
    context: Arc<PipelineContext>,
    id: PipelineId,
    frame_buffer: FrameBufferId,
    shader_program: ProgramId,

    state: PackedGlobalState,
    attachments: Vec<ColorAttachmentState>,
    blend_constants: [f32; 4],

    depth_bias_constant_factor: f32,
    depth_bias_clamp: f32,
    depth_bias_slope_factor: f32,
    line_width: f32,

    depth_clear_value: f32,
    stencil_clear_value: u8,
    front_stencil: StencilMasks,
    back_stencil: StencilMasks,
}

impl Pipeline {
    pub(crate) fn new(context: Arc<PipelineContext>) -> Self {
        Self {
            context,
            id: PipelineId::INVALID,
            frame_buffer: FrameBufferId::Invalid,
            shader_program: ProgramId::INVALID,
            state: PackedGlobalState::default(),
            attachments: Vec::new(),
            blend_constants: [0.0; 4],
            depth_bias_constant_factor: 0.0,
            depth_bias_clamp: 0.0,
            depth_bias_slope_factor: 0.0,
            line_width: 0.0,
            depth_clear_value: 0.0,
            stencil_clear_value: 0,
            front_stencil: StencilMasks::default(),
            back_stencil: StencilMasks::default(),
        }
    }

    pub(crate) fn set_id(&mut self, id: PipelineId) {
        self.id = id;
    }

    /// Capture the full state described by `info`
    ///
    /// Every precondition is a contract check: the pipeline must be registered
    /// and not yet created, the framebuffer role and program must be valid, and
    /// there must be exactly one clear color and one blend state per color
    /// attachment of the framebuffer.
    pub fn create(&mut self, info: &PipelineCreateInfo) {
        engine_assert!(self.id.is_valid(), SOURCE, "Pipeline was not registered through the pipeline manager");
        engine_assert!(!self.is_valid(), SOURCE, "Pipeline {} is already created", self.id);

        let color_attachment_count = {
            let render_targets = lock(&self.context.render_targets);
            engine_assert!(
                render_targets.is_frame_buffer_valid(info.frame_buffer),
                SOURCE,
                "Pipeline {}: invalid frame buffer {:?}",
                self.id, info.frame_buffer
            );
            render_targets.color_attachment_count(info.frame_buffer) as usize
        };
        engine_assert!(
            lock(&self.context.shaders).contains(info.shader_program),
            SOURCE,
            "Pipeline {}: invalid shader program {}",
            self.id, info.shader_program
        );

        let clear_colors = info.clear_values.color_attachment_clear_colors;
        let blend_states = info.color_blend_state.attachments;
        engine_assert!(
            clear_colors.len() == color_attachment_count && blend_states.len() == color_attachment_count,
            SOURCE,
            "Pipeline {}: {} clear color(s) and {} blend state(s) for {} color attachment(s)",
            self.id, clear_colors.len(), blend_states.len(), color_attachment_count
        );

        self.attachments = clear_colors
            .iter()
            .zip(blend_states)
            .map(|(clear_color, input)| {
                let mut blend = PackedBlendState::default();
                blend.set_color_write_mask(input.color_write_mask);
                blend.set_src_color_factor(input.src_color_factor);
                blend.set_dst_color_factor(input.dst_color_factor);
                blend.set_color_blend_op(input.color_blend_op);
                blend.set_src_alpha_factor(input.src_alpha_factor);
                blend.set_dst_alpha_factor(input.dst_alpha_factor);
                blend.set_alpha_blend_op(input.alpha_blend_op);
                blend.set_blend_enable(input.blend_enable);
                ColorAttachmentState { clear_color: quantize_color(*clear_color), blend }
            })
            .collect();

        self.depth_clear_value = info.clear_values.depth;
        self.stencil_clear_value = info.clear_values.stencil;

        let mut state = PackedGlobalState::default();
        state.set_primitive_topology(info.input_assembly_state.topology);

        let rasterization = info.rasterization_state;
        state.set_front_face(rasterization.front_face);
        state.set_polygon_mode(rasterization.polygon_mode);
        state.set_cull_mode(rasterization.cull_mode);
        state.set_depth_bias_enable(rasterization.depth_bias_enable);
        self.depth_bias_constant_factor = rasterization.depth_bias_constant_factor;
        self.depth_bias_clamp = rasterization.depth_bias_clamp;
        self.depth_bias_slope_factor = rasterization.depth_bias_slope_factor;
        self.line_width = rasterization.line_width;

        let depth_stencil = info.depth_stencil_state;
        state.set_depth_test_enable(depth_stencil.depth_test_enable);
        state.set_depth_write_enable(depth_stencil.depth_write_enable);
        state.set_depth_compare_func(depth_stencil.depth_compare_func);
        state.set_stencil_test_enable(depth_stencil.stencil_test_enable);
        state.set_stencil_face(StencilFace::Front, PackedStencilFace::from(&depth_stencil.front));
        state.set_stencil_face(StencilFace::Back, PackedStencilFace::from(&depth_stencil.back));
        self.front_stencil = StencilMasks::from(&depth_stencil.front);
        self.back_stencil = StencilMasks::from(&depth_stencil.back);

        let color_blend = info.color_blend_state;
        state.set_logic_op_enable(color_blend.logic_op_enable);
        state.set_logic_op(color_blend.logic_op);
        self.blend_constants = color_blend.blend_constants;

        self.state = state;
        self.frame_buffer = info.frame_buffer;
        self.shader_program = info.shader_program;

        engine_trace!(SOURCE, "Pipeline {} created ({:?}, program {})", self.id, self.frame_buffer, self.shader_program);
    }

    /// Reset every captured field; no-op if the pipeline was never created
    pub fn destroy(&mut self) {
        if self.frame_buffer == FrameBufferId::Invalid {
            return;
        }

        let id = self.id;
        *self = Self::new(self.context.clone());
        self.id = id;
    }

    /// Make the pipeline current
    ///
    /// Binds the framebuffer and program, then applies, in order: per-attachment
    /// write masks and blending, blend constants, logic op, draw buffers, depth,
    /// stencil, front face, culling, polygon mode and (line mode only) line width.
    pub fn bind(&self) {
        engine_assert!(self.is_valid(), SOURCE, "Binding invalid pipeline {}", self.id);

        lock(&self.context.render_targets).bind_frame_buffer(self.frame_buffer);
        lock(&self.context.shaders).bind_program(self.shader_program);

        let mut guard = lock(&self.context.driver);
        let driver: &mut dyn GraphicsDriver = &mut *guard;

        self.apply_color_attachments(driver);
        self.apply_depth(driver);
        self.apply_stencil(driver);

        driver.front_face(self.state.front_face());
        match self.state.cull_mode() {
            CullMode::None => driver.disable(Capability::CullFace),
            mode => {
                driver.enable(Capability::CullFace);
                driver.cull_face(mode);
            }
        }

        let polygon_mode = self.state.polygon_mode();
        driver.polygon_mode(polygon_mode);
        if polygon_mode == PolygonMode::Line {
            driver.line_width(self.line_width);
        }
    }

    /// Clear the attachments described by the captured clear values
    pub fn clear_frame_buffer(&self) {
        engine_assert!(self.is_valid(), SOURCE, "Clearing through invalid pipeline {}", self.id);

        let render_targets = lock(&self.context.render_targets);
        for (index, attachment) in self.attachments.iter().enumerate() {
            render_targets.clear_frame_buffer_color(self.frame_buffer, index as u32, dequantize_color(attachment.clear_color));
        }
        render_targets.clear_frame_buffer_depth_stencil(
            self.frame_buffer,
            self.depth_clear_value,
            i32::from(self.stencil_clear_value),
        );
    }

    /// Content hash of the captured state, `u64::MAX` for an invalid pipeline
    ///
    /// The slot id is not part of the hash: equal descriptors hash equal
    /// wherever they are registered.
    pub fn hash(&self) -> u64 {
        if !self.is_valid() {
            return u64::MAX;
        }

        let mut hasher = HashCombiner::new();
        hasher.add(&self.attachments.len());
        for attachment in &self.attachments {
            hasher.add(&attachment.clear_color).add(&attachment.blend.raw());
        }
        for constant in self.blend_constants {
            hasher.add_f32(constant);
        }

        hasher
            .add(&self.frame_buffer)
            .add(&self.shader_program)
            .add(&self.state.raw())
            .add_f32(self.depth_bias_constant_factor)
            .add_f32(self.depth_bias_clamp)
            .add_f32(self.depth_bias_slope_factor)
            .add_f32(self.depth_clear_value)
            .add(&self.stencil_clear_value);

        for masks in [self.front_stencil, self.back_stencil] {
            hasher.add(&masks.compare_mask).add(&masks.reference).add(&masks.write_mask);
        }

        hasher.add_f32(self.line_width);
        hasher.finish()
    }

    /// Registered, created, and both the framebuffer and program still valid
    pub fn is_valid(&self) -> bool {
        if !self.id.is_valid() {
            return false;
        }
        let frame_buffer_valid = lock(&self.context.render_targets).is_frame_buffer_valid(self.frame_buffer);
        frame_buffer_valid && lock(&self.context.shaders).contains(self.shader_program)
    }

    pub fn id(&self) -> PipelineId {
        self.id
    }

    pub fn primitive_topology(&self) -> PrimitiveTopology {
        self.state.primitive_topology()
    }

    pub fn frame_buffer_id(&self) -> FrameBufferId {
        self.frame_buffer
    }

    pub fn shader_program_id(&self) -> ProgramId {
        self.shader_program
    }

    pub fn color_attachment_count(&self) -> u32 {
        self.attachments.len() as u32
    }

    // ===== State application =====

    fn apply_color_attachments(&self, driver: &mut dyn GraphicsDriver) {
        let mut uses_blend_constants = false;

        for (index, attachment) in self.attachments.iter().enumerate() {
            let index = index as u32;
            let blend = attachment.blend;

            driver.color_mask_indexed(index, blend.color_write_mask());

            if blend.blend_enable() {
                driver.enable_indexed(Capability::Blend, index);
                driver.blend_equation_separate_indexed(index, blend.color_blend_op(), blend.alpha_blend_op());
                driver.blend_func_separate_indexed(
                    index,
                    blend.src_color_factor(),
                    blend.dst_color_factor(),
                    blend.src_alpha_factor(),
                    blend.dst_alpha_factor(),
                );
                uses_blend_constants |= blend.uses_constant_factor();
            } else {
                driver.disable_indexed(Capability::Blend, index);
            }
        }

        // The constant register is shared by every attachment
        driver.blend_color(if uses_blend_constants { self.blend_constants } else { [0.0; 4] });

        if self.state.logic_op_enable() {
            driver.enable(Capability::ColorLogicOp);
            driver.logic_op(self.state.logic_op());
        } else {
            driver.disable(Capability::ColorLogicOp);
        }

        driver.draw_buffers(self.attachments.len() as u32);
    }

    fn apply_depth(&self, driver: &mut dyn GraphicsDriver) {
        let offset_capability = match self.state.polygon_mode() {
            PolygonMode::Fill => Capability::PolygonOffsetFill,
            PolygonMode::Line => Capability::PolygonOffsetLine,
            PolygonMode::Point => Capability::PolygonOffsetPoint,
        };

        // The write mask also gates depth clears.
        if !self.state.depth_test_enable() {
            driver.disable(Capability::DepthTest);
            driver.depth_mask(self.state.depth_write_enable());
            driver.disable(offset_capability);
            return;
        }

        driver.enable(Capability::DepthTest);
        driver.depth_mask(self.state.depth_write_enable());
        driver.depth_func(self.state.depth_compare_func());

        if self.state.depth_bias_enable() {
            let sign = if self.context.reversed_depth { -1.0 } else { 1.0 };
            driver.enable(offset_capability);
            driver.polygon_offset_clamp(
                sign * self.depth_bias_slope_factor,
                sign * self.depth_bias_constant_factor,
                sign * self.depth_bias_clamp,
            );
        } else {
            driver.disable(offset_capability);
        }
    }

    fn apply_stencil(&self, driver: &mut dyn GraphicsDriver) {
        if !self.state.stencil_test_enable() {
            driver.disable(Capability::StencilTest);
            return;
        }

        driver.enable(Capability::StencilTest);
        for (face, masks) in [(StencilFace::Front, self.front_stencil), (StencilFace::Back, self.back_stencil)] {
            let packed = self.state.stencil_face(face);
            driver.stencil_func_separate(face, packed.compare_func, masks.reference, masks.compare_mask);
            if packed.write_enable {
                driver.stencil_mask_separate(face, masks.write_mask);
                driver.stencil_op_separate(face, packed.fail_op, packed.depth_fail_op, packed.pass_op);
            } else {
                driver.stencil_mask_separate(face, 0x00);
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
