/// Mock graphics driver for unit tests (no GPU required)
///
/// Hands out increasing native handles, records every call as a string in call
/// order and keeps enough object state to answer queries: buffer bytes (so
/// maps return real pointers), compile/link status and framebuffer status.
/// Failures are scripted through the public fields.

use std::sync::{Arc, Mutex};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::buffer::BufferCreationFlags;
use crate::driver::{
    ActiveUniform, AttachmentPoint, BufferTarget, Capability, ClipDepth, ClipOrigin,
    FramebufferStatus, GraphicsDriver, MapAccess, ObjectKind, SharedDriver, StencilFace,
};
use crate::pipeline::{
    BlendFactor, BlendOp, ColorComponentFlags, CompareFunc, CullMode, FrontFace, LogicOp,
    PolygonMode, StencilOp,
};
use crate::shader::{ShaderStageType, UniformValue};
use crate::texture::TextureDesc;

pub struct MockDriver {
    /// Every driver call, formatted as `name(args)`
    pub calls: Vec<String>,
    /// Reported maximum color attachment count
    pub max_color_attachments: u32,
    /// Shader sources containing this marker fail to compile
    pub fail_compile_marker: Option<String>,
    /// Every link fails
    pub fail_link: bool,
    /// Status reported by every completeness check
    pub framebuffer_status: FramebufferStatus,
    /// Uniforms reported for every linked program
    pub active_uniforms: Vec<ActiveUniform>,
    /// Fail every map request
    pub fail_map: bool,

    next_handle: u32,
    buffers: FxHashMap<u32, Vec<u8>>,
    shaders: FxHashMap<u32, (String, bool)>,
    programs: FxHashMap<u32, bool>,
    textures: FxHashSet<u32>,
    framebuffers: FxHashSet<u32>,
    labels: FxHashMap<(ObjectKind, u32), String>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            max_color_attachments: 8,
            fail_compile_marker: None,
            fail_link: false,
            framebuffer_status: FramebufferStatus::Complete,
            active_uniforms: Vec::new(),
            fail_map: false,
            next_handle: 1,
            buffers: FxHashMap::default(),
            shaders: FxHashMap::default(),
            programs: FxHashMap::default(),
            textures: FxHashSet::default(),
            framebuffers: FxHashSet::default(),
            labels: FxHashMap::default(),
        }
    }

    /// Create a mock and the shared driver handle pointing at it
    pub fn new_shared() -> (Arc<Mutex<MockDriver>>, SharedDriver) {
        let mock = Arc::new(Mutex::new(MockDriver::new()));
        let driver: SharedDriver = mock.clone();
        (mock, driver)
    }

    fn next(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn record(&mut self, call: String) {
        self.calls.push(call);
    }

    // ===== Inspection helpers =====

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn has_call(&self, call: &str) -> bool {
        self.calls.iter().any(|c| c == call)
    }

    /// Number of calls whose text starts with `prefix`
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// Index of the first call equal to `call`
    pub fn position(&self, call: &str) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }

    pub fn buffer_contents(&self, buffer: u32) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|bytes| bytes.as_slice())
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.framebuffers.len()
    }

    pub fn label(&self, kind: ObjectKind, handle: u32) -> Option<&str> {
        self.labels.get(&(kind, handle)).map(|s| s.as_str())
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDriver for MockDriver {
    fn max_color_attachments(&self) -> u32 {
        self.max_color_attachments
    }

    fn object_label(&mut self, kind: ObjectKind, handle: u32, label: &str) {
        self.labels.insert((kind, handle), label.to_string());
        self.record(format!("object_label({:?}, {}, {})", kind, handle, label));
    }

    // ===== Buffers =====

    fn create_buffer(&mut self) -> u32 {
        let handle = self.next();
        self.record(format!("create_buffer() -> {}", handle));
        handle
    }

    fn buffer_storage(&mut self, buffer: u32, size: u64, data: Option<&[u8]>, flags: BufferCreationFlags) {
        let mut bytes = vec![0u8; size as usize];
        if let Some(data) = data {
            bytes.copy_from_slice(data);
        }
        self.buffers.insert(buffer, bytes);
        self.record(format!("buffer_storage({}, {}, {:#x})", buffer, size, flags.bits()));
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.buffers.remove(&buffer);
        self.record(format!("delete_buffer({})", buffer));
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) {
        self.record(format!("bind_buffer({:?}, {})", target, buffer));
    }

    fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, buffer: u32) {
        self.record(format!("bind_buffer_base({:?}, {}, {})", target, index, buffer));
    }

    fn buffer_sub_data(&mut self, buffer: u32, offset: u64, data: &[u8]) {
        if let Some(bytes) = self.buffers.get_mut(&buffer) {
            let start = offset as usize;
            bytes[start..start + data.len()].copy_from_slice(data);
        }
        self.record(format!("buffer_sub_data({}, {}, {})", buffer, offset, data.len()));
    }

    fn clear_buffer_sub_data(&mut self, buffer: u32, offset: u64, size: u64, value: u8) {
        if let Some(bytes) = self.buffers.get_mut(&buffer) {
            let start = offset as usize;
            bytes[start..start + size as usize].fill(value);
        }
        self.record(format!("clear_buffer_sub_data({}, {}, {}, {})", buffer, offset, size, value));
    }

    fn map_buffer(&mut self, buffer: u32, access: MapAccess) -> *mut u8 {
        self.record(format!("map_buffer({}, {:?})", buffer, access));
        if self.fail_map {
            return std::ptr::null_mut();
        }
        self.buffers
            .get_mut(&buffer)
            .map(|bytes| bytes.as_mut_ptr())
            .unwrap_or(std::ptr::null_mut())
    }

    fn unmap_buffer(&mut self, buffer: u32) -> bool {
        self.record(format!("unmap_buffer({})", buffer));
        self.buffers.contains_key(&buffer)
    }

    // ===== Shaders and programs =====

    fn create_shader(&mut self, stage: ShaderStageType) -> u32 {
        let handle = self.next();
        self.shaders.insert(handle, (String::new(), false));
        self.record(format!("create_shader({:?}) -> {}", stage, handle));
        handle
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        if let Some(entry) = self.shaders.get_mut(&shader) {
            entry.0 = source.to_string();
        }
        self.record(format!("shader_source({})", shader));
    }

    fn compile_shader(&mut self, shader: u32) {
        let marker = self.fail_compile_marker.clone();
        if let Some(entry) = self.shaders.get_mut(&shader) {
            entry.1 = match &marker {
                Some(marker) => !entry.0.contains(marker.as_str()),
                None => true,
            };
        }
        self.record(format!("compile_shader({})", shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.shaders.get(&shader).map(|entry| entry.1).unwrap_or(false)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        format!("0({}) : error C0000: syntax error", shader)
    }

    fn delete_shader(&mut self, shader: u32) {
        self.shaders.remove(&shader);
        self.record(format!("delete_shader({})", shader));
    }

    fn create_program(&mut self) -> u32 {
        let handle = self.next();
        self.programs.insert(handle, false);
        self.record(format!("create_program() -> {}", handle));
        handle
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        self.record(format!("attach_shader({}, {})", program, shader));
    }

    fn detach_shader(&mut self, program: u32, shader: u32) {
        self.record(format!("detach_shader({}, {})", program, shader));
    }

    fn link_program(&mut self, program: u32) {
        let linked = !self.fail_link;
        if let Some(status) = self.programs.get_mut(&program) {
            *status = linked;
        }
        self.record(format!("link_program({})", program));
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.programs.get(&program).copied().unwrap_or(false)
    }

    fn program_info_log(&self, program: u32) -> String {
        format!("program {}: unresolved reference", program)
    }

    fn delete_program(&mut self, program: u32) {
        self.programs.remove(&program);
        self.record(format!("delete_program({})", program));
    }

    fn use_program(&mut self, program: u32) {
        self.record(format!("use_program({})", program));
    }

    fn active_uniforms(&self, _program: u32) -> Vec<ActiveUniform> {
        self.active_uniforms.clone()
    }

    fn program_uniform(&mut self, program: u32, location: i32, value: &UniformValue) {
        self.record(format!("program_uniform({}, {}, {:?})", program, location, value));
    }

    // ===== Textures =====

    fn create_texture(&mut self, desc: &TextureDesc) -> u32 {
        let handle = self.next();
        self.textures.insert(handle);
        self.record(format!(
            "create_texture({:?}, {}x{}, {:?}) -> {}",
            desc.texture_type, desc.width, desc.height, desc.format, handle
        ));
        handle
    }

    fn delete_texture(&mut self, texture: u32) {
        self.textures.remove(&texture);
        self.record(format!("delete_texture({})", texture));
    }

    // ===== Framebuffers =====

    fn create_framebuffer(&mut self) -> u32 {
        let handle = self.next();
        self.framebuffers.insert(handle);
        self.record(format!("create_framebuffer() -> {}", handle));
        handle
    }

    fn framebuffer_texture(&mut self, framebuffer: u32, attachment: AttachmentPoint, texture: u32, level: u32) {
        self.record(format!("framebuffer_texture({}, {:?}, {}, {})", framebuffer, attachment, texture, level));
    }

    fn check_framebuffer_status(&self, _framebuffer: u32) -> FramebufferStatus {
        self.framebuffer_status
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        self.framebuffers.remove(&framebuffer);
        self.record(format!("delete_framebuffer({})", framebuffer));
    }

    fn bind_framebuffer(&mut self, framebuffer: u32) {
        self.record(format!("bind_framebuffer({})", framebuffer));
    }

    fn clear_framebuffer_color(&mut self, framebuffer: u32, draw_buffer: u32, color: [f32; 4]) {
        self.record(format!("clear_framebuffer_color({}, {}, {:?})", framebuffer, draw_buffer, color));
    }

    fn clear_framebuffer_depth(&mut self, framebuffer: u32, depth: f32) {
        self.record(format!("clear_framebuffer_depth({}, {})", framebuffer, depth));
    }

    fn clear_framebuffer_stencil(&mut self, framebuffer: u32, stencil: i32) {
        self.record(format!("clear_framebuffer_stencil({}, {})", framebuffer, stencil));
    }

    fn clear_framebuffer_depth_stencil(&mut self, framebuffer: u32, depth: f32, stencil: i32) {
        self.record(format!("clear_framebuffer_depth_stencil({}, {}, {})", framebuffer, depth, stencil));
    }

    fn draw_buffers(&mut self, count: u32) {
        self.record(format!("draw_buffers({})", count));
    }

    // ===== Fixed-function state =====

    fn enable(&mut self, cap: Capability) {
        self.record(format!("enable({:?})", cap));
    }

    fn disable(&mut self, cap: Capability) {
        self.record(format!("disable({:?})", cap));
    }

    fn enable_indexed(&mut self, cap: Capability, index: u32) {
        self.record(format!("enable_indexed({:?}, {})", cap, index));
    }

    fn disable_indexed(&mut self, cap: Capability, index: u32) {
        self.record(format!("disable_indexed({:?}, {})", cap, index));
    }

    fn color_mask_indexed(&mut self, index: u32, mask: ColorComponentFlags) {
        self.record(format!("color_mask_indexed({}, {:#x})", index, mask.bits()));
    }

    fn blend_equation_separate_indexed(&mut self, index: u32, color_op: BlendOp, alpha_op: BlendOp) {
        self.record(format!("blend_equation_separate_indexed({}, {:?}, {:?})", index, color_op, alpha_op));
    }

    fn blend_func_separate_indexed(
        &mut self,
        index: u32,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.record(format!(
            "blend_func_separate_indexed({}, {:?}, {:?}, {:?}, {:?})",
            index, src_color, dst_color, src_alpha, dst_alpha
        ));
    }

    fn blend_color(&mut self, color: [f32; 4]) {
        self.record(format!("blend_color({:?})", color));
    }

    fn logic_op(&mut self, op: LogicOp) {
        self.record(format!("logic_op({:?})", op));
    }

    fn depth_mask(&mut self, write: bool) {
        self.record(format!("depth_mask({})", write));
    }

    fn depth_func(&mut self, func: CompareFunc) {
        self.record(format!("depth_func({:?})", func));
    }

    fn polygon_offset_clamp(&mut self, slope_factor: f32, constant_factor: f32, clamp: f32) {
        self.record(format!("polygon_offset_clamp({}, {}, {})", slope_factor, constant_factor, clamp));
    }

    fn polygon_mode(&mut self, mode: PolygonMode) {
        self.record(format!("polygon_mode({:?})", mode));
    }

    fn stencil_func_separate(&mut self, face: StencilFace, func: CompareFunc, reference: u8, mask: u8) {
        self.record(format!("stencil_func_separate({:?}, {:?}, {}, {:#x})", face, func, reference, mask));
    }

    fn stencil_mask_separate(&mut self, face: StencilFace, mask: u8) {
        self.record(format!("stencil_mask_separate({:?}, {:#x})", face, mask));
    }

    fn stencil_op_separate(&mut self, face: StencilFace, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        self.record(format!("stencil_op_separate({:?}, {:?}, {:?}, {:?})", face, fail, depth_fail, pass));
    }

    fn front_face(&mut self, face: FrontFace) {
        self.record(format!("front_face({:?})", face));
    }

    fn cull_face(&mut self, mode: CullMode) {
        self.record(format!("cull_face({:?})", mode));
    }

    fn line_width(&mut self, width: f32) {
        self.record(format!("line_width({})", width));
    }

    fn clip_control(&mut self, origin: ClipOrigin, depth: ClipDepth) {
        self.record(format!("clip_control({:?}, {:?})", origin, depth));
    }
}

#[cfg(test)]
#[path = "mock_driver_tests.rs"]
mod tests;
