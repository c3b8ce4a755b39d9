/// OpenGL implementation of `GraphicsDriver`
///
/// Every call maps onto one or two direct-state-access entry points of
/// OpenGL 4.5. The GL context must be current on the calling thread for the
/// whole lifetime of the driver, and every program or framebuffer bind must go
/// through the driver so the binding cache stays truthful.

use std::ffi::{c_void, CStr};
use std::ptr;

use gl::types::{GLboolean, GLchar, GLenum, GLint, GLsizei, GLsizeiptr, GLuint};
use gpu_core::gpu::buffer::BufferCreationFlags;
use gpu_core::gpu::driver::{
    ActiveUniform, AttachmentPoint, BufferTarget, Capability, ClipDepth, ClipOrigin,
    FramebufferStatus, GraphicsDriver, MapAccess, ObjectKind, StencilFace,
};
use gpu_core::gpu::pipeline::{
    BlendFactor, BlendOp, ColorComponentFlags, CompareFunc, CullMode, FrontFace, LogicOp,
    PolygonMode, StencilOp,
};
use gpu_core::gpu::shader::{ShaderStageType, UniformValue};
use gpu_core::gpu::texture::{TextureDesc, TextureType};
use gpu_core::gpu::{Error, Result};
use gpu_core::{engine_debug, engine_error, engine_info, engine_warn};

use crate::gl_binding_cache::BindingCache;
use crate::gl_translate as translate;

const SOURCE: &str = "gpu::GlDriver";

/// Oldest context version with direct state access and clip control
const REQUIRED_VERSION: (GLint, GLint) = (4, 5);

/// Entry points the driver cannot work without
const REQUIRED_FUNCTIONS: [(&str, fn() -> bool); 12] = [
    ("glCreateBuffers", gl::CreateBuffers::is_loaded),
    ("glNamedBufferStorage", gl::NamedBufferStorage::is_loaded),
    ("glClearNamedBufferSubData", gl::ClearNamedBufferSubData::is_loaded),
    ("glMapNamedBuffer", gl::MapNamedBuffer::is_loaded),
    ("glCreateTextures", gl::CreateTextures::is_loaded),
    ("glTextureStorage2D", gl::TextureStorage2D::is_loaded),
    ("glCreateFramebuffers", gl::CreateFramebuffers::is_loaded),
    ("glNamedFramebufferTexture", gl::NamedFramebufferTexture::is_loaded),
    ("glCheckNamedFramebufferStatus", gl::CheckNamedFramebufferStatus::is_loaded),
    ("glClearNamedFramebufferfv", gl::ClearNamedFramebufferfv::is_loaded),
    ("glProgramUniform1i", gl::ProgramUniform1i::is_loaded),
    ("glClipControl", gl::ClipControl::is_loaded),
];

/// OpenGL driver over the process-wide `gl` function table
pub struct GlDriver {
    max_color_attachments: u32,
    /// `glPolygonOffsetClamp` is core only since 4.6
    has_polygon_offset_clamp: bool,
    bindings: BindingCache,
}

impl GlDriver {
    /// Load the GL entry points through `loader` and check the context
    ///
    /// `loader` resolves a function name such as `"glCreateBuffers"` to its
    /// address in the current context (e.g. `glutin`'s `get_proc_address`).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::ffi::c_void;
    /// use std::sync::{Arc, Mutex};
    /// use gpu_core::gpu::driver::SharedDriver;
    /// use gpu_core::gpu::{GpuConfig, GpuContext, Result};
    /// use gpu_core_driver_gl::GlDriver;
    ///
    /// fn create_context(loader: impl FnMut(&'static str) -> *const c_void) -> Result<GpuContext> {
    ///     let driver: SharedDriver = Arc::new(Mutex::new(GlDriver::new(loader)?));
    ///     GpuContext::new(driver, GpuConfig::default().with_reversed_depth(true))
    /// }
    /// ```
    pub fn new<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        if !gl::GetIntegerv::is_loaded() || !gl::GetString::is_loaded() {
            engine_error!(SOURCE, "No OpenGL context: glGetIntegerv could not be loaded");
            return Err(Error::InitializationFailed("OpenGL entry points could not be loaded".to_string()));
        }

        let version = unsafe { (get_integer(gl::MAJOR_VERSION), get_integer(gl::MINOR_VERSION)) };
        if version < REQUIRED_VERSION {
            engine_error!(
                SOURCE,
                "OpenGL {}.{} found, {}.{} required",
                version.0, version.1, REQUIRED_VERSION.0, REQUIRED_VERSION.1
            );
            return Err(Error::InitializationFailed(format!(
                "OpenGL {}.{} is not supported, {}.{} required",
                version.0, version.1, REQUIRED_VERSION.0, REQUIRED_VERSION.1
            )));
        }

        if let Some((name, _)) = REQUIRED_FUNCTIONS.iter().find(|(_, is_loaded)| !is_loaded()) {
            engine_error!(SOURCE, "Required function {} is missing", name);
            return Err(Error::InitializationFailed(format!("OpenGL function {} is missing", name)));
        }

        let has_polygon_offset_clamp = gl::PolygonOffsetClamp::is_loaded();
        if !has_polygon_offset_clamp {
            engine_warn!(SOURCE, "glPolygonOffsetClamp unavailable, depth bias clamp is ignored");
        }

        let max_color_attachments = unsafe { get_integer(gl::MAX_COLOR_ATTACHMENTS) }.max(1) as u32;

        engine_info!(
            SOURCE,
            "OpenGL {} on {}",
            unsafe { get_string(gl::VERSION) },
            unsafe { get_string(gl::RENDERER) }
        );
        engine_debug!(SOURCE, "Max color attachments: {}", max_color_attachments);

        Ok(Self {
            max_color_attachments,
            has_polygon_offset_clamp,
            bindings: BindingCache::default(),
        })
    }
}

// ===== Query helpers =====

unsafe fn get_integer(pname: GLenum) -> GLint {
    let mut value = 0;
    gl::GetIntegerv(pname, &mut value);
    value
}

unsafe fn get_string(name: GLenum) -> String {
    let raw = gl::GetString(name);
    if raw.is_null() {
        return String::from("<unknown>");
    }
    CStr::from_ptr(raw as *const std::ffi::c_char).to_string_lossy().into_owned()
}

/// Read an info log of `length` bytes (terminator included) through `fetch`
fn read_info_log(length: GLint, fetch: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    if length <= 0 {
        return String::new();
    }
    let mut buffer = vec![0u8; length as usize];
    let mut written: GLsizei = 0;
    fetch(length, &mut written as *mut GLsizei, buffer.as_mut_ptr() as *mut GLchar);
    buffer.truncate(written.clamp(0, length) as usize);
    String::from_utf8_lossy(&buffer).into_owned()
}

fn gl_bool(value: bool) -> GLboolean {
    if value { gl::TRUE } else { gl::FALSE }
}

impl GraphicsDriver for GlDriver {
    // ----- Limits and debugging -----

    fn max_color_attachments(&self) -> u32 {
        self.max_color_attachments
    }

    fn object_label(&mut self, kind: ObjectKind, handle: u32, label: &str) {
        unsafe {
            gl::ObjectLabel(
                translate::object_identifier(kind),
                handle,
                label.len() as GLsizei,
                label.as_ptr() as *const GLchar,
            );
        }
    }

    // ----- Buffers -----

    fn create_buffer(&mut self) -> u32 {
        let mut buffer = 0;
        unsafe { gl::CreateBuffers(1, &mut buffer) };
        buffer
    }

    fn buffer_storage(&mut self, buffer: u32, size: u64, data: Option<&[u8]>, flags: BufferCreationFlags) {
        let data = data.map_or(ptr::null(), |bytes| bytes.as_ptr() as *const c_void);
        unsafe {
            gl::NamedBufferStorage(buffer, size as GLsizeiptr, data, translate::buffer_storage_flags(flags));
        }
    }

    fn delete_buffer(&mut self, buffer: u32) {
        unsafe { gl::DeleteBuffers(1, &buffer) };
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) {
        unsafe { gl::BindBuffer(translate::buffer_target(target), buffer) };
    }

    fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, buffer: u32) {
        unsafe { gl::BindBufferBase(translate::buffer_target(target), index, buffer) };
    }

    fn buffer_sub_data(&mut self, buffer: u32, offset: u64, data: &[u8]) {
        unsafe {
            gl::NamedBufferSubData(
                buffer,
                offset as isize,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            );
        }
    }

    fn clear_buffer_sub_data(&mut self, buffer: u32, offset: u64, size: u64, value: u8) {
        unsafe {
            gl::ClearNamedBufferSubData(
                buffer,
                gl::R8UI,
                offset as isize,
                size as GLsizeiptr,
                gl::RED_INTEGER,
                gl::UNSIGNED_BYTE,
                &value as *const u8 as *const c_void,
            );
        }
    }

    fn map_buffer(&mut self, buffer: u32, access: MapAccess) -> *mut u8 {
        unsafe { gl::MapNamedBuffer(buffer, translate::map_access(access)) as *mut u8 }
    }

    fn unmap_buffer(&mut self, buffer: u32) -> bool {
        unsafe { gl::UnmapNamedBuffer(buffer) == gl::TRUE }
    }

    // ----- Shaders and programs -----

    fn create_shader(&mut self, stage: ShaderStageType) -> u32 {
        unsafe { gl::CreateShader(translate::shader_stage(stage)) }
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        let text = source.as_ptr() as *const GLchar;
        let length = source.len() as GLint;
        unsafe { gl::ShaderSource(shader, 1, &text, &length) };
    }

    fn compile_shader(&mut self, shader: u32) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let mut status = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let mut length = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut length) };
        read_info_log(length, |capacity, written, log| unsafe {
            gl::GetShaderInfoLog(shader, capacity, written, log)
        })
    }

    fn delete_shader(&mut self, shader: u32) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&mut self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn detach_shader(&mut self, program: u32, shader: u32) {
        unsafe { gl::DetachShader(program, shader) };
    }

    fn link_program(&mut self, program: u32) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_link_status(&self, program: u32) -> bool {
        let mut status = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: u32) -> String {
        let mut length = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut length) };
        read_info_log(length, |capacity, written, log| unsafe {
            gl::GetProgramInfoLog(program, capacity, written, log)
        })
    }

    fn delete_program(&mut self, program: u32) {
        unsafe { gl::DeleteProgram(program) };
        self.bindings.program_deleted(program);
    }

    fn use_program(&mut self, program: u32) {
        if self.bindings.bind_program(program) {
            unsafe { gl::UseProgram(program) };
        }
    }

    fn active_uniforms(&self, program: u32) -> Vec<ActiveUniform> {
        let (mut count, mut max_name_length) = (0, 0);
        unsafe {
            gl::GetProgramiv(program, gl::ACTIVE_UNIFORMS, &mut count);
            gl::GetProgramiv(program, gl::ACTIVE_UNIFORM_MAX_LENGTH, &mut max_name_length);
        }

        let mut uniforms = Vec::with_capacity(count.max(0) as usize);
        let mut name = vec![0u8; max_name_length.max(1) as usize];
        for index in 0..count.max(0) as GLuint {
            let (mut written, mut size, mut gl_type): (GLsizei, GLint, GLenum) = (0, 0, 0);
            let location = unsafe {
                gl::GetActiveUniform(
                    program,
                    index,
                    name.len() as GLsizei,
                    &mut written,
                    &mut size,
                    &mut gl_type,
                    name.as_mut_ptr() as *mut GLchar,
                );
                gl::GetUniformLocation(program, name.as_ptr() as *const GLchar)
            };
            let full_name = String::from_utf8_lossy(&name[..written.clamp(0, name.len() as GLsizei) as usize]);

            let Some(uniform_type) = translate::uniform_type(gl_type) else {
                engine_warn!(SOURCE, "Uniform '{}' of program {} has unsupported type 0x{:X}", full_name, program, gl_type);
                continue;
            };
            uniforms.push(ActiveUniform {
                name: translate::uniform_base_name(&full_name).to_string(),
                location,
                uniform_type,
                count: size.max(1) as u32,
            });
        }
        uniforms
    }

    fn program_uniform(&mut self, program: u32, location: i32, value: &UniformValue) {
        unsafe {
            match value {
                UniformValue::Bool(v) => gl::ProgramUniform1i(program, location, *v as GLint),
                UniformValue::Int(v) => gl::ProgramUniform1i(program, location, *v),
                UniformValue::UInt(v) => gl::ProgramUniform1ui(program, location, *v),
                UniformValue::Float(v) => gl::ProgramUniform1f(program, location, *v),
                UniformValue::Vec2(v) => gl::ProgramUniform2fv(program, location, 1, v.to_array().as_ptr()),
                UniformValue::Vec3(v) => gl::ProgramUniform3fv(program, location, 1, v.to_array().as_ptr()),
                UniformValue::Vec4(v) => gl::ProgramUniform4fv(program, location, 1, v.to_array().as_ptr()),
                UniformValue::IVec2(v) => gl::ProgramUniform2iv(program, location, 1, v.to_array().as_ptr()),
                UniformValue::IVec3(v) => gl::ProgramUniform3iv(program, location, 1, v.to_array().as_ptr()),
                UniformValue::IVec4(v) => gl::ProgramUniform4iv(program, location, 1, v.to_array().as_ptr()),
                UniformValue::UVec2(v) => gl::ProgramUniform2uiv(program, location, 1, v.to_array().as_ptr()),
                UniformValue::UVec3(v) => gl::ProgramUniform3uiv(program, location, 1, v.to_array().as_ptr()),
                UniformValue::UVec4(v) => gl::ProgramUniform4uiv(program, location, 1, v.to_array().as_ptr()),
                UniformValue::Mat2(m) => {
                    gl::ProgramUniformMatrix2fv(program, location, 1, gl::FALSE, m.to_cols_array().as_ptr())
                }
                UniformValue::Mat3(m) => {
                    gl::ProgramUniformMatrix3fv(program, location, 1, gl::FALSE, m.to_cols_array().as_ptr())
                }
                UniformValue::Mat4(m) => {
                    gl::ProgramUniformMatrix4fv(program, location, 1, gl::FALSE, m.to_cols_array().as_ptr())
                }
            }
        }
    }

    // ----- Textures -----

    fn create_texture(&mut self, desc: &TextureDesc) -> u32 {
        let format = translate::texture_internal_format(desc.format);
        let levels = desc.mip_levels.max(1) as GLsizei;
        let (width, height, depth) = (desc.width as GLsizei, desc.height as GLsizei, desc.depth_or_layers as GLsizei);

        let mut texture = 0;
        unsafe {
            gl::CreateTextures(translate::texture_target(desc.texture_type), 1, &mut texture);
            match desc.texture_type {
                TextureType::Tex1D => gl::TextureStorage1D(texture, levels, format, width),
                TextureType::Tex2D | TextureType::Cube => gl::TextureStorage2D(texture, levels, format, width, height),
                TextureType::Tex2DArray | TextureType::Tex3D => {
                    gl::TextureStorage3D(texture, levels, format, width, height, depth)
                }
            }
        }
        texture
    }

    fn delete_texture(&mut self, texture: u32) {
        unsafe { gl::DeleteTextures(1, &texture) };
    }

    // ----- Framebuffers -----

    fn create_framebuffer(&mut self) -> u32 {
        let mut framebuffer = 0;
        unsafe { gl::CreateFramebuffers(1, &mut framebuffer) };
        framebuffer
    }

    fn framebuffer_texture(&mut self, framebuffer: u32, attachment: AttachmentPoint, texture: u32, level: u32) {
        unsafe {
            gl::NamedFramebufferTexture(framebuffer, translate::attachment_point(attachment), texture, level as GLint);
        }
    }

    fn check_framebuffer_status(&self, framebuffer: u32) -> FramebufferStatus {
        let status = unsafe { gl::CheckNamedFramebufferStatus(framebuffer, gl::DRAW_FRAMEBUFFER) };
        translate::framebuffer_status(status)
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        unsafe { gl::DeleteFramebuffers(1, &framebuffer) };
        self.bindings.framebuffer_deleted(framebuffer);
    }

    fn bind_framebuffer(&mut self, framebuffer: u32) {
        if self.bindings.bind_framebuffer(framebuffer) {
            unsafe { gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer) };
        }
    }

    fn clear_framebuffer_color(&mut self, framebuffer: u32, draw_buffer: u32, color: [f32; 4]) {
        unsafe { gl::ClearNamedFramebufferfv(framebuffer, gl::COLOR, draw_buffer as GLint, color.as_ptr()) };
    }

    fn clear_framebuffer_depth(&mut self, framebuffer: u32, depth: f32) {
        unsafe { gl::ClearNamedFramebufferfv(framebuffer, gl::DEPTH, 0, &depth) };
    }

    fn clear_framebuffer_stencil(&mut self, framebuffer: u32, stencil: i32) {
        unsafe { gl::ClearNamedFramebufferiv(framebuffer, gl::STENCIL, 0, &stencil) };
    }

    fn clear_framebuffer_depth_stencil(&mut self, framebuffer: u32, depth: f32, stencil: i32) {
        unsafe { gl::ClearNamedFramebufferfi(framebuffer, gl::DEPTH_STENCIL, 0, depth, stencil) };
    }

    fn draw_buffers(&mut self, count: u32) {
        // The default framebuffer only accepts its own color buffers.
        if self.bindings.default_framebuffer_bound() {
            unsafe { gl::DrawBuffers(1, &gl::BACK) };
            return;
        }
        let buffers: Vec<GLenum> = (0..count).map(|index| gl::COLOR_ATTACHMENT0 + index).collect();
        unsafe { gl::DrawBuffers(buffers.len() as GLsizei, buffers.as_ptr()) };
    }

    // ----- Fixed-function state -----

    fn enable(&mut self, cap: Capability) {
        unsafe { gl::Enable(translate::capability(cap)) };
    }

    fn disable(&mut self, cap: Capability) {
        unsafe { gl::Disable(translate::capability(cap)) };
    }

    fn enable_indexed(&mut self, cap: Capability, index: u32) {
        unsafe { gl::Enablei(translate::capability(cap), index) };
    }

    fn disable_indexed(&mut self, cap: Capability, index: u32) {
        unsafe { gl::Disablei(translate::capability(cap), index) };
    }

    fn color_mask_indexed(&mut self, index: u32, mask: ColorComponentFlags) {
        unsafe {
            gl::ColorMaski(
                index,
                gl_bool(mask.contains(ColorComponentFlags::R)),
                gl_bool(mask.contains(ColorComponentFlags::G)),
                gl_bool(mask.contains(ColorComponentFlags::B)),
                gl_bool(mask.contains(ColorComponentFlags::A)),
            );
        }
    }

    fn blend_equation_separate_indexed(&mut self, index: u32, color_op: BlendOp, alpha_op: BlendOp) {
        unsafe { gl::BlendEquationSeparatei(index, translate::blend_op(color_op), translate::blend_op(alpha_op)) };
    }

    fn blend_func_separate_indexed(
        &mut self,
        index: u32,
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        unsafe {
            gl::BlendFuncSeparatei(
                index,
                translate::blend_factor(src_color),
                translate::blend_factor(dst_color),
                translate::blend_factor(src_alpha),
                translate::blend_factor(dst_alpha),
            );
        }
    }

    fn blend_color(&mut self, color: [f32; 4]) {
        unsafe { gl::BlendColor(color[0], color[1], color[2], color[3]) };
    }

    fn logic_op(&mut self, op: LogicOp) {
        unsafe { gl::LogicOp(translate::logic_op(op)) };
    }

    fn depth_mask(&mut self, write: bool) {
        unsafe { gl::DepthMask(gl_bool(write)) };
    }

    fn depth_func(&mut self, func: CompareFunc) {
        unsafe { gl::DepthFunc(translate::compare_func(func)) };
    }

    fn polygon_offset_clamp(&mut self, slope_factor: f32, constant_factor: f32, clamp: f32) {
        unsafe {
            if self.has_polygon_offset_clamp {
                gl::PolygonOffsetClamp(slope_factor, constant_factor, clamp);
            } else {
                gl::PolygonOffset(slope_factor, constant_factor);
            }
        }
    }

    fn polygon_mode(&mut self, mode: PolygonMode) {
        unsafe { gl::PolygonMode(gl::FRONT_AND_BACK, translate::polygon_mode(mode)) };
    }

    fn stencil_func_separate(&mut self, face: StencilFace, func: CompareFunc, reference: u8, mask: u8) {
        unsafe {
            gl::StencilFuncSeparate(
                translate::stencil_face(face),
                translate::compare_func(func),
                GLint::from(reference),
                GLuint::from(mask),
            );
        }
    }

    fn stencil_mask_separate(&mut self, face: StencilFace, mask: u8) {
        unsafe { gl::StencilMaskSeparate(translate::stencil_face(face), GLuint::from(mask)) };
    }

    fn stencil_op_separate(&mut self, face: StencilFace, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        unsafe {
            gl::StencilOpSeparate(
                translate::stencil_face(face),
                translate::stencil_op(fail),
                translate::stencil_op(depth_fail),
                translate::stencil_op(pass),
            );
        }
    }

    fn front_face(&mut self, face: FrontFace) {
        unsafe { gl::FrontFace(translate::front_face(face)) };
    }

    fn cull_face(&mut self, mode: CullMode) {
        unsafe {
            match translate::cull_face(mode) {
                Some(faces) => {
                    gl::Enable(gl::CULL_FACE);
                    gl::CullFace(faces);
                }
                None => gl::Disable(gl::CULL_FACE),
            }
        }
    }

    fn line_width(&mut self, width: f32) {
        unsafe { gl::LineWidth(width) };
    }

    fn clip_control(&mut self, origin: ClipOrigin, depth: ClipDepth) {
        unsafe { gl::ClipControl(translate::clip_origin(origin), translate::clip_depth(depth)) };
    }
}
