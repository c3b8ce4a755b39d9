/// Framebuffer objects bound to a named role
///
/// A framebuffer is built from a list of 2D texture attachments that share
/// one size. Resource problems (invalid or non-2D textures, mismatched sizes,
/// an incomplete result) are recoverable and leave the object invalid; a
/// malformed create-info is a contract violation.

use crate::driver::{AttachmentPoint, FramebufferStatus, GraphicsDriver, SharedDriver};
use crate::error::{Error, Result};
use crate::texture::Texture;
use crate::utils::lock;
use crate::{engine_assert, engine_assert_fail, engine_debug, engine_error, engine_warn};

const SOURCE: &str = "gpu::RenderTargetManager";

/// Framebuffer role
///
/// `Default` is the backend's window framebuffer (native handle 0) and is
/// never created by the engine. `Invalid` is the sentinel of unset fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameBufferId {
    Default,
    GBuffer,
    #[default]
    Invalid,
}

impl FrameBufferId {
    /// Number of engine-owned roles
    pub const COUNT: usize = 1;

    /// Every engine-owned role, in storage order
    pub const NAMED: [FrameBufferId; Self::COUNT] = [FrameBufferId::GBuffer];

    /// Storage index of an engine-owned role
    pub fn index(self) -> Option<usize> {
        match self {
            FrameBufferId::GBuffer => Some(0),
            FrameBufferId::Default | FrameBufferId::Invalid => None,
        }
    }

    /// Whether the role is owned by the engine (neither `Default` nor `Invalid`)
    pub fn is_named(self) -> bool {
        self.index().is_some()
    }
}

/// Attachment kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentType {
    Color,
    Depth,
    Stencil,
    DepthStencil,
}

/// One texture attached to a framebuffer
#[derive(Debug, Clone, Copy)]
pub struct FrameBufferAttachment<'a> {
    pub texture: &'a Texture,
    pub attachment_type: AttachmentType,
    /// Color attachment slot, ignored for other kinds
    pub index: u32,
}

impl<'a> FrameBufferAttachment<'a> {
    pub fn color(texture: &'a Texture, index: u32) -> Self {
        Self { texture, attachment_type: AttachmentType::Color, index }
    }

    pub fn depth(texture: &'a Texture) -> Self {
        Self { texture, attachment_type: AttachmentType::Depth, index: 0 }
    }

    pub fn stencil(texture: &'a Texture) -> Self {
        Self { texture, attachment_type: AttachmentType::Stencil, index: 0 }
    }

    pub fn depth_stencil(texture: &'a Texture) -> Self {
        Self { texture, attachment_type: AttachmentType::DepthStencil, index: 0 }
    }

    fn attachment_point(&self) -> AttachmentPoint {
        match self.attachment_type {
            AttachmentType::Color => AttachmentPoint::Color(self.index),
            AttachmentType::Depth => AttachmentPoint::Depth,
            AttachmentType::Stencil => AttachmentPoint::Stencil,
            AttachmentType::DepthStencil => AttachmentPoint::DepthStencil,
        }
    }
}

/// Framebuffer description
#[derive(Debug, Clone, Copy)]
pub struct FrameBufferCreateInfo<'a> {
    pub id: FrameBufferId,
    pub attachments: &'a [FrameBufferAttachment<'a>],
    pub debug_name: &'a str,
}

/// Attachment record kept for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentInfo {
    pub texture_name: String,
    pub attachment_type: AttachmentType,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AttachmentCounts {
    color: u32,
    depth: u32,
    stencil: u32,
}

pub struct FrameBuffer {
    driver: SharedDriver,
    id: FrameBufferId,
    handle: u32,
    counts: AttachmentCounts,
    width: u32,
    height: u32,
    #[cfg(debug_assertions)]
    debug_name: String,
    #[cfg(debug_assertions)]
    attachments: Vec<AttachmentInfo>,
}

impl FrameBuffer {
    pub fn new(driver: SharedDriver) -> Self {
        Self {
            driver,
            id: FrameBufferId::Invalid,
            handle: 0,
            counts: AttachmentCounts::default(),
            width: 0,
            height: 0,
            #[cfg(debug_assertions)]
            debug_name: String::new(),
            #[cfg(debug_assertions)]
            attachments: Vec::new(),
        }
    }

    /// Build the framebuffer, warning if it is already valid
    pub fn init(&mut self, info: &FrameBufferCreateInfo) -> Result<()> {
        if self.is_valid() {
            if self.debug_name() != info.debug_name {
                engine_warn!(SOURCE, "Reinitializing frame buffer '{}' as '{}'", self.debug_name(), info.debug_name);
            } else {
                engine_warn!(SOURCE, "Reinitializing frame buffer '{}'", info.debug_name);
            }
        }
        self.recreate(info)
    }

    /// Destroy any previous native object and build a new one
    ///
    /// # Errors
    ///
    /// `InvalidResource` if an attachment texture is invalid, not 2D, or
    /// differs in size from the first attachment; no native object is created.
    /// `FramebufferIncomplete` if the driver rejects the result.
    pub fn recreate(&mut self, info: &FrameBufferCreateInfo) -> Result<()> {
        let max_color_attachments = lock(&self.driver).max_color_attachments();

        engine_assert!(info.id.is_named(), SOURCE, "Frame buffer '{}' has no named role ({:?})", info.debug_name, info.id);
        engine_assert!(
            !info.attachments.is_empty() && info.attachments.len() <= max_color_attachments as usize,
            SOURCE,
            "Frame buffer '{}' has {} attachment(s), expected 1 to {}",
            info.debug_name, info.attachments.len(), max_color_attachments
        );
        for attachment in info.attachments {
            if attachment.attachment_type == AttachmentType::Color {
                engine_assert!(
                    attachment.index < max_color_attachments,
                    SOURCE,
                    "Color attachment index {} of frame buffer '{}' exceeds the limit of {}",
                    attachment.index, info.debug_name, max_color_attachments
                );
            }
        }

        self.destroy();

        let (width, height) = validate_attachments(info)?;

        let mut counts = AttachmentCounts::default();
        for attachment in info.attachments {
            match attachment.attachment_type {
                AttachmentType::Color => counts.color += 1,
                AttachmentType::Depth => counts.depth = 1,
                AttachmentType::Stencil => counts.stencil = 1,
                AttachmentType::DepthStencil => {
                    counts.depth = 1;
                    counts.stencil = 1;
                }
            }
        }

        let mut guard = lock(&self.driver);
        let driver: &mut dyn GraphicsDriver = &mut *guard;

        let handle = driver.create_framebuffer();
        for attachment in info.attachments {
            driver.framebuffer_texture(handle, attachment.attachment_point(), attachment.texture.native_handle(), 0);
        }

        let status = driver.check_framebuffer_status(handle);
        if status != FramebufferStatus::Complete {
            driver.delete_framebuffer(handle);
            drop(guard);

            let Some(reason) = status.failure_reason() else {
                engine_assert_fail!(SOURCE, "Unknown status {:?} for frame buffer '{}'", status, info.debug_name);
            };
            engine_error!(SOURCE, "Frame buffer '{}' is incomplete: {}", info.debug_name, reason);
            return Err(Error::FramebufferIncomplete(format!("'{}': {}", info.debug_name, reason)));
        }
        drop(guard);

        self.id = info.id;
        self.handle = handle;
        self.counts = counts;
        self.width = width;
        self.height = height;
        self.record_debug_info(info);

        engine_debug!(
            SOURCE,
            "Frame buffer '{}' created ({}x{}, {} color, {} depth, {} stencil)",
            info.debug_name, width, height, counts.color, counts.depth, counts.stencil
        );
        Ok(())
    }

    /// Delete the native object and reset every field; no-op if not valid
    pub fn destroy(&mut self) {
        if self.handle != 0 {
            lock(&self.driver).delete_framebuffer(self.handle);
        }

        self.id = FrameBufferId::Invalid;
        self.handle = 0;
        self.counts = AttachmentCounts::default();
        self.width = 0;
        self.height = 0;
        self.clear_debug_info();
    }

    pub fn bind(&self) {
        engine_assert!(self.is_valid(), SOURCE, "Binding invalid frame buffer '{}'", self.debug_name());
        lock(&self.driver).bind_framebuffer(self.handle);
    }

    // ===== Clears =====
    //
    // Attachment kinds the framebuffer does not have are skipped silently.

    /// Clear every color attachment, then depth and stencil
    pub fn clear(&self, color: [f32; 4], depth: f32, stencil: i32) {
        for index in 0..self.counts.color {
            self.clear_color(index, color);
        }

        if self.counts.depth > 0 && self.counts.stencil > 0 {
            self.clear_depth_stencil(depth, stencil);
            return;
        }
        self.clear_depth(depth);
        self.clear_stencil(stencil);
    }

    pub fn clear_color(&self, index: u32, color: [f32; 4]) {
        if index < self.counts.color {
            lock(&self.driver).clear_framebuffer_color(self.handle, index, color);
        }
    }

    pub fn clear_depth(&self, depth: f32) {
        if self.counts.depth > 0 {
            lock(&self.driver).clear_framebuffer_depth(self.handle, depth);
        }
    }

    pub fn clear_stencil(&self, stencil: i32) {
        if self.counts.stencil > 0 {
            lock(&self.driver).clear_framebuffer_stencil(self.handle, stencil);
        }
    }

    pub fn clear_depth_stencil(&self, depth: f32, stencil: i32) {
        if self.counts.depth > 0 && self.counts.stencil > 0 {
            lock(&self.driver).clear_framebuffer_depth_stencil(self.handle, depth, stencil);
        }
    }

    // ===== Accessors =====

    /// Nonzero native handle and a named role
    pub fn is_valid(&self) -> bool {
        self.handle != 0 && self.id.is_named()
    }

    pub fn id(&self) -> FrameBufferId {
        self.id
    }

    pub fn native_handle(&self) -> u32 {
        self.handle
    }

    pub fn color_attachment_count(&self) -> u32 {
        self.counts.color
    }

    pub fn depth_attachment_count(&self) -> u32 {
        self.counts.depth
    }

    pub fn stencil_attachment_count(&self) -> u32 {
        self.counts.stencil
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    // ===== Debug info =====

    #[cfg(debug_assertions)]
    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    /// Debug name, always empty in release builds
    #[cfg(not(debug_assertions))]
    pub fn debug_name(&self) -> &str {
        ""
    }

    #[cfg(debug_assertions)]
    pub fn attachments(&self) -> &[AttachmentInfo] {
        &self.attachments
    }

    /// Attachments of the current object, always empty in release builds
    #[cfg(not(debug_assertions))]
    pub fn attachments(&self) -> &[AttachmentInfo] {
        &[]
    }

    #[cfg(debug_assertions)]
    fn record_debug_info(&mut self, info: &FrameBufferCreateInfo) {
        self.debug_name = info.debug_name.to_string();
        self.attachments = info
            .attachments
            .iter()
            .map(|attachment| AttachmentInfo {
                texture_name: attachment.texture.name().to_string(),
                attachment_type: attachment.attachment_type,
                index: attachment.index,
            })
            .collect();

        if !self.debug_name.is_empty() {
            lock(&self.driver).object_label(crate::driver::ObjectKind::Framebuffer, self.handle, &self.debug_name);
        }
    }

    #[cfg(not(debug_assertions))]
    fn record_debug_info(&mut self, _info: &FrameBufferCreateInfo) {}

    #[cfg(debug_assertions)]
    fn clear_debug_info(&mut self) {
        self.debug_name.clear();
        self.attachments.clear();
    }

    #[cfg(not(debug_assertions))]
    fn clear_debug_info(&mut self) {}
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Check every attachment texture, returning the shared size
fn validate_attachments(info: &FrameBufferCreateInfo) -> Result<(u32, u32)> {
    let first = info.attachments[0].texture;
    let (width, height) = (first.width(), first.height());

    for (index, attachment) in info.attachments.iter().enumerate() {
        let texture = attachment.texture;
        let problem = if !texture.is_valid() {
            format!("attachment {} ('{}') is not a valid texture", index, texture.name())
        } else if !texture.is_2d() {
            format!("attachment {} ('{}') is {:?}, only 2D textures are supported", index, texture.name(), texture.texture_type())
        } else if texture.width() != width || texture.height() != height {
            format!(
                "attachment {} ('{}') is {}x{}, expected {}x{}",
                index, texture.name(), texture.width(), texture.height(), width, height
            )
        } else {
            continue;
        };

        engine_error!(SOURCE, "Frame buffer '{}': {}", info.debug_name, problem);
        return Err(Error::InvalidResource(format!("frame buffer '{}': {}", info.debug_name, problem)));
    }

    Ok((width, height))
}

#[cfg(test)]
#[path = "frame_buffer_tests.rs"]
mod tests;
