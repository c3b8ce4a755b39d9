/// Render target manager
///
/// Owns the engine's fixed set of role-named render-target textures and the
/// framebuffers built on them, all at one output size. A resize is a full
/// teardown and rebuild: texture storage is immutable once allocated.

use std::sync::{Arc, Mutex};

use crate::driver::SharedDriver;
use crate::error::Result;
use crate::event::{EventDispatcher, FramebufferResized};
use crate::target::{FrameBuffer, FrameBufferAttachment, FrameBufferCreateInfo, FrameBufferId};
use crate::texture::{Texture, Texture2DCreateInfo, TextureFormat, TextureId, TextureManager};
use crate::utils::lock;
use crate::{engine_assert, engine_assert_fail, engine_debug, engine_err, engine_info};

const SOURCE: &str = "gpu::RenderTargetManager";

const GBUFFER_FRAMEBUFFER_NAME: &str = "__GBUFFER_FRAMEBUFFER__";

/// Render-target texture role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderTargetId {
    GBufferAlbedo,
    GBufferNormal,
    GBufferSpecular,
    CommonDepth,
    #[default]
    Invalid,
}

impl RenderTargetId {
    pub const COUNT: usize = 4;

    /// Every named role, in storage order
    pub const ALL: [RenderTargetId; Self::COUNT] = [
        RenderTargetId::GBufferAlbedo,
        RenderTargetId::GBufferNormal,
        RenderTargetId::GBufferSpecular,
        RenderTargetId::CommonDepth,
    ];

    pub fn index(self) -> Option<usize> {
        match self {
            RenderTargetId::GBufferAlbedo => Some(0),
            RenderTargetId::GBufferNormal => Some(1),
            RenderTargetId::GBufferSpecular => Some(2),
            RenderTargetId::CommonDepth => Some(3),
            RenderTargetId::Invalid => None,
        }
    }

    /// Name of the backing texture in the texture manager
    pub fn texture_name(self) -> &'static str {
        match self {
            RenderTargetId::GBufferAlbedo => "__GBUFFER_ALBEDO__",
            RenderTargetId::GBufferNormal => "__GBUFFER_NORMAL__",
            RenderTargetId::GBufferSpecular => "__GBUFFER_SPECULAR__",
            RenderTargetId::CommonDepth => "__COMMON_DEPTH__",
            RenderTargetId::Invalid => "__INVALID__",
        }
    }

    pub fn format(self) -> TextureFormat {
        match self {
            RenderTargetId::GBufferAlbedo | RenderTargetId::GBufferSpecular | RenderTargetId::Invalid => {
                TextureFormat::R8G8B8A8_UNORM
            }
            RenderTargetId::GBufferNormal => TextureFormat::R16G16B16A16_SFLOAT,
            RenderTargetId::CommonDepth => TextureFormat::D32_SFLOAT,
        }
    }
}

pub struct RenderTargetManager {
    driver: SharedDriver,
    textures: Arc<Mutex<TextureManager>>,
    resize_events: flume::Receiver<FramebufferResized>,
    render_targets: [Option<TextureId>; RenderTargetId::COUNT],
    frame_buffers: Vec<FrameBuffer>,
    output_size: Option<(u32, u32)>,
}

impl RenderTargetManager {
    /// Create the manager and subscribe it to resize events
    ///
    /// Requiring the texture manager enforces the initialization order.
    /// Render targets are built on the first resize or `recreate_frame_buffers` call.
    pub fn new(
        driver: SharedDriver,
        textures: Arc<Mutex<TextureManager>>,
        resize_dispatcher: &mut EventDispatcher<FramebufferResized>,
    ) -> Self {
        let frame_buffers = FrameBufferId::NAMED.iter().map(|_| FrameBuffer::new(driver.clone())).collect();

        engine_debug!(SOURCE, "Render target manager initialized");
        Self {
            driver,
            textures,
            resize_events: resize_dispatcher.subscribe(),
            render_targets: [None; RenderTargetId::COUNT],
            frame_buffers,
            output_size: None,
        }
    }

    /// Drain pending resize events and rebuild once for the latest valid size
    ///
    /// Events with a zero dimension (minimized window) are ignored. Returns
    /// whether a rebuild happened. A failed rebuild is a fatal error: the
    /// previous render targets are already gone.
    pub fn process_events(&mut self) -> bool {
        let Some(latest) = self.resize_events.try_iter().filter(FramebufferResized::is_renderable).last() else {
            return false;
        };

        if let Err(err) = self.recreate_frame_buffers(latest.width, latest.height) {
            engine_assert_fail!(
                SOURCE,
                "Failed to rebuild render targets at {}x{}: {}",
                latest.width, latest.height, err
            );
        }
        true
    }

    /// Tear down and rebuild every render target and framebuffer at the given size
    ///
    /// # Errors
    ///
    /// Texture allocation or framebuffer creation failures. The manager is left
    /// with whatever was built before the failure; a later call starts over.
    pub fn recreate_frame_buffers(&mut self, width: u32, height: u32) -> Result<()> {
        self.clear_storage();

        let mut textures = lock(&self.textures);

        for role in RenderTargetId::ALL {
            let info = Texture2DCreateInfo::render_target(width, height, role.format());
            let id = textures.allocate_texture_2d(role.texture_name(), &info)?;
            if let Some(index) = role.index() {
                self.render_targets[index] = Some(id);
            }
        }

        // The common depth texture is exposed to passes but not attached to the G-buffer
        let attachments = [
            FrameBufferAttachment::color(allocated(&textures, &self.render_targets, RenderTargetId::GBufferAlbedo)?, 0),
            FrameBufferAttachment::color(allocated(&textures, &self.render_targets, RenderTargetId::GBufferNormal)?, 1),
            FrameBufferAttachment::color(allocated(&textures, &self.render_targets, RenderTargetId::GBufferSpecular)?, 2),
        ];
        let info = FrameBufferCreateInfo {
            id: FrameBufferId::GBuffer,
            attachments: &attachments,
            debug_name: GBUFFER_FRAMEBUFFER_NAME,
        };

        let index = Self::storage_index(FrameBufferId::GBuffer);
        self.frame_buffers[index].init(&info)?;
        drop(textures);

        self.output_size = Some((width, height));
        engine_info!(SOURCE, "Render targets rebuilt at {}x{}", width, height);
        Ok(())
    }

    /// Texture backing a render-target role
    pub fn render_target(&self, id: RenderTargetId) -> TextureId {
        let Some(index) = id.index() else {
            engine_assert_fail!(SOURCE, "Invalid render target id");
        };
        let Some(texture) = self.render_targets[index] else {
            engine_assert_fail!(SOURCE, "Render target '{}' is not allocated", id.texture_name());
        };
        texture
    }

    /// Engine-owned framebuffer for a named role
    pub fn frame_buffer(&self, id: FrameBufferId) -> &FrameBuffer {
        &self.frame_buffers[Self::storage_index(id)]
    }

    /// Size of the current render targets, `None` before the first build
    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.output_size
    }

    /// `Default` is always valid, `Invalid` never is
    pub fn is_frame_buffer_valid(&self, id: FrameBufferId) -> bool {
        match id {
            FrameBufferId::Default => true,
            FrameBufferId::Invalid => false,
            named => self.frame_buffer(named).is_valid(),
        }
    }

    /// Number of color attachments written by draws into the role
    pub fn color_attachment_count(&self, id: FrameBufferId) -> u32 {
        match id {
            FrameBufferId::Default => 1,
            named => self.frame_buffer(named).color_attachment_count(),
        }
    }

    pub fn bind_frame_buffer(&self, id: FrameBufferId) {
        if id == FrameBufferId::Default {
            lock(&self.driver).bind_framebuffer(0);
            return;
        }
        self.frame_buffer(id).bind();
    }

    // ===== Clears =====
    //
    // Named roles skip attachment kinds they do not have. The default
    // framebuffer always has one color buffer plus depth and stencil.

    /// Clear all color attachments, depth and stencil
    pub fn clear_frame_buffer(&self, id: FrameBufferId, color: [f32; 4], depth: f32, stencil: i32) {
        if id == FrameBufferId::Default {
            let mut driver = lock(&self.driver);
            driver.clear_framebuffer_color(0, 0, color);
            driver.clear_framebuffer_depth_stencil(0, depth, stencil);
            return;
        }
        self.frame_buffer(id).clear(color, depth, stencil);
    }

    pub fn clear_frame_buffer_color(&self, id: FrameBufferId, index: u32, color: [f32; 4]) {
        if id == FrameBufferId::Default {
            lock(&self.driver).clear_framebuffer_color(0, index, color);
            return;
        }
        self.frame_buffer(id).clear_color(index, color);
    }

    pub fn clear_frame_buffer_depth(&self, id: FrameBufferId, depth: f32) {
        if id == FrameBufferId::Default {
            lock(&self.driver).clear_framebuffer_depth(0, depth);
            return;
        }
        self.frame_buffer(id).clear_depth(depth);
    }

    pub fn clear_frame_buffer_stencil(&self, id: FrameBufferId, stencil: i32) {
        if id == FrameBufferId::Default {
            lock(&self.driver).clear_framebuffer_stencil(0, stencil);
            return;
        }
        self.frame_buffer(id).clear_stencil(stencil);
    }

    pub fn clear_frame_buffer_depth_stencil(&self, id: FrameBufferId, depth: f32, stencil: i32) {
        if id == FrameBufferId::Default {
            lock(&self.driver).clear_framebuffer_depth_stencil(0, depth, stencil);
            return;
        }
        self.frame_buffer(id).clear_depth_stencil(depth, stencil);
    }

    /// Release every render-target texture and framebuffer
    pub fn terminate(&mut self) {
        self.clear_storage();
        engine_debug!(SOURCE, "Render target manager terminated");
    }

    fn clear_storage(&mut self) {
        for frame_buffer in &mut self.frame_buffers {
            frame_buffer.destroy();
        }

        let mut textures = lock(&self.textures);
        for (role, slot) in RenderTargetId::ALL.iter().zip(self.render_targets.iter_mut()) {
            if slot.take().is_some() {
                textures.deallocate_texture(role.texture_name());
            }
        }
        self.output_size = None;
    }

    fn storage_index(id: FrameBufferId) -> usize {
        let Some(index) = id.index() else {
            engine_assert_fail!(SOURCE, "Invalid frame buffer id {:?}", id);
        };
        index
    }
}

/// Texture currently backing `role`
fn allocated<'t>(
    textures: &'t TextureManager,
    render_targets: &[Option<TextureId>],
    role: RenderTargetId,
) -> Result<&'t Texture> {
    role.index()
        .and_then(|index| render_targets[index])
        .and_then(|id| textures.texture(id))
        .ok_or_else(|| engine_err!(SOURCE, "Render target '{}' was not allocated", role.texture_name()))
}

impl Drop for RenderTargetManager {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
#[path = "render_target_manager_tests.rs"]
mod tests;
