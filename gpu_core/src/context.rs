/// GPU context
///
/// Owns the driver and every resource manager. Construction follows the
/// managers' dependency order (textures before render targets, render targets
/// and shaders before pipelines); field order makes teardown run the other way.

use std::sync::{Arc, Mutex};

use crate::buffer::BufferManager;
use crate::config::GpuConfig;
use crate::driver::SharedDriver;
use crate::error::Result;
use crate::event::{EventDispatcher, FramebufferResized};
use crate::pipeline::PipelineManager;
use crate::shader::ShaderManager;
use crate::target::RenderTargetManager;
use crate::texture::TextureManager;
use crate::utils::lock;
use crate::engine_info;

const SOURCE: &str = "gpu::GpuContext";

pub struct GpuContext {
    // Declared in teardown order
    pipelines: PipelineManager,
    render_targets: Arc<Mutex<RenderTargetManager>>,
    textures: Arc<Mutex<TextureManager>>,
    shaders: Arc<Mutex<ShaderManager>>,
    buffers: BufferManager,
    resize_dispatcher: EventDispatcher<FramebufferResized>,
    config: GpuConfig,
    driver: SharedDriver,
}

impl GpuContext {
    /// Build every manager over `driver`
    ///
    /// # Errors
    ///
    /// Fails only when `config.initial_output_size` is set and the initial
    /// render targets cannot be built.
    pub fn new(driver: SharedDriver, config: GpuConfig) -> Result<Self> {
        let buffers = BufferManager::new(driver.clone());
        let shaders = Arc::new(Mutex::new(ShaderManager::new(driver.clone())));
        let textures = Arc::new(Mutex::new(TextureManager::new(driver.clone())));

        let mut resize_dispatcher = EventDispatcher::new();
        let render_targets = Arc::new(Mutex::new(RenderTargetManager::new(
            driver.clone(),
            textures.clone(),
            &mut resize_dispatcher,
        )));

        if let Some((width, height)) = config.initial_output_size {
            lock(&render_targets).recreate_frame_buffers(width, height)?;
        }

        let pipelines = PipelineManager::new(driver.clone(), render_targets.clone(), shaders.clone(), &config);

        engine_info!(SOURCE, "GPU context initialized (reversed depth: {})", config.reversed_depth);
        Ok(Self {
            pipelines,
            render_targets,
            textures,
            shaders,
            buffers,
            resize_dispatcher,
            config,
            driver,
        })
    }

    pub fn driver(&self) -> &SharedDriver {
        &self.driver
    }

    pub fn config(&self) -> &GpuConfig {
        &self.config
    }

    pub fn buffers(&self) -> &BufferManager {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut BufferManager {
        &mut self.buffers
    }

    pub fn shaders(&self) -> &Arc<Mutex<ShaderManager>> {
        &self.shaders
    }

    pub fn textures(&self) -> &Arc<Mutex<TextureManager>> {
        &self.textures
    }

    pub fn render_targets(&self) -> &Arc<Mutex<RenderTargetManager>> {
        &self.render_targets
    }

    pub fn pipelines(&self) -> &PipelineManager {
        &self.pipelines
    }

    pub fn pipelines_mut(&mut self) -> &mut PipelineManager {
        &mut self.pipelines
    }

    /// Dispatcher other subsystems can subscribe to for resize notifications
    pub fn resize_dispatcher(&mut self) -> &mut EventDispatcher<FramebufferResized> {
        &mut self.resize_dispatcher
    }

    /// Queue a framebuffer resize; applied by the next `process_events`
    pub fn publish_framebuffer_resized(&mut self, width: u32, height: u32) {
        self.resize_dispatcher.publish(FramebufferResized::new(width, height));
    }

    /// Apply pending resize events, returns whether the render targets were rebuilt
    pub fn process_events(&mut self) -> bool {
        lock(&self.render_targets).process_events()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
