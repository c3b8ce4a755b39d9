/// Fixed-capacity pool of pipelines
///
/// Construction requires the render-target and shader managers, which is what
/// orders pipeline-manager initialization after both of them.

use std::sync::{Arc, Mutex};

use crate::config::GpuConfig;
use crate::driver::{ClipDepth, ClipOrigin, SharedDriver};
use crate::pipeline::{Pipeline, PipelineContext, PipelineId, MAX_PIPELINE_COUNT};
use crate::shader::ShaderManager;
use crate::target::RenderTargetManager;
use crate::utils::{lock, SlotAllocator};
use crate::{engine_assert, engine_assert_fail, engine_debug, engine_warn};

const SOURCE: &str = "gpu::PipelineManager";

pub struct PipelineManager {
    context: Arc<PipelineContext>,
    pipelines: Vec<Pipeline>,
    ids: SlotAllocator,
}

impl PipelineManager {
    pub fn new(
        driver: SharedDriver,
        render_targets: Arc<Mutex<RenderTargetManager>>,
        shaders: Arc<Mutex<ShaderManager>>,
        config: &GpuConfig,
    ) -> Self {
        if config.reversed_depth {
            lock(&driver).clip_control(ClipOrigin::LowerLeft, ClipDepth::ZeroToOne);
        }

        engine_debug!(
            SOURCE,
            "Pipeline manager initialized ({} slots, reversed depth: {})",
            MAX_PIPELINE_COUNT - 1, config.reversed_depth
        );
        Self {
            context: Arc::new(PipelineContext {
                driver,
                render_targets,
                shaders,
                reversed_depth: config.reversed_depth,
            }),
            pipelines: Vec::new(),
            ids: SlotAllocator::new(MAX_PIPELINE_COUNT),
        }
    }

    /// Reserve a slot and return its id
    ///
    /// The slot holds a not-yet-created pipeline tagged with the id; fill it
    /// through `pipeline_mut(id).create(..)`.
    pub fn register_pipeline(&mut self) -> PipelineId {
        let Some(raw) = self.ids.alloc() else {
            engine_assert_fail!(SOURCE, "Pipeline storage overflow ({} pipelines)", self.ids.len());
        };
        let id = PipelineId::from_raw(raw);

        let high_water_mark = self.ids.high_water_mark() as usize;
        if self.pipelines.len() < high_water_mark {
            let context = &self.context;
            self.pipelines.resize_with(high_water_mark, || Pipeline::new(context.clone()));
        }

        let pipeline = &mut self.pipelines[id.index()];
        engine_assert!(!pipeline.is_valid(), SOURCE, "Registration returned valid pipeline {}", id);
        pipeline.set_id(id);
        id
    }

    /// Destroy the pipeline (warning if it is still valid) and release its slot
    pub fn unregister_pipeline(&mut self, id: PipelineId) {
        self.assert_registered(id);

        let pipeline = &mut self.pipelines[id.index()];
        if pipeline.is_valid() {
            engine_warn!(SOURCE, "Unregistering pipeline {} while it is still valid", id);
        }
        pipeline.destroy();
        pipeline.set_id(PipelineId::INVALID);
        self.ids.free(id.raw());
    }

    pub fn pipeline(&self, id: PipelineId) -> &Pipeline {
        self.assert_registered(id);
        &self.pipelines[id.index()]
    }

    pub fn pipeline_mut(&mut self, id: PipelineId) -> &mut Pipeline {
        self.assert_registered(id);
        &mut self.pipelines[id.index()]
    }

    pub fn is_registered(&self, id: PipelineId) -> bool {
        id.is_valid() && self.ids.is_allocated(id.raw())
    }

    /// Number of registered slots
    pub fn len(&self) -> usize {
        self.ids.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop every pipeline and release every slot
    pub fn terminate(&mut self) {
        self.pipelines.clear();
        self.ids = SlotAllocator::new(MAX_PIPELINE_COUNT);
        engine_debug!(SOURCE, "Pipeline manager terminated");
    }

    fn assert_registered(&self, id: PipelineId) {
        engine_assert!(self.is_registered(id), SOURCE, "Pipeline id {} is not registered", id);
    }
}

impl Drop for PipelineManager {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
#[path = "pipeline_manager_tests.rs"]
mod tests;
