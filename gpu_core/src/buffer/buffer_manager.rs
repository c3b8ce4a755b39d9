/// Fixed-capacity pool of memory buffers
///
/// `register_buffer` hands out an id-tagged, not-yet-created slot; the caller
/// creates it through `buffer_mut(id).create(..)`. Storage grows lazily up to
/// the allocator's high-water mark, the id range itself is fixed.

use crate::buffer::{BufferId, MemoryBuffer, MAX_MEM_BUFFER_COUNT};
use crate::driver::SharedDriver;
use crate::utils::SlotAllocator;
use crate::{engine_assert, engine_assert_fail, engine_debug, engine_warn};

const SOURCE: &str = "gpu::BufferManager";

pub struct BufferManager {
    driver: SharedDriver,
    buffers: Vec<MemoryBuffer>,
    ids: SlotAllocator,
}

impl BufferManager {
    pub fn new(driver: SharedDriver) -> Self {
        engine_debug!(SOURCE, "Buffer manager initialized ({} slots)", MAX_MEM_BUFFER_COUNT - 1);
        Self {
            driver,
            buffers: Vec::new(),
            ids: SlotAllocator::new(MAX_MEM_BUFFER_COUNT),
        }
    }

    /// Reserve a slot and return its id
    ///
    /// The slot holds an invalid buffer tagged with the id.
    pub fn register_buffer(&mut self) -> BufferId {
        let Some(raw) = self.ids.alloc() else {
            engine_assert_fail!(SOURCE, "Memory buffer storage overflow ({} buffers)", self.ids.len());
        };
        let id = BufferId::from_raw(raw);

        let high_water_mark = self.ids.high_water_mark() as usize;
        if self.buffers.len() < high_water_mark {
            let driver = &self.driver;
            self.buffers.resize_with(high_water_mark, || MemoryBuffer::new(driver.clone()));
        }
        self.buffers[id.index()].set_id(id);
        id
    }

    /// Destroy the buffer (warning if it is still valid) and release its slot
    pub fn unregister_buffer(&mut self, id: BufferId) {
        self.assert_registered(id);

        let buffer = &mut self.buffers[id.index()];
        if buffer.is_valid() {
            engine_warn!(SOURCE, "Unregistering buffer {} while it is still valid", id);
        }
        buffer.destroy();
        buffer.set_id(BufferId::INVALID);
        self.ids.free(id.raw());
    }

    pub fn buffer(&self, id: BufferId) -> &MemoryBuffer {
        self.assert_registered(id);
        &self.buffers[id.index()]
    }

    pub fn buffer_mut(&mut self, id: BufferId) -> &mut MemoryBuffer {
        self.assert_registered(id);
        &mut self.buffers[id.index()]
    }

    pub fn is_registered(&self, id: BufferId) -> bool {
        id.is_valid() && self.ids.is_allocated(id.raw())
    }

    /// Number of registered slots
    pub fn len(&self) -> usize {
        self.ids.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Destroy every buffer and release every slot
    pub fn terminate(&mut self) {
        for buffer in &mut self.buffers {
            buffer.destroy();
        }
        self.buffers.clear();
        self.ids = SlotAllocator::new(MAX_MEM_BUFFER_COUNT);
        engine_debug!(SOURCE, "Buffer manager terminated");
    }

    fn assert_registered(&self, id: BufferId) {
        engine_assert!(self.is_registered(id), SOURCE, "Buffer id {} is not registered", id);
    }
}

impl Drop for BufferManager {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
#[path = "buffer_manager_tests.rs"]
mod tests;
