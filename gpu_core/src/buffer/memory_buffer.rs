/// Linear GPU memory buffer backed by immutable storage
///
/// A `MemoryBuffer` lives in a `BufferManager` slot. It starts out invalid,
/// becomes valid through `create`, and returns to the invalid state through
/// `destroy`. All preconditions are contract checks: a violation is a bug in
/// the caller and aborts through `engine_assert!`.

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use bitflags::bitflags;
use bytemuck::Pod;

use crate::driver::{BufferTarget, MapAccess, SharedDriver};
#[cfg(debug_assertions)]
use crate::driver::ObjectKind;
use crate::utils::{lock, slot_id};
use crate::{engine_assert, engine_trace, engine_warn};

const SOURCE: &str = "gpu::BufferManager";

/// Maximum number of memory buffers (id 0 is reserved)
pub const MAX_MEM_BUFFER_COUNT: u32 = 4096;

slot_id! {
    /// Dense slot id of a memory buffer
    BufferId, capacity = MAX_MEM_BUFFER_COUNT
}

bitflags! {
    /// Storage creation flags, fixed for the buffer's lifetime
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BufferCreationFlags: u32 {
        /// Contents can be updated after creation (sub-data uploads, write maps)
        const DYNAMIC_STORAGE = 1 << 0;
        /// Can be mapped for reading
        const READABLE = 1 << 1;
        /// Can be mapped for writing
        const WRITABLE = 1 << 2;
        /// Can stay mapped while the GPU uses it
        const PERSISTENT = 1 << 3;
        /// Persistent maps are coherent without explicit flushes
        const COHERENT = 1 << 4;
        /// Prefer client-side memory
        const CLIENT_STORAGE = 1 << 5;
    }
}

/// Buffer usage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferType {
    /// Unset (zero-initialized slot)
    #[default]
    Invalid,
    /// Vertex attribute data
    Vertex,
    /// Vertex indices
    Index,
    /// Constant (uniform) buffer, indexable
    Constant,
    /// Unordered access (shader storage) buffer, indexable
    UnorderedAccess,
}

impl BufferType {
    /// Binding target of the type, `None` for `Invalid`
    pub fn target(self) -> Option<BufferTarget> {
        match self {
            BufferType::Invalid => None,
            BufferType::Vertex => Some(BufferTarget::Array),
            BufferType::Index => Some(BufferTarget::ElementArray),
            BufferType::Constant => Some(BufferTarget::Uniform),
            BufferType::UnorderedAccess => Some(BufferTarget::ShaderStorage),
        }
    }

    /// Whether the type can be bound to an indexed binding point
    pub fn is_indexed(self) -> bool {
        self.target().is_some_and(BufferTarget::is_indexed)
    }
}

/// Descriptor for `MemoryBuffer::create`
#[derive(Debug, Clone, Copy)]
pub struct MemoryBufferCreateInfo<'a> {
    /// Total size in bytes, a nonzero multiple of `element_size`
    pub data_size: u64,
    /// Size of one element in bytes
    pub element_size: u64,
    pub buffer_type: BufferType,
    pub creation_flags: BufferCreationFlags,
    /// Initial contents, exactly `data_size` bytes when present
    pub data: Option<&'a [u8]>,
}

/// Linear memory buffer
pub struct MemoryBuffer {
    driver: SharedDriver,
    id: BufferId,
    size: u64,
    element_size: u64,
    buffer_type: BufferType,
    creation_flags: BufferCreationFlags,
    handle: u32,
    #[cfg(debug_assertions)]
    debug_name: String,
}

impl MemoryBuffer {
    pub(crate) fn new(driver: SharedDriver) -> Self {
        Self {
            driver,
            id: BufferId::INVALID,
            size: 0,
            element_size: 0,
            buffer_type: BufferType::Invalid,
            creation_flags: BufferCreationFlags::empty(),
            handle: 0,
            #[cfg(debug_assertions)]
            debug_name: String::new(),
        }
    }

    pub(crate) fn set_id(&mut self, id: BufferId) {
        self.id = id;
    }

    /// Allocate immutable storage described by `info`
    ///
    /// Every check runs before the driver is touched.
    pub fn create(&mut self, info: &MemoryBufferCreateInfo) {
        engine_assert!(!self.is_valid(), SOURCE, "Buffer {} is already created, destroy it first", self.id);
        engine_assert!(self.id.is_valid(), SOURCE, "Buffer slot id {} is invalid", self.id);
        engine_assert!(info.buffer_type != BufferType::Invalid, SOURCE, "Buffer {} has an invalid type", self.id);
        engine_assert!(info.data_size > 0, SOURCE, "Buffer {} data size is zero", self.id);
        engine_assert!(info.element_size > 0, SOURCE, "Buffer {} element size is zero", self.id);
        engine_assert!(
            info.data_size % info.element_size == 0,
            SOURCE,
            "Buffer {} data size {} is not a multiple of element size {}",
            self.id, info.data_size, info.element_size
        );
        if let Some(data) = info.data {
            engine_assert!(
                data.len() as u64 == info.data_size,
                SOURCE,
                "Buffer {} initial data is {} bytes, expected {}",
                self.id, data.len(), info.data_size
            );
        }

        let handle = {
            let mut driver = lock(&self.driver);
            let handle = driver.create_buffer();
            driver.buffer_storage(handle, info.data_size, info.data, info.creation_flags);
            handle
        };
        engine_assert!(handle != 0, SOURCE, "Driver failed to create buffer {}", self.id);

        self.handle = handle;
        self.size = info.data_size;
        self.element_size = info.element_size;
        self.buffer_type = info.buffer_type;
        self.creation_flags = info.creation_flags;
        self.apply_debug_label();

        engine_trace!(SOURCE, "Created buffer {} ({:?}, {} bytes)", self.id, self.buffer_type, self.size);
    }

    /// Release the native allocation and reset to the invalid state
    ///
    /// No-op on a buffer that is not valid.
    pub fn destroy(&mut self) {
        if !self.is_valid() {
            return;
        }
        lock(&self.driver).delete_buffer(self.handle);
        engine_trace!(SOURCE, "Destroyed buffer {}", self.id);

        self.handle = 0;
        self.size = 0;
        self.element_size = 0;
        self.buffer_type = BufferType::Invalid;
        self.creation_flags = BufferCreationFlags::empty();
        #[cfg(debug_assertions)]
        self.debug_name.clear();
    }

    /// Bind to the buffer type's target
    pub fn bind(&self) {
        engine_assert!(self.is_valid(), SOURCE, "Binding invalid buffer {}", self.id);
        if let Some(target) = self.buffer_type.target() {
            lock(&self.driver).bind_buffer(target, self.handle);
        }
    }

    /// Bind to an indexed binding point (constant and unordered-access buffers only)
    pub fn bind_indexed(&self, index: u32) {
        engine_assert!(self.is_valid(), SOURCE, "Binding invalid buffer {}", self.id);
        engine_assert!(
            self.buffer_type.is_indexed(),
            SOURCE,
            "Buffer {} of type {:?} cannot be bound to an indexed binding point",
            self.id, self.buffer_type
        );
        if let Some(target) = self.buffer_type.target() {
            lock(&self.driver).bind_buffer_base(target, index, self.handle);
        }
    }

    /// Upload `data` at byte `offset` (requires DYNAMIC_STORAGE)
    pub fn fill_subdata(&self, offset: u64, data: &[u8]) {
        engine_assert!(self.is_valid(), SOURCE, "Filling invalid buffer {}", self.id);
        engine_assert!(self.is_dynamic_storage(), SOURCE, "Buffer {} was not created with DYNAMIC_STORAGE", self.id);
        self.assert_range(offset, data.len() as u64);
        lock(&self.driver).buffer_sub_data(self.handle, offset, data);
    }

    /// Upload a slice of plain-old-data values at byte `offset`
    pub fn fill_subdata_pod<T: Pod>(&self, offset: u64, values: &[T]) {
        self.fill_subdata(offset, bytemuck::cast_slice(values));
    }

    /// Fill `size` bytes at `offset` with `value`
    pub fn clear(&self, offset: u64, size: u64, value: u8) {
        engine_assert!(self.is_valid(), SOURCE, "Clearing invalid buffer {}", self.id);
        self.assert_range(offset, size);
        lock(&self.driver).clear_buffer_sub_data(self.handle, offset, size, value);
    }

    /// Zero the whole buffer
    pub fn clear_all(&self) {
        self.clear(0, self.size, 0);
    }

    /// Map for reading (requires READABLE)
    ///
    /// The mapping covers the whole buffer and is released when the returned
    /// guard drops. Returns `None` if the driver refused the mapping.
    pub fn map_read(&mut self) -> Option<BufferMapping<'_>> {
        engine_assert!(self.is_valid(), SOURCE, "Mapping invalid buffer {}", self.id);
        engine_assert!(self.is_readable(), SOURCE, "Buffer {} was not created READABLE", self.id);
        self.map(MapAccess::Read).map(|mapping| BufferMapping { mapping })
    }

    /// Map for writing (requires DYNAMIC_STORAGE and WRITABLE)
    pub fn map_write(&mut self) -> Option<BufferMappingMut<'_>> {
        engine_assert!(self.is_valid(), SOURCE, "Mapping invalid buffer {}", self.id);
        engine_assert!(
            self.is_dynamic_storage() && self.is_writable(),
            SOURCE,
            "Buffer {} was not created DYNAMIC_STORAGE | WRITABLE",
            self.id
        );
        self.map(MapAccess::Write).map(|mapping| BufferMappingMut { mapping })
    }

    /// Map for reading and writing (requires DYNAMIC_STORAGE, WRITABLE and READABLE)
    pub fn map_read_write(&mut self) -> Option<BufferMappingMut<'_>> {
        engine_assert!(self.is_valid(), SOURCE, "Mapping invalid buffer {}", self.id);
        engine_assert!(
            self.is_dynamic_storage() && self.is_writable() && self.is_readable(),
            SOURCE,
            "Buffer {} was not created DYNAMIC_STORAGE | WRITABLE | READABLE",
            self.id
        );
        self.map(MapAccess::ReadWrite).map(|mapping| BufferMappingMut { mapping })
    }

    fn map(&mut self, access: MapAccess) -> Option<Mapping<'_>> {
        let len = usize::try_from(self.size).ok()?;
        let ptr = lock(&self.driver).map_buffer(self.handle, access);
        let ptr = NonNull::new(ptr)?;
        engine_trace!(SOURCE, "Mapped buffer {} ({:?})", self.id, access);
        Some(Mapping { buffer: self, ptr, len })
    }

    fn assert_range(&self, offset: u64, size: u64) {
        engine_assert!(
            offset.checked_add(size).is_some_and(|end| end <= self.size),
            SOURCE,
            "Range [{}, +{}) is out of buffer {} bounds ({} bytes)",
            offset, size, self.id, self.size
        );
    }

    // ===== Accessors =====

    /// Valid iff the id is valid, the type is set and a native buffer exists
    pub fn is_valid(&self) -> bool {
        self.id.is_valid() && self.buffer_type != BufferType::Invalid && self.handle != 0
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn element_size(&self) -> u64 {
        self.element_size
    }

    /// Number of elements, 0 for an invalid buffer
    pub fn element_count(&self) -> u64 {
        if self.element_size == 0 {
            0
        } else {
            self.size / self.element_size
        }
    }

    pub fn buffer_type(&self) -> BufferType {
        self.buffer_type
    }

    pub fn creation_flags(&self) -> BufferCreationFlags {
        self.creation_flags
    }

    pub fn native_handle(&self) -> u32 {
        self.handle
    }

    pub fn is_dynamic_storage(&self) -> bool {
        self.creation_flags.contains(BufferCreationFlags::DYNAMIC_STORAGE)
    }

    pub fn is_readable(&self) -> bool {
        self.creation_flags.contains(BufferCreationFlags::READABLE)
    }

    pub fn is_writable(&self) -> bool {
        self.creation_flags.contains(BufferCreationFlags::WRITABLE)
    }

    pub fn is_persistent(&self) -> bool {
        self.creation_flags.contains(BufferCreationFlags::PERSISTENT)
    }

    pub fn is_coherent(&self) -> bool {
        self.creation_flags.contains(BufferCreationFlags::COHERENT)
    }

    pub fn is_client_storage(&self) -> bool {
        self.creation_flags.contains(BufferCreationFlags::CLIENT_STORAGE)
    }

    // ===== Debug name =====

    /// Set the debug name and label the native buffer with it
    #[cfg(debug_assertions)]
    pub fn set_debug_name(&mut self, name: &str) {
        self.debug_name = name.to_string();
        self.apply_debug_label();
    }

    /// Set the debug name (compiled out in release builds)
    #[cfg(not(debug_assertions))]
    pub fn set_debug_name(&mut self, _name: &str) {}

    /// Debug name
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
    fn apply_debug_label(&self) {
        if self.handle != 0 && !self.debug_name.is_empty() {
            lock(&self.driver).object_label(ObjectKind::Buffer, self.handle, &self.debug_name);
        }
    }

    #[cfg(not(debug_assertions))]
    fn apply_debug_label(&self) {}
}

impl Drop for MemoryBuffer {
    fn drop(&mut self) {
        self.destroy();
    }
}

// ===== Mappings =====

/// Live native mapping of a whole buffer, unmapped on drop
struct Mapping<'a> {
    buffer: &'a MemoryBuffer,
    ptr: NonNull<u8>,
    len: usize,
}

impl Mapping<'_> {
    fn bytes(&self) -> &[u8] {
        // SAFETY: the driver mapped `len` bytes at `ptr`, and they stay mapped
        // until this value unmaps them. The exclusive borrow of the buffer
        // keeps it alive and prevents any other mapping meanwhile.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as in `bytes`, and `&mut self` makes this the only view.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    fn unmap(self) -> bool {
        let this = ManuallyDrop::new(self);
        this.release()
    }

    fn release(&self) -> bool {
        let intact = lock(&self.buffer.driver).unmap_buffer(self.buffer.handle);
        engine_trace!(SOURCE, "Unmapped buffer {}", self.buffer.id);
        intact
    }
}

impl Drop for Mapping<'_> {
    fn drop(&mut self) {
        if !self.release() {
            engine_warn!(SOURCE, "Contents of buffer {} were lost while mapped", self.buffer.id);
        }
    }
}

/// Read-only view of a mapped buffer
///
/// Dereferences to the buffer's `size()` bytes. The buffer is unmapped when
/// the view drops, or explicitly through `unmap`.
pub struct BufferMapping<'a> {
    mapping: Mapping<'a>,
}

impl BufferMapping<'_> {
    /// Unmap now, `false` if the driver reports the contents were lost
    pub fn unmap(self) -> bool {
        self.mapping.unmap()
    }
}

impl Deref for BufferMapping<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.mapping.bytes()
    }
}

/// Writable view of a mapped buffer
///
/// Same lifetime rules as `BufferMapping`. With a write-only mapping the
/// initial contents of the view are undefined.
pub struct BufferMappingMut<'a> {
    mapping: Mapping<'a>,
}

impl BufferMappingMut<'_> {
    /// Unmap now, `false` if the driver reports the contents were lost
    pub fn unmap(self) -> bool {
        self.mapping.unmap()
    }
}

impl Deref for BufferMappingMut<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.mapping.bytes()
    }
}

impl DerefMut for BufferMappingMut<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.mapping.bytes_mut()
    }
}

#[cfg(test)]
#[path = "memory_buffer_tests.rs"]
mod tests;
