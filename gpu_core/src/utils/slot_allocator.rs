/// Allocates and recycles dense `u32` slot ids inside a fixed-capacity pool.
///
/// Id 0 is reserved as the invalid id, so the first allocation returns 1.
/// Freed ids are recycled on subsequent allocations (LIFO). There is no
/// generation counter: a recycled id is indistinguishable from the old one.
///
/// # Example
///
/// ```ignore
/// let mut alloc = SlotAllocator::new(4);
/// let a = alloc.alloc();  // Some(1)
/// let b = alloc.alloc();  // Some(2)
/// alloc.free(1);          // 1 is now available
/// let c = alloc.alloc();  // Some(1) (recycled)
/// let d = alloc.alloc();  // Some(3)
/// let e = alloc.alloc();  // None (capacity 4 holds ids 1..=3)
/// ```
pub struct SlotAllocator {
    free_list: Vec<u32>,
    next_id: u32,
    len: u32,
    capacity: u32,
}

impl SlotAllocator {
    /// Create an empty allocator handing out ids in `1..capacity`
    pub fn new(capacity: u32) -> Self {
        Self {
            free_list: Vec::new(),
            next_id: 1,
            len: 0,
            capacity,
        }
    }

    /// Allocate the next available id, or `None` once the pool is exhausted
    pub fn alloc(&mut self) -> Option<u32> {
        let id = match self.free_list.pop() {
            Some(id) => id,
            None if self.next_id < self.capacity => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
            None => return None,
        };
        self.len += 1;
        Some(id)
    }

    /// Return an id to the pool for reuse
    pub fn free(&mut self, id: u32) {
        debug_assert!(id != 0 && id < self.next_id, "freeing an unallocated slot: {}", id);
        debug_assert!(!self.free_list.contains(&id), "double free of slot: {}", id);
        self.len -= 1;
        self.free_list.push(id);
    }

    /// Whether `id` is currently handed out
    pub fn is_allocated(&self, id: u32) -> bool {
        id != 0 && id < self.next_id && !self.free_list.contains(&id)
    }

    /// Highest id ever allocated + 1.
    ///
    /// This is the minimum length the backing storage must have
    /// to be indexed by every allocated id.
    pub fn high_water_mark(&self) -> u32 {
        self.next_id
    }

    /// Number of currently allocated ids
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no ids are currently allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exclusive upper bound of the id range
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
