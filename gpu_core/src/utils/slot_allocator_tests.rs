use super::*;

// ============================================================================
// Basic allocation tests
// ============================================================================

#[test]
fn test_sequential_alloc_starts_at_one() {
    let mut alloc = SlotAllocator::new(16);
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(alloc.alloc(), Some(2));
    assert_eq!(alloc.alloc(), Some(3));
}

#[test]
fn test_new_is_empty() {
    let alloc = SlotAllocator::new(16);
    assert!(alloc.is_empty());
    assert_eq!(alloc.len(), 0);
    assert_eq!(alloc.high_water_mark(), 1);
    assert_eq!(alloc.capacity(), 16);
}

// ============================================================================
// Free and recycle tests
// ============================================================================

#[test]
fn test_free_and_recycle() {
    let mut alloc = SlotAllocator::new(16);
    let a = alloc.alloc().unwrap(); // 1
    let b = alloc.alloc().unwrap(); // 2
    alloc.free(a);
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(b, 2);
}

#[test]
fn test_free_multiple_recycle_lifo() {
    let mut alloc = SlotAllocator::new(16);
    let a = alloc.alloc().unwrap(); // 1
    let _b = alloc.alloc().unwrap(); // 2
    let c = alloc.alloc().unwrap(); // 3
    alloc.free(a);
    alloc.free(c);

    // Last freed = first recycled
    assert_eq!(alloc.alloc(), Some(3));
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(alloc.alloc(), Some(4));
}

#[test]
fn test_len_tracks_alloc_and_free() {
    let mut alloc = SlotAllocator::new(16);
    let a = alloc.alloc().unwrap();
    let _b = alloc.alloc().unwrap();
    assert_eq!(alloc.len(), 2);
    alloc.free(a);
    assert_eq!(alloc.len(), 1);
    assert_eq!(alloc.high_water_mark(), 3);
}

#[test]
fn test_is_allocated() {
    let mut alloc = SlotAllocator::new(16);
    let a = alloc.alloc().unwrap();
    assert!(alloc.is_allocated(a));
    assert!(!alloc.is_allocated(0));
    assert!(!alloc.is_allocated(5));
    alloc.free(a);
    assert!(!alloc.is_allocated(a));
}

// ============================================================================
// Capacity tests
// ============================================================================

#[test]
fn test_exhaustion_returns_none() {
    let mut alloc = SlotAllocator::new(3);
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(alloc.alloc(), Some(2));
    assert_eq!(alloc.alloc(), None);
    assert_eq!(alloc.len(), 2);
}

#[test]
fn test_recycle_after_exhaustion() {
    let mut alloc = SlotAllocator::new(3);
    alloc.alloc();
    let b = alloc.alloc().unwrap();
    assert_eq!(alloc.alloc(), None);
    alloc.free(b);
    assert_eq!(alloc.alloc(), Some(b));
}
