use super::*;
use crate::buffer::{BufferCreationFlags, BufferType, MemoryBufferCreateInfo};
use crate::driver::mock_driver::MockDriver;

fn vertex_info() -> MemoryBufferCreateInfo<'static> {
    MemoryBufferCreateInfo {
        data_size: 64,
        element_size: 16,
        buffer_type: BufferType::Vertex,
        creation_flags: BufferCreationFlags::empty(),
        data: None,
    }
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_register_returns_valid_tagged_slot() {
    let (_mock, driver) = MockDriver::new_shared();
    let mut manager = BufferManager::new(driver);

    let id = manager.register_buffer();
    assert!(id.is_valid());
    assert!(manager.is_registered(id));
    assert_eq!(manager.buffer(id).id(), id);
    assert!(!manager.buffer(id).is_valid());
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_register_ids_are_unique() {
    let (_mock, driver) = MockDriver::new_shared();
    let mut manager = BufferManager::new(driver);

    let a = manager.register_buffer();
    let b = manager.register_buffer();
    assert_ne!(a, b);
}

#[test]
fn test_unregister_recycles_id() {
    let (_mock, driver) = MockDriver::new_shared();
    let mut manager = BufferManager::new(driver);

    let a = manager.register_buffer();
    manager.unregister_buffer(a);
    assert!(!manager.is_registered(a));
    assert!(manager.is_empty());

    let b = manager.register_buffer();
    assert_eq!(a, b);
    assert_eq!(manager.buffer(b).id(), b);
}

#[test]
fn test_unregister_destroys_valid_buffer() {
    let (mock, driver) = MockDriver::new_shared();
    let mut manager = BufferManager::new(driver);

    let id = manager.register_buffer();
    manager.buffer_mut(id).create(&vertex_info());
    assert_eq!(mock.lock().unwrap().live_buffers(), 1);

    manager.unregister_buffer(id);
    assert_eq!(mock.lock().unwrap().live_buffers(), 0);
}

#[test]
#[should_panic(expected = "is not registered")]
fn test_access_unregistered_id_panics() {
    let (_mock, driver) = MockDriver::new_shared();
    let manager = BufferManager::new(driver);
    manager.buffer(BufferId::from_raw(5));
}

#[test]
#[should_panic(expected = "is not registered")]
fn test_double_unregister_panics() {
    let (_mock, driver) = MockDriver::new_shared();
    let mut manager = BufferManager::new(driver);
    let id = manager.register_buffer();
    manager.unregister_buffer(id);
    manager.unregister_buffer(id);
}

#[test]
#[should_panic(expected = "storage overflow")]
fn test_register_past_capacity_panics() {
    let (_mock, driver) = MockDriver::new_shared();
    let mut manager = BufferManager::new(driver);
    for _ in 0..MAX_MEM_BUFFER_COUNT {
        manager.register_buffer();
    }
}

// ============================================================================
// Termination
// ============================================================================

#[test]
fn test_terminate_destroys_all_buffers() {
    let (mock, driver) = MockDriver::new_shared();
    let mut manager = BufferManager::new(driver);

    for _ in 0..3 {
        let id = manager.register_buffer();
        manager.buffer_mut(id).create(&vertex_info());
    }
    assert_eq!(mock.lock().unwrap().live_buffers(), 3);

    manager.terminate();
    assert_eq!(mock.lock().unwrap().live_buffers(), 0);
    assert!(manager.is_empty());
}

#[test]
fn test_drop_destroys_all_buffers() {
    let (mock, driver) = MockDriver::new_shared();
    {
        let mut manager = BufferManager::new(driver);
        let id = manager.register_buffer();
        manager.buffer_mut(id).create(&vertex_info());
    }
    assert_eq!(mock.lock().unwrap().live_buffers(), 0);
}
