use super::*;
use crate::driver::mock_driver::MockDriver;
use crate::driver::ObjectKind;
use crate::gpu::Engine;
use crate::log::{LogEntry, LogSeverity, Logger};
use crate::texture::{TextureDesc, TextureFormat, TextureType};
use serial_test::serial;
use std::sync::{Arc, Mutex};

fn texture(name: &str, handle: u32, texture_type: TextureType, width: u32, height: u32, format: TextureFormat) -> Texture {
    Texture {
        name: name.to_string(),
        desc: TextureDesc {
            texture_type,
            width,
            height,
            depth_or_layers: 1,
            mip_levels: 1,
            format,
        },
        handle,
    }
}

fn color_texture(name: &str, handle: u32, width: u32, height: u32) -> Texture {
    texture(name, handle, TextureType::Tex2D, width, height, TextureFormat::R8G8B8A8_UNORM)
}

// ============================================================================
// Diagnostics capture
// ============================================================================

/// Logger keeping the entries of one source whose message names `tag`
///
/// Other unit tests log concurrently, so unrelated entries are dropped.
struct DiagnosticsLogger {
    source: &'static str,
    tag: &'static str,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for DiagnosticsLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source == self.source && entry.message.contains(self.tag) {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

fn capture_diagnostics(source: &'static str, tag: &'static str) -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(DiagnosticsLogger { source, tag, entries: entries.clone() });
    entries
}

fn logged_error_containing(entries: &Arc<Mutex<Vec<LogEntry>>>, text: &str) -> bool {
    entries
        .lock()
        .unwrap()
        .iter()
        .any(|entry| entry.severity == LogSeverity::Error && entry.message.contains(text))
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_create_counts_attachments() {
    let (mock, driver) = MockDriver::new_shared();
    let albedo = color_texture("albedo", 100, 640, 480);
    let normal = color_texture("normal", 101, 640, 480);
    let depth = texture("depth", 102, TextureType::Tex2D, 640, 480, TextureFormat::D32_SFLOAT);

    let attachments = [
        FrameBufferAttachment::color(&albedo, 0),
        FrameBufferAttachment::color(&normal, 1),
        FrameBufferAttachment::depth(&depth),
    ];
    let mut frame_buffer = FrameBuffer::new(driver);
    frame_buffer
        .init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "gbuffer" })
        .unwrap();

    assert!(frame_buffer.is_valid());
    assert_eq!(frame_buffer.id(), FrameBufferId::GBuffer);
    assert_eq!(frame_buffer.color_attachment_count(), 2);
    assert_eq!(frame_buffer.depth_attachment_count(), 1);
    assert_eq!(frame_buffer.stencil_attachment_count(), 0);
    assert_eq!((frame_buffer.width(), frame_buffer.height()), (640, 480));

    let handle = frame_buffer.native_handle();
    let mock = mock.lock().unwrap();
    assert!(mock.has_call(&format!("framebuffer_texture({}, Color(0), 100, 0)", handle)));
    assert!(mock.has_call(&format!("framebuffer_texture({}, Color(1), 101, 0)", handle)));
    assert!(mock.has_call(&format!("framebuffer_texture({}, Depth, 102, 0)", handle)));
    assert_eq!(mock.live_framebuffers(), 1);
}

#[test]
fn test_depth_stencil_attachment_counts_both() {
    let (_mock, driver) = MockDriver::new_shared();
    let color = color_texture("color", 10, 64, 64);
    let depth_stencil = texture("ds", 11, TextureType::Tex2D, 64, 64, TextureFormat::D24_UNORM_S8_UINT);

    let attachments = [FrameBufferAttachment::color(&color, 0), FrameBufferAttachment::depth_stencil(&depth_stencil)];
    let mut frame_buffer = FrameBuffer::new(driver);
    frame_buffer
        .recreate(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "" })
        .unwrap();

    assert_eq!(frame_buffer.depth_attachment_count(), 1);
    assert_eq!(frame_buffer.stencil_attachment_count(), 1);
}

#[test]
fn test_recreate_replaces_native_object() {
    let (mock, driver) = MockDriver::new_shared();
    let small = color_texture("small", 10, 32, 32);
    let large = color_texture("large", 11, 64, 64);

    let mut frame_buffer = FrameBuffer::new(driver);
    let first = [FrameBufferAttachment::color(&small, 0)];
    frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &first, debug_name: "fb" }).unwrap();
    let old_handle = frame_buffer.native_handle();

    let second = [FrameBufferAttachment::color(&large, 0)];
    frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &second, debug_name: "fb" }).unwrap();

    assert_ne!(frame_buffer.native_handle(), old_handle);
    assert_eq!(frame_buffer.width(), 64);
    let mock = mock.lock().unwrap();
    assert!(mock.has_call(&format!("delete_framebuffer({})", old_handle)));
    assert_eq!(mock.live_framebuffers(), 1);
}

#[cfg(debug_assertions)]
#[test]
fn test_debug_info_recorded() {
    let (mock, driver) = MockDriver::new_shared();
    let color = color_texture("albedo", 10, 16, 16);
    let attachments = [FrameBufferAttachment::color(&color, 0)];

    let mut frame_buffer = FrameBuffer::new(driver);
    frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "main" }).unwrap();

    assert_eq!(frame_buffer.debug_name(), "main");
    assert_eq!(
        frame_buffer.attachments(),
        &[AttachmentInfo { texture_name: "albedo".to_string(), attachment_type: AttachmentType::Color, index: 0 }]
    );
    let handle = frame_buffer.native_handle();
    assert_eq!(mock.lock().unwrap().label(ObjectKind::Framebuffer, handle), Some("main"));

    frame_buffer.destroy();
    assert_eq!(frame_buffer.debug_name(), "");
    assert!(frame_buffer.attachments().is_empty());
}

// ============================================================================
// Recoverable failures
// ============================================================================

#[test]
fn test_mismatched_sizes_leave_object_invalid() {
    let (mock, driver) = MockDriver::new_shared();
    let a = color_texture("a", 10, 640, 480);
    let b = color_texture("b", 11, 320, 240);
    let attachments = [FrameBufferAttachment::color(&a, 0), FrameBufferAttachment::color(&b, 1)];

    let mut frame_buffer = FrameBuffer::new(driver);
    let result = frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "bad" });

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert!(!frame_buffer.is_valid());
    assert_eq!(frame_buffer.native_handle(), 0);
    assert_eq!(frame_buffer.color_attachment_count(), 0);
    assert_eq!(frame_buffer.depth_attachment_count(), 0);
    assert_eq!(frame_buffer.stencil_attachment_count(), 0);
    assert_eq!(mock.lock().unwrap().count_calls("create_framebuffer"), 0);
}

#[test]
fn test_invalid_texture_is_rejected() {
    let (mock, driver) = MockDriver::new_shared();
    let released = color_texture("released", 0, 64, 64);
    let attachments = [FrameBufferAttachment::color(&released, 0)];

    let mut frame_buffer = FrameBuffer::new(driver);
    let result = frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "" });

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(mock.lock().unwrap().count_calls("create_framebuffer"), 0);
}

#[test]
fn test_non_2d_texture_is_rejected() {
    let (_mock, driver) = MockDriver::new_shared();
    let cube = texture("cube", 10, TextureType::Cube, 64, 64, TextureFormat::R8G8B8A8_UNORM);
    let attachments = [FrameBufferAttachment::color(&cube, 0)];

    let mut frame_buffer = FrameBuffer::new(driver);
    let result = frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "" });

    match result {
        Err(Error::InvalidResource(message)) => assert!(message.contains("only 2D")),
        _ => panic!("expected an invalid resource error"),
    }
    assert!(!frame_buffer.is_valid());
}

#[test]
fn test_incomplete_framebuffer_is_destroyed() {
    let (mock, driver) = MockDriver::new_shared();
    mock.lock().unwrap().framebuffer_status = FramebufferStatus::Unsupported;
    let color = color_texture("color", 10, 64, 64);
    let attachments = [FrameBufferAttachment::color(&color, 0)];

    let mut frame_buffer = FrameBuffer::new(driver);
    let result = frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "fb" });

    match result {
        Err(Error::FramebufferIncomplete(message)) => assert!(message.contains("not supported")),
        _ => panic!("expected an incomplete frame buffer error"),
    }
    assert!(!frame_buffer.is_valid());
    assert_eq!(frame_buffer.color_attachment_count(), 0);
    assert_eq!(mock.lock().unwrap().live_framebuffers(), 0);
}

#[test]
#[serial]
fn test_incompleteness_reason_is_reported() {
    let entries = capture_diagnostics("gpu::RenderTargetManager", "incomplete_reported");
    let (mock, driver) = MockDriver::new_shared();
    mock.lock().unwrap().framebuffer_status = FramebufferStatus::IncompleteMultisample;
    let color = color_texture("color", 10, 64, 64);
    let attachments = [FrameBufferAttachment::color(&color, 0)];

    let mut frame_buffer = FrameBuffer::new(driver);
    let result = frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "incomplete_reported" });
    Engine::reset_logger();

    assert!(matches!(result, Err(Error::FramebufferIncomplete(_))));
    assert!(logged_error_containing(&entries, "is incomplete"));
    assert!(logged_error_containing(&entries, "do not share the same sample count"));
}

#[test]
fn test_every_known_status_has_a_reason() {
    let statuses = [
        FramebufferStatus::Undefined,
        FramebufferStatus::IncompleteAttachment,
        FramebufferStatus::IncompleteMissingAttachment,
        FramebufferStatus::IncompleteDrawBuffer,
        FramebufferStatus::IncompleteReadBuffer,
        FramebufferStatus::Unsupported,
        FramebufferStatus::IncompleteMultisample,
        FramebufferStatus::IncompleteLayerTargets,
    ];
    let mut reasons: Vec<&str> = statuses.iter().filter_map(|s| s.failure_reason()).collect();
    reasons.sort_unstable();
    reasons.dedup();
    assert_eq!(reasons.len(), 8);
    assert!(FramebufferStatus::Complete.failure_reason().is_none());
}

// ============================================================================
// Contract violations
// ============================================================================

#[test]
#[should_panic(expected = "Unknown status")]
fn test_unknown_status_panics() {
    let (mock, driver) = MockDriver::new_shared();
    mock.lock().unwrap().framebuffer_status = FramebufferStatus::Unknown(0xdead);
    let color = color_texture("color", 10, 64, 64);
    let attachments = [FrameBufferAttachment::color(&color, 0)];

    let mut frame_buffer = FrameBuffer::new(driver);
    let _ = frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "" });
}

#[test]
#[should_panic(expected = "has no named role")]
fn test_unnamed_role_panics() {
    let (_mock, driver) = MockDriver::new_shared();
    let color = color_texture("color", 10, 64, 64);
    let attachments = [FrameBufferAttachment::color(&color, 0)];

    let mut frame_buffer = FrameBuffer::new(driver);
    let _ = frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::Default, attachments: &attachments, debug_name: "" });
}

#[test]
#[should_panic(expected = "expected 1 to")]
fn test_empty_attachment_list_panics() {
    let (_mock, driver) = MockDriver::new_shared();
    let mut frame_buffer = FrameBuffer::new(driver);
    let _ = frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &[], debug_name: "" });
}

#[test]
#[should_panic(expected = "exceeds the limit")]
fn test_color_index_over_limit_panics() {
    let (mock, driver) = MockDriver::new_shared();
    mock.lock().unwrap().max_color_attachments = 4;
    let color = color_texture("color", 10, 64, 64);
    let attachments = [FrameBufferAttachment::color(&color, 4)];

    let mut frame_buffer = FrameBuffer::new(driver);
    let _ = frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "" });
}

#[test]
#[should_panic(expected = "Binding invalid frame buffer")]
fn test_bind_invalid_panics() {
    let (_mock, driver) = MockDriver::new_shared();
    FrameBuffer::new(driver).bind();
}

// ============================================================================
// Clears
// ============================================================================

#[test]
fn test_depth_clear_without_depth_attachment_is_silent() {
    let (mock, driver) = MockDriver::new_shared();
    let color = color_texture("color", 10, 64, 64);
    let attachments = [FrameBufferAttachment::color(&color, 0)];
    let mut frame_buffer = FrameBuffer::new(driver);
    frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "" }).unwrap();
    mock.lock().unwrap().clear_calls();

    frame_buffer.clear_depth(1.0);
    frame_buffer.clear_stencil(0);
    frame_buffer.clear_depth_stencil(1.0, 0);
    frame_buffer.clear_color(3, [0.0; 4]);

    assert!(mock.lock().unwrap().calls.is_empty());
}

#[test]
fn test_full_clear_dispatches_by_attachment_kind() {
    let (mock, driver) = MockDriver::new_shared();
    let a = color_texture("a", 10, 64, 64);
    let b = color_texture("b", 11, 64, 64);
    let ds = texture("ds", 12, TextureType::Tex2D, 64, 64, TextureFormat::D24_UNORM_S8_UINT);
    let attachments = [
        FrameBufferAttachment::color(&a, 0),
        FrameBufferAttachment::color(&b, 1),
        FrameBufferAttachment::depth_stencil(&ds),
    ];
    let mut frame_buffer = FrameBuffer::new(driver);
    frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "" }).unwrap();
    let handle = frame_buffer.native_handle();
    mock.lock().unwrap().clear_calls();

    frame_buffer.clear([0.0, 0.0, 0.0, 1.0], 1.0, 0);

    let mock = mock.lock().unwrap();
    assert_eq!(mock.count_calls("clear_framebuffer_color"), 2);
    assert!(mock.has_call(&format!("clear_framebuffer_depth_stencil({}, 1, 0)", handle)));
    assert_eq!(mock.count_calls("clear_framebuffer_depth("), 0);
    assert_eq!(mock.count_calls("clear_framebuffer_stencil"), 0);
}

#[test]
fn test_drop_deletes_native_object() {
    let (mock, driver) = MockDriver::new_shared();
    let color = color_texture("color", 10, 64, 64);
    {
        let attachments = [FrameBufferAttachment::color(&color, 0)];
        let mut frame_buffer = FrameBuffer::new(driver);
        frame_buffer.init(&FrameBufferCreateInfo { id: FrameBufferId::GBuffer, attachments: &attachments, debug_name: "" }).unwrap();
    }
    assert_eq!(mock.lock().unwrap().live_framebuffers(), 0);
}
