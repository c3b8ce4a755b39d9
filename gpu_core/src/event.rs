/// Event dispatch collaborator
///
/// A minimal publish/subscribe layer over `flume` channels. Each subscriber
/// owns an unbounded receiver and drains it at its own pace; publishing never
/// blocks. The only event the core consumes is `FramebufferResized`.

use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;

use crate::engine_trace;

const SOURCE: &str = "gpu::EventDispatcher";

/// Fan-out dispatcher for one event type
pub struct EventDispatcher<E: Clone> {
    subscribers: Vec<flume::Sender<E>>,
}

impl<E: Clone> EventDispatcher<E> {
    pub fn new() -> Self {
        Self { subscribers: Vec::new() }
    }

    /// Open a new subscription; dropping the receiver unsubscribes
    pub fn subscribe(&mut self) -> flume::Receiver<E> {
        let (sender, receiver) = flume::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Send `event` to every live subscriber
    ///
    /// Subscribers whose receiver was dropped are pruned.
    pub fn publish(&mut self, event: E) {
        let before = self.subscribers.len();
        self.subscribers.retain(|sender| sender.send(event.clone()).is_ok());

        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            engine_trace!(SOURCE, "Pruned {} disconnected subscriber(s)", pruned);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E: Clone> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// The output surface changed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferResized {
    pub width: u32,
    pub height: u32,
}

impl FramebufferResized {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Extract a resize from a window event, `None` for any other event
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::Resized(size) => Some(Self::from(*size)),
            _ => None,
        }
    }

    /// Both dimensions strictly positive
    pub fn is_renderable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl From<PhysicalSize<u32>> for FramebufferResized {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
