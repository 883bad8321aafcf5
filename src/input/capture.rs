use crate::input::sample::PointerEvent;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Receiver of host pointer events.
pub trait PointerSink: Send + Sync {
    /// Handle one event. Returns `true` when the event was consumed.
    fn handle_pointer(&self, event: &PointerEvent) -> bool;
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    sinks: Vec<(u64, Arc<dyn PointerSink>)>,
}

/// Host-side fan-out of device callbacks to registered sinks.
///
/// Registrations are scoped: [`InputHub::subscribe`] returns a [`CaptureHandle`] that unregisters
/// the sink when stopped or dropped.
#[derive(Clone, Default)]
pub struct InputHub {
    inner: Arc<Mutex<HubInner>>,
}

impl std::fmt::Debug for InputHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputHub")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl InputHub {
    /// Hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sink` until the returned handle goes away.
    pub fn subscribe(&self, sink: Arc<dyn PointerSink>) -> CaptureHandle {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id = inner.next_id.wrapping_add(1);
        inner.sinks.push((id, sink));
        tracing::debug!(id, "pointer capture started");
        CaptureHandle {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every registered sink in registration order.
    ///
    /// Sinks run outside the hub lock, so a sink may subscribe or unsubscribe re-entrantly.
    pub fn dispatch(&self, event: &PointerEvent) -> bool {
        let sinks: Vec<Arc<dyn PointerSink>> = self
            .inner
            .lock()
            .sinks
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();
        let mut consumed = false;
        for sink in sinks {
            consumed |= sink.handle_pointer(event);
        }
        consumed
    }

    /// Number of live registrations.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().sinks.len()
    }
}

/// Registration returned by [`InputHub::subscribe`]. Unregisters on drop.
#[derive(Debug)]
#[must_use = "dropping the handle stops input capture"]
pub struct CaptureHandle {
    id: u64,
    hub: Weak<Mutex<HubInner>>,
}

impl CaptureHandle {
    /// Stop capturing now.
    pub fn stop(self) {}

    /// Return `true` while the registration is still held by a live hub.
    pub fn is_active(&self) -> bool {
        self.hub
            .upgrade()
            .is_some_and(|hub| hub.lock().sinks.iter().any(|(id, _)| *id == self.id))
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.lock().sinks.retain(|(id, _)| *id != self.id);
            tracing::debug!(id = self.id, "pointer capture stopped");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/capture.rs"]
mod tests;
