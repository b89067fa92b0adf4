//! Page lifecycle events as seen by the tracker.
//!
//! A host (browser glue, a server-side renderer, a test harness) implements
//! [`LifecycleEvents`] and forwards three kinds of events:
//!
//! - `Suspend`: the page stopped being visible (tab switched, app backgrounded).
//! - `Teardown`: the page is about to be unloaded.
//! - `Scroll`: the viewport moved; carries the measurements needed for depth.
//!
//! [`EventHub`] is a ready-made in-process implementation.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleEvent {
    Suspend,
    Teardown,
    Scroll(ScrollMetrics),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEventKind {
    Suspend,
    Teardown,
    Scroll,
}

impl LifecycleEvent {
    pub fn kind(&self) -> LifecycleEventKind {
        match self {
            LifecycleEvent::Suspend => LifecycleEventKind::Suspend,
            LifecycleEvent::Teardown => LifecycleEventKind::Teardown,
            LifecycleEvent::Scroll(_) => LifecycleEventKind::Scroll,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Arc<dyn Fn(&LifecycleEvent) + Send + Sync>;

pub trait LifecycleEvents: Send + Sync {
    fn add_listener(&self, kind: LifecycleEventKind, listener: Listener) -> ListenerId;

    /// Returns `false` if the listener was already removed.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

struct Registration {
    id: ListenerId,
    kind: LifecycleEventKind,
    listener: Listener,
}

/// Synchronous event dispatcher.
///
/// Listeners run on the emitting thread, outside the registry lock, so a
/// listener may add or remove listeners (including itself) while handling.
#[derive(Default)]
pub struct EventHub {
    next_id: AtomicU64,
    registrations: Mutex<Vec<Registration>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn registrations(&self) -> MutexGuard<'_, Vec<Registration>> {
        match self.registrations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn emit(&self, event: LifecycleEvent) {
        let kind = event.kind();
        let targets: Vec<Listener> = self
            .registrations()
            .iter()
            .filter(|registration| registration.kind == kind)
            .map(|registration| registration.listener.clone())
            .collect();

        for listener in targets {
            listener(&event);
        }
    }

    pub fn scroll(&self, scroll_top: f64, document_height: f64, viewport_height: f64) {
        self.emit(LifecycleEvent::Scroll(ScrollMetrics {
            scroll_top,
            document_height,
            viewport_height,
        }));
    }

    pub fn listener_count(&self, kind: LifecycleEventKind) -> usize {
        self.registrations()
            .iter()
            .filter(|registration| registration.kind == kind)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.registrations().len()
    }
}

impl LifecycleEvents for EventHub {
    fn add_listener(&self, kind: LifecycleEventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations().push(Registration { id, kind, listener });
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        registrations.len() != before
    }
}
