use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc, Mutex,
};

use crate::lifecycle::{LifecycleEvent, LifecycleEventKind, LifecycleEvents, ListenerId, ScrollMetrics};

/// Percentage of the scrollable range covered, or `None` when the document
/// does not scroll.
pub fn scroll_percent(metrics: &ScrollMetrics) -> Option<i64> {
    let scrollable = metrics.document_height - metrics.viewport_height;
    if scrollable.is_nan() || scrollable <= 0.0 {
        return None;
    }
    let pct = (metrics.scroll_top / scrollable * 100.0).round();
    pct.is_finite().then_some(pct as i64)
}

const MAX_DEPTH: u8 = 100;

/// Tracks the deepest scroll position reached while it is subscribed.
pub struct ScrollDepthMonitor {
    events: Arc<dyn LifecycleEvents>,
    listener: Mutex<Option<ListenerId>>,
    max_seen: Arc<AtomicI64>,
    cap: u8,
}

impl ScrollDepthMonitor {
    /// Subscribes to scroll events. `cap` bounds the value [`stop`] reports;
    /// sub-pixel rendering can push the raw ratio a little past 100. Caps
    /// above 100 are lowered to 100.
    ///
    /// [`stop`]: ScrollDepthMonitor::stop
    pub fn start(events: Arc<dyn LifecycleEvents>, cap: u8) -> Self {
        let max_seen = Arc::new(AtomicI64::new(0));
        let sink = max_seen.clone();
        let id = events.add_listener(
            LifecycleEventKind::Scroll,
            Arc::new(move |event: &LifecycleEvent| {
                if let LifecycleEvent::Scroll(metrics) = event {
                    if let Some(pct) = scroll_percent(metrics) {
                        sink.fetch_max(pct, Ordering::Relaxed);
                    }
                }
            }),
        );

        Self {
            events,
            listener: Mutex::new(Some(id)),
            max_seen,
            cap: cap.min(MAX_DEPTH),
        }
    }

    /// Deepest scroll so far, within `0..=cap`.
    pub fn current(&self) -> u8 {
        self.max_seen.load(Ordering::Relaxed).clamp(0, i64::from(self.cap)) as u8
    }

    /// Unsubscribes and returns the final depth. Further calls only re-read it.
    pub fn stop(&self) -> u8 {
        let id = match self.listener.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(id) = id {
            self.events.remove_listener(id);
        }
        self.current()
    }

    pub fn is_active(&self) -> bool {
        match self.listener.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}
