use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use crate::{
    classify::PageType,
    clock::{Clock, SystemClock},
    config::TrackerConfig,
    lifecycle::{LifecycleEvent, LifecycleEventKind, LifecycleEvents, ListenerId},
    models::PageViewRecord,
    session::{get_or_create_session_id, record_session_if_new, PageContext},
    sink::{self, AnalyticsSink},
    storage::TabStorage,
};

use super::{
    flush::{flush_page_view, PageVisit},
    scroll::ScrollDepthMonitor,
    FlushTrigger, TrackerState,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Process-wide tracker: configuration plus the host capabilities every page
/// instance shares. Built once at startup.
#[derive(Clone)]
pub struct Tracker {
    config: Arc<TrackerConfig>,
    sink: Arc<dyn AnalyticsSink>,
    storage: Arc<dyn TabStorage>,
    events: Arc<dyn LifecycleEvents>,
    clock: Arc<dyn Clock>,
}

impl Tracker {
    pub fn new(
        config: TrackerConfig,
        sink: Arc<dyn AnalyticsSink>,
        storage: Arc<dyn TabStorage>,
        events: Arc<dyn LifecycleEvents>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sink,
            storage,
            events,
            clock: Arc::new(SystemClock),
        }
    }

    /// Uses the REST sink when the config carries API credentials and the
    /// no-op sink otherwise.
    pub fn from_config(
        config: TrackerConfig,
        storage: Arc<dyn TabStorage>,
        events: Arc<dyn LifecycleEvents>,
    ) -> Self {
        let sink = sink::connect(&config);
        Self::new(config, sink, storage, events)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Starts tracking a freshly mounted page.
    pub fn mount(&self, page: PageContext) -> PageTracker {
        let session_id = get_or_create_session_id(self.storage.as_ref());
        let page_type = PageType::classify(&page.path);
        let entered_at = self.clock.now();
        let scroll = ScrollDepthMonitor::start(self.events.clone(), self.config.max_scroll_depth);

        record_session_if_new(
            self.storage.as_ref(),
            self.sink.as_ref(),
            &session_id,
            &page,
            &self.config.site_domain,
        );

        let mut state = TrackerState::new();
        state.mount();

        let instance = Arc::new(PageInstance {
            state: Mutex::new(state),
            visit: PageVisit {
                session_id,
                page_path: page.path,
                page_type,
                entered_at,
            },
            scroll,
            sink: self.sink.clone(),
            clock: self.clock.clone(),
            min_page_time: self.config.min_page_time(),
        });

        log_debug!(
            "Tracking {} ({}) for session {}",
            instance.visit.page_path,
            page_type.as_str(),
            instance.visit.session_id
        );

        let listeners = vec![
            self.subscribe(&instance, LifecycleEventKind::Suspend, FlushTrigger::Hidden),
            self.subscribe(&instance, LifecycleEventKind::Teardown, FlushTrigger::Teardown),
        ];

        PageTracker {
            instance,
            events: self.events.clone(),
            listeners,
        }
    }

    fn subscribe(
        &self,
        instance: &Arc<PageInstance>,
        kind: LifecycleEventKind,
        trigger: FlushTrigger,
    ) -> ListenerId {
        // Weak so the host's listener registry never keeps a page alive.
        let weak: Weak<PageInstance> = Arc::downgrade(instance);
        self.events.add_listener(
            kind,
            Arc::new(move |_event: &LifecycleEvent| {
                if let Some(instance) = weak.upgrade() {
                    instance.flush(trigger);
                }
            }),
        )
    }
}

struct PageInstance {
    state: Mutex<TrackerState>,
    visit: PageVisit,
    scroll: ScrollDepthMonitor,
    sink: Arc<dyn AnalyticsSink>,
    clock: Arc<dyn Clock>,
    min_page_time: Duration,
}

impl PageInstance {
    fn state(&self) -> MutexGuard<'_, TrackerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn flush(&self, trigger: FlushTrigger) -> Option<PageViewRecord> {
        if !self.state().begin_flush(trigger) {
            return None;
        }

        let record = flush_page_view(
            self.sink.as_ref(),
            &self.visit,
            self.clock.now(),
            self.min_page_time,
            || self.scroll.stop(),
        );
        // Bounces never read the depth, so detach here as well.
        self.scroll.stop();

        if let Some(record) = &record {
            log_info!(
                "Page view {} flushed on {:?}: {}ms, {}% scrolled",
                record.page_path,
                trigger,
                record.time_on_page_ms,
                record.scroll_depth
            );
        }
        record
    }
}

/// Handle for one mounted page. Dropping it is the same as [`unmount`].
///
/// [`unmount`]: PageTracker::unmount
pub struct PageTracker {
    instance: Arc<PageInstance>,
    events: Arc<dyn LifecycleEvents>,
    listeners: Vec<ListenerId>,
}

impl PageTracker {
    pub fn state(&self) -> TrackerState {
        self.instance.state().clone()
    }

    pub fn session_id(&self) -> &str {
        &self.instance.visit.session_id
    }

    pub fn page_type(&self) -> PageType {
        self.instance.visit.page_type
    }

    /// Flushes the visit unless something already did, then detaches every
    /// listener this page registered.
    pub fn unmount(self) {
        drop(self);
    }

    fn detach(&mut self) {
        self.instance.flush(FlushTrigger::Unmount);
        for id in self.listeners.drain(..) {
            self.events.remove_listener(id);
        }
        self.instance.scroll.stop();
    }
}

impl Drop for PageTracker {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classify::{DeviceType, ReferrerSource},
        clock::ManualClock,
        lifecycle::EventHub,
        sink::MemorySink,
        storage::{BlockedTabStorage, MemoryTabStorage},
        tracking::TrackerStatus,
    };
    use chrono::{Duration as ChronoDuration, Utc};

    struct Harness {
        hub: Arc<EventHub>,
        clock: Arc<ManualClock>,
        sink: MemorySink,
        tracker: Tracker,
    }

    fn harness_with(storage: Arc<dyn TabStorage>) -> Harness {
        let hub = Arc::new(EventHub::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let sink = MemorySink::new();
        let tracker = Tracker::new(
            TrackerConfig::default(),
            Arc::new(sink.clone()),
            storage,
            hub.clone(),
        )
        .with_clock(clock.clone());
        Harness {
            hub,
            clock,
            sink,
            tracker,
        }
    }

    fn harness() -> Harness {
        harness_with(Arc::new(MemoryTabStorage::new()))
    }

    fn page(path: &str) -> PageContext {
        PageContext::new(path, "", 1440.0)
    }

    fn wait(h: &Harness, ms: i64) {
        h.clock.advance(ChronoDuration::milliseconds(ms));
    }

    #[test]
    fn one_session_two_page_views() {
        let h = harness();

        let first = h.tracker.mount(page("/"));
        wait(&h, 2000);
        first.unmount();

        let second = h.tracker.mount(page("/pricing"));
        wait(&h, 3000);
        second.unmount();

        let sessions = h.sink.sessions();
        let page_views = h.sink.page_views();
        assert_eq!(sessions.len(), 1);
        assert_eq!(page_views.len(), 2);
        assert_eq!(sessions[0].landing_page, "/");
        assert!(page_views.iter().all(|pv| pv.session_id == sessions[0].session_id));
        assert_eq!(page_views[1].page_type, PageType::Pricing);
        assert_eq!(page_views[1].time_on_page_ms, 3000);
    }

    #[test]
    fn hidden_then_unmount_flushes_once() {
        let h = harness();
        let tracker = h.tracker.mount(page("/contact"));
        wait(&h, 1000);

        h.hub.emit(LifecycleEvent::Suspend);
        assert_eq!(tracker.state().status, TrackerStatus::Flushed);
        assert_eq!(tracker.state().flushed_by, Some(FlushTrigger::Hidden));

        wait(&h, 1000);
        h.hub.emit(LifecycleEvent::Suspend);
        h.hub.emit(LifecycleEvent::Teardown);
        tracker.unmount();

        let page_views = h.sink.page_views();
        assert_eq!(page_views.len(), 1);
        assert_eq!(page_views[0].time_on_page_ms, 1000);
    }

    #[test]
    fn teardown_flushes() {
        let h = harness();
        let tracker = h.tracker.mount(page("/blog"));
        wait(&h, 700);
        h.hub.emit(LifecycleEvent::Teardown);
        assert_eq!(tracker.state().flushed_by, Some(FlushTrigger::Teardown));
        drop(tracker);
        assert_eq!(h.sink.page_views().len(), 1);
    }

    #[test]
    fn quick_bounce_writes_nothing() {
        let h = harness();
        let tracker = h.tracker.mount(page("/pricing"));
        wait(&h, 300);
        tracker.unmount();
        assert!(h.sink.page_views().is_empty());
    }

    #[test]
    fn long_read_reports_time_and_scroll() {
        let h = harness();
        let tracker = h.tracker.mount(page("/blog/technical-seo-audit"));
        h.hub.scroll(400.0, 2000.0, 800.0);
        h.hub.scroll(1020.0, 2000.0, 800.0);
        h.hub.scroll(200.0, 2000.0, 800.0);
        wait(&h, 8000);
        tracker.unmount();

        let page_views = h.sink.page_views();
        assert_eq!(page_views.len(), 1);
        assert_eq!(page_views[0].time_on_page_ms, 8000);
        assert_eq!(page_views[0].scroll_depth, 85);
        assert_eq!(page_views[0].page_type, PageType::BlogPost);
    }

    #[test]
    fn unmount_detaches_all_listeners() {
        let h = harness();
        let tracker = h.tracker.mount(page("/"));
        assert_eq!(h.hub.total_listeners(), 3);

        h.hub.emit(LifecycleEvent::Suspend);
        // Flushing already dropped the scroll listener.
        assert_eq!(h.hub.listener_count(LifecycleEventKind::Scroll), 0);

        tracker.unmount();
        assert_eq!(h.hub.total_listeners(), 0);
    }

    #[test]
    fn hidden_after_long_visit_detaches_scroll() {
        let h = harness();
        let tracker = h.tracker.mount(page("/"));
        h.hub.scroll(600.0, 2000.0, 800.0);
        wait(&h, 1000);

        h.hub.emit(LifecycleEvent::Suspend);
        assert_eq!(h.hub.listener_count(LifecycleEventKind::Scroll), 0);
        h.hub.scroll(1200.0, 2000.0, 800.0);

        tracker.unmount();
        let page_views = h.sink.page_views();
        assert_eq!(page_views.len(), 1);
        assert_eq!(page_views[0].scroll_depth, 50);
    }

    #[test]
    fn bounce_still_detaches_scroll_listener() {
        let h = harness();
        let tracker = h.tracker.mount(page("/"));
        tracker.unmount();
        assert_eq!(h.hub.total_listeners(), 0);
    }

    #[test]
    fn events_after_unmount_are_ignored() {
        let h = harness();
        let tracker = h.tracker.mount(page("/"));
        wait(&h, 100);
        tracker.unmount();
        wait(&h, 5000);
        h.hub.emit(LifecycleEvent::Teardown);
        assert!(h.sink.page_views().is_empty());
    }

    #[test]
    fn first_page_records_classified_session() {
        let h = harness();
        let tracker = h.tracker.mount(PageContext::new(
            "/services/seo-automation",
            "https://www.google.com/search?q=seo+agency",
            390.0,
        ));
        assert_eq!(tracker.page_type(), PageType::Service);

        let sessions = h.sink.sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, tracker.session_id());
        assert_eq!(sessions[0].referrer_source, ReferrerSource::Google);
        assert_eq!(sessions[0].search_query.as_deref(), Some("seo agency"));
        assert_eq!(sessions[0].device_type, DeviceType::Mobile);
    }

    #[test]
    fn separate_tabs_get_separate_sessions() {
        let h = harness();
        let other_tab = Tracker::new(
            TrackerConfig::default(),
            Arc::new(h.sink.clone()),
            Arc::new(MemoryTabStorage::new()),
            h.hub.clone(),
        );

        let a = h.tracker.mount(page("/"));
        let b = other_tab.mount(page("/"));
        assert_ne!(a.session_id(), b.session_id());
        assert_eq!(h.sink.sessions().len(), 2);
    }

    #[test]
    fn blocked_storage_still_tracks() {
        let h = harness_with(Arc::new(BlockedTabStorage));
        let tracker = h.tracker.mount(page("/"));
        wait(&h, 1000);
        tracker.unmount();
        assert_eq!(h.sink.sessions().len(), 1);
        assert_eq!(h.sink.page_views().len(), 1);
    }

    #[test]
    fn threshold_comes_from_config() {
        let hub = Arc::new(EventHub::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let sink = MemorySink::new();
        let config = TrackerConfig {
            min_page_time_ms: 2000,
            ..TrackerConfig::default()
        };
        let tracker = Tracker::new(config, Arc::new(sink.clone()), Arc::new(MemoryTabStorage::new()), hub)
            .with_clock(clock.clone());

        let page_tracker = tracker.mount(page("/"));
        clock.advance(ChronoDuration::milliseconds(1500));
        page_tracker.unmount();
        assert!(sink.page_views().is_empty());
    }

    #[test]
    fn unconfigured_tracker_is_silent() {
        let hub = Arc::new(EventHub::new());
        let tracker = Tracker::from_config(
            TrackerConfig::default(),
            Arc::new(MemoryTabStorage::new()),
            hub.clone(),
        );
        let page_tracker = tracker.mount(page("/"));
        hub.emit(LifecycleEvent::Teardown);
        page_tracker.unmount();
        assert_eq!(hub.total_listeners(), 0);
    }
}
