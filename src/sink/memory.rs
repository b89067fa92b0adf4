use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{PageViewRecord, SessionRecord};

use super::AnalyticsSink;

#[derive(Default)]
struct Buffered {
    sessions: Vec<SessionRecord>,
    page_views: Vec<PageViewRecord>,
}

/// Keeps every record in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Buffered>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffered(&self) -> MutexGuard<'_, Buffered> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.buffered().sessions.clone()
    }

    pub fn page_views(&self) -> Vec<PageViewRecord> {
        self.buffered().page_views.clone()
    }

    /// Hands over everything buffered so far and starts empty.
    pub fn take(&self) -> (Vec<SessionRecord>, Vec<PageViewRecord>) {
        let mut guard = self.buffered();
        (
            std::mem::take(&mut guard.sessions),
            std::mem::take(&mut guard.page_views),
        )
    }
}

impl AnalyticsSink for MemorySink {
    fn insert_session(&self, record: SessionRecord) {
        self.buffered().sessions.push(record);
    }

    fn insert_page_view(&self, record: PageViewRecord) {
        self.buffered().page_views.push(record);
    }
}
