use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::{classify::PageType, models::PageViewRecord, sink::AnalyticsSink};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// The page visit a flush reports on.
#[derive(Debug, Clone, PartialEq)]
pub struct PageVisit {
    pub session_id: String,
    pub page_path: String,
    pub page_type: PageType,
    pub entered_at: DateTime<Utc>,
}

/// Emits the page-view record for a finished visit.
///
/// Visits shorter than `min_page_time` are dropped without reading the scroll
/// depth or touching the sink. Otherwise exactly one write is handed to the
/// sink; its outcome is not awaited. Returns the record that was sent.
pub fn flush_page_view<F>(
    sink: &dyn AnalyticsSink,
    visit: &PageVisit,
    now: DateTime<Utc>,
    min_page_time: Duration,
    scroll_depth: F,
) -> Option<PageViewRecord>
where
    F: FnOnce() -> u8,
{
    let time_on_page_ms = (now - visit.entered_at).num_milliseconds().max(0) as u64;
    if u128::from(time_on_page_ms) < min_page_time.as_millis() {
        log_debug!(
            "Skipping page view for {} after {}ms (bounce)",
            visit.page_path,
            time_on_page_ms
        );
        return None;
    }

    let record = PageViewRecord {
        session_id: visit.session_id.clone(),
        page_path: visit.page_path.clone(),
        page_type: visit.page_type,
        time_on_page_ms,
        scroll_depth: scroll_depth(),
    };

    sink.insert_page_view(record.clone());
    Some(record)
}
