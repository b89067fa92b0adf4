//! Outbound writes to the analytics data store.
//!
//! Every sink is fire-and-forget: calls return immediately, delivery happens
//! (or fails) in the background, and failures are logged rather than returned.

mod memory;
mod rest;

use std::sync::Arc;

pub use memory::MemorySink;
pub use rest::RestSink;

use crate::{
    config::TrackerConfig,
    models::{PageViewRecord, SessionRecord},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub trait AnalyticsSink: Send + Sync {
    fn insert_session(&self, record: SessionRecord);
    fn insert_page_view(&self, record: PageViewRecord);
}

/// Stand-in used when no data store is configured. Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl AnalyticsSink for NoopSink {
    fn insert_session(&self, _record: SessionRecord) {}
    fn insert_page_view(&self, _record: PageViewRecord) {}
}

/// Builds the sink for a configuration: the REST sink when the endpoint and
/// credential are both present and usable, otherwise [`NoopSink`].
///
/// The REST sink spawns onto the current tokio runtime, so this must be
/// called from within one to get network delivery.
pub fn connect(config: &TrackerConfig) -> Arc<dyn AnalyticsSink> {
    if config.api_credentials().is_none() {
        log_info!("Analytics API not configured; tracking writes disabled");
        return Arc::new(NoopSink);
    }

    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            log_warn!("No tokio runtime available; tracking writes disabled");
            return Arc::new(NoopSink);
        }
    };

    match RestSink::new(config, handle) {
        Ok(sink) => Arc::new(sink),
        Err(err) => {
            log_warn!("Analytics API unusable ({err:#}); tracking writes disabled");
            Arc::new(NoopSink)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_is_noop_even_without_runtime() {
        let sink = connect(&TrackerConfig::default());
        sink.insert_page_view(PageViewRecord {
            session_id: "s".into(),
            page_path: "/".into(),
            page_type: crate::classify::PageType::Home,
            time_on_page_ms: 1000,
            scroll_depth: 0,
        });
    }

    #[test]
    fn configured_without_runtime_is_noop() {
        let config = TrackerConfig {
            api_url: Some("https://abc.supabase.co".into()),
            api_key: Some("anon".into()),
            ..TrackerConfig::default()
        };
        // No runtime on a plain #[test] thread; must not panic.
        let _sink = connect(&config);
    }

    #[tokio::test]
    async fn configured_inside_runtime_connects() {
        let config = TrackerConfig {
            api_url: Some("https://abc.supabase.co".into()),
            api_key: Some("anon".into()),
            ..TrackerConfig::default()
        };
        let _sink = connect(&config);

        let bad = TrackerConfig {
            api_url: Some("not a url".into()),
            api_key: Some("anon".into()),
            ..TrackerConfig::default()
        };
        let _sink = connect(&bad);
    }
}
