use crate::{
    classify::{classify_referrer, device::viewport_px, DeviceType},
    models::SessionRecord,
    sink::AnalyticsSink,
    storage::TabStorage,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub const RECORDED_KEY: &str = "st_session_recorded";

/// What the host knows about the page being opened.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    pub path: String,
    /// Raw referrer as reported by the host; empty for direct visits.
    pub referrer: String,
    pub viewport_width: f64,
}

impl PageContext {
    pub fn new(path: impl Into<String>, referrer: impl Into<String>, viewport_width: f64) -> Self {
        Self {
            path: path.into(),
            referrer: referrer.into(),
            viewport_width,
        }
    }
}

pub fn build_session_record(session_id: &str, page: &PageContext, site_domain: &str) -> SessionRecord {
    let referrer = classify_referrer(&page.referrer, site_domain);
    let referrer_raw = Some(page.referrer.clone()).filter(|raw| !raw.is_empty());

    SessionRecord {
        session_id: session_id.to_string(),
        landing_page: page.path.clone(),
        referrer: referrer_raw,
        referrer_source: referrer.source,
        search_query: referrer.query,
        device_type: DeviceType::from_viewport(page.viewport_width),
        screen_width: viewport_px(page.viewport_width),
    }
}

/// Writes the session-opened record if this tab hasn't written one yet.
///
/// The marker is stored before the write goes out, so a second mount racing
/// this one sees it and backs off. Returns the record that was sent.
pub fn record_session_if_new(
    storage: &dyn TabStorage,
    sink: &dyn AnalyticsSink,
    session_id: &str,
    page: &PageContext,
    site_domain: &str,
) -> Option<SessionRecord> {
    match storage.get(RECORDED_KEY) {
        Ok(Some(_)) => return None,
        Ok(None) => {}
        Err(err) => log_debug!("Session marker unreadable, treating session as new: {err:#}"),
    }

    if let Err(err) = storage.set(RECORDED_KEY, "1") {
        log_debug!("Session marker not persisted: {err:#}");
    }

    let record = build_session_record(session_id, page, site_domain);
    log_info!(
        "Session {} opened on {} via {}",
        record.session_id,
        record.landing_page,
        record.referrer_source.as_str()
    );
    sink.insert_session(record.clone());
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classify::ReferrerSource,
        sink::MemorySink,
        storage::{BlockedTabStorage, MemoryTabStorage},
    };

    const SITE: &str = "theprojectseo.com";

    #[test]
    fn google_search_on_a_phone() {
        let page = PageContext::new("/", "https://www.google.com/search?q=seo+agency", 390.0);
        let record = build_session_record("sid", &page, SITE);
        assert_eq!(record.referrer_source, ReferrerSource::Google);
        assert_eq!(record.search_query.as_deref(), Some("seo agency"));
        assert_eq!(record.device_type, DeviceType::Mobile);
        assert_eq!(record.screen_width, 390);
        assert_eq!(
            record.referrer.as_deref(),
            Some("https://www.google.com/search?q=seo+agency")
        );
    }

    #[test]
    fn direct_visit_on_desktop() {
        let page = PageContext::new("/pricing", "", 1440.0);
        let record = build_session_record("sid", &page, SITE);
        assert_eq!(record.referrer_source, ReferrerSource::Direct);
        assert_eq!(record.search_query, None);
        assert_eq!(record.referrer, None);
        assert_eq!(record.device_type, DeviceType::Desktop);
        assert_eq!(record.landing_page, "/pricing");
    }

    #[test]
    fn device_type_agrees_with_stored_width() {
        for width in [f64::NAN, f64::NEG_INFINITY, -5.0, 767.5, 1023.0, f64::INFINITY] {
            let record = build_session_record("sid", &PageContext::new("/", "", width), SITE);
            assert_eq!(record.device_type, DeviceType::from_width(record.screen_width));
        }

        let record = build_session_record("sid", &PageContext::new("/", "", f64::NAN), SITE);
        assert_eq!(record.screen_width, 0);
        assert_eq!(record.device_type, DeviceType::Mobile);
    }

    #[test]
    fn records_once_per_tab() {
        let tab = MemoryTabStorage::new();
        let sink = MemorySink::new();
        let page = PageContext::new("/", "", 1024.0);

        assert!(record_session_if_new(&tab, &sink, "sid", &page, SITE).is_some());
        assert_eq!(tab.get(RECORDED_KEY).unwrap().as_deref(), Some("1"));
        assert!(record_session_if_new(&tab, &sink, "sid", &page, SITE).is_none());
        assert_eq!(sink.sessions().len(), 1);
    }

    #[test]
    fn blocked_storage_records_every_time() {
        let sink = MemorySink::new();
        let page = PageContext::new("/", "", 1024.0);
        record_session_if_new(&BlockedTabStorage, &sink, "a", &page, SITE);
        record_session_if_new(&BlockedTabStorage, &sink, "b", &page, SITE);
        assert_eq!(sink.sessions().len(), 2);
    }
}
