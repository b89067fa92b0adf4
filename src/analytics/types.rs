use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The slice of a stored page view the report needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewRow {
    pub page_path: String,
    pub time_on_page_ms: Option<u64>,
    pub scroll_depth: Option<u64>,
}

/// Number of sessions carrying one label (a referrer source or device type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSession {
    pub session_id: String,
    pub landing_page: String,
    pub referrer_source: String,
    pub device_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub sessions: u64,
    pub page_views: u64,
    pub unique_pages: u64,
    pub avg_time_ms: f64,
    pub avg_scroll_depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPage {
    pub path: String,
    pub views: u64,
    pub avg_time_ms: f64,
    pub avg_scroll_depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub label: String,
    pub stats: PeriodStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub periods: Vec<PeriodReport>,
    pub traffic_sources: Vec<LabelCount>,
    pub top_pages: Vec<TopPage>,
    pub devices: Vec<LabelCount>,
    pub recent_sessions: Vec<RecentSession>,
}
