//! Session-opened record, written once per tab.

use serde::{Deserialize, Serialize};

use crate::classify::{DeviceType, ReferrerSource};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub landing_page: String,
    pub referrer: Option<String>,
    pub referrer_source: ReferrerSource,
    pub search_query: Option<String>,
    pub device_type: DeviceType,
    pub screen_width: u32,
}
