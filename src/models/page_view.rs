use serde::{Deserialize, Serialize};

use crate::classify::PageType;

/// One qualifying page visit. Emitted at most once per page instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageViewRecord {
    pub session_id: String,
    pub page_path: String,
    pub page_type: PageType,
    pub time_on_page_ms: u64,
    /// Maximum vertical scroll reached, 0-100.
    pub scroll_depth: u8,
}
