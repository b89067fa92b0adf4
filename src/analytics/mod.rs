//! Read side of the analytics store: period stats, breakdowns and the text
//! dashboard built from them.

pub mod dashboard;
pub mod types;

pub use dashboard::{build_dashboard, format_ms, pct, render_text};
pub use types::{
    DashboardReport, LabelCount, PageViewRow, PeriodReport, PeriodStats, RecentSession, TopPage,
};
