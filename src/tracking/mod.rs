pub mod controller;
pub mod flush;
pub mod scroll;
pub mod state;

pub use controller::{PageTracker, Tracker};
pub use flush::{flush_page_view, PageVisit};
pub use scroll::ScrollDepthMonitor;
pub use state::{FlushTrigger, TrackerState, TrackerStatus};
