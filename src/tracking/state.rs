use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TrackerStatus {
    #[default]
    Idle,
    Mounted,
    Flushed,
}

/// What ended the visit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FlushTrigger {
    Hidden,
    Teardown,
    Unmount,
}

/// Lifecycle of one page instance: `Idle -> Mounted -> Flushed`.
/// `Flushed` is terminal; a new page gets a new state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub status: TrackerStatus,
    pub flushed_by: Option<FlushTrigger>,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self) {
        *self = Self {
            status: TrackerStatus::Mounted,
            flushed_by: None,
        };
    }

    /// Moves `Mounted` to `Flushed`. Only the first caller gets `true`; every
    /// later trigger for the same page is ignored.
    pub fn begin_flush(&mut self, trigger: FlushTrigger) -> bool {
        if self.status != TrackerStatus::Mounted {
            return false;
        }
        self.status = TrackerStatus::Flushed;
        self.flushed_by = Some(trigger);
        true
    }

    pub fn is_flushed(&self) -> bool {
        self.status == TrackerStatus::Flushed
    }
}
