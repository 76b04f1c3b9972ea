use serde::Serialize;

use crate::judge::Tier;

/// What the display layer receives after every statistics change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UiSnapshot {
    pub score: u64,
    pub combo: u32,
    pub accuracy: f64,
    pub last_tier: Option<Tier>,
}

/// Read-only consumer of statistics updates.
///
/// Called from whichever thread produced the outcome, one push at a time in
/// mutation order, while the tracker's lock is held; implementations must
/// not call back into the tracker. They own formatting and any timed
/// clearing of feedback.
pub trait UiSink: Send + Sync {
    fn publish(&self, snapshot: &UiSnapshot);
}

/// UI sink that discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUi;

impl UiSink for NullUi {
    fn publish(&self, _snapshot: &UiSnapshot) {}
}
