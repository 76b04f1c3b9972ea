//! Session statistics.
//!
//! [`SessionStats`] holds the pure score/combo/accuracy transitions.
//! [`StatsTracker`] wraps it for concurrent use: every outcome report goes
//! through it exactly once per note, and when the last report arrives the
//! frozen statistics are handed to the score sink, once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use crate::judge::Tier;
use crate::persist::{ScoreRecord, ScoreSink};
use crate::ui::{UiSink, UiSnapshot};

/// Number of notes resolved per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub perfect: u32,
    pub great: u32,
    pub early: u32,
    pub late: u32,
    pub miss: u32,
}

impl TierCounts {
    fn add(&mut self, tier: Tier) {
        match tier {
            Tier::Perfect => self.perfect += 1,
            Tier::Great => self.great += 1,
            Tier::Early => self.early += 1,
            Tier::Late => self.late += 1,
            Tier::Miss => self.miss += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.perfect + self.great + self.early + self.late + self.miss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionStats {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    /// Percentage in `[0, 100]`
    pub accuracy: f64,
    pub total_notes: usize,
    pub counts: TierCounts,
}

impl SessionStats {
    pub fn new(total_notes: usize) -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            accuracy: 100.0,
            total_notes,
            counts: TierCounts::default(),
        }
    }

    /// Apply a hit. A `Miss` tier is routed to [`SessionStats::apply_miss`].
    pub fn apply_hit(&mut self, tier: Tier) {
        if !tier.is_hit() {
            self.apply_miss();
            return;
        }

        self.score += u64::from(tier.points());
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.apply_penalty(tier.penalty());
        self.counts.add(tier);
    }

    pub fn apply_miss(&mut self) {
        self.combo = 0;
        self.apply_penalty(Tier::Miss.penalty());
        self.counts.add(Tier::Miss);
    }

    /// Notes that have received an outcome so far.
    pub fn resolved(&self) -> usize {
        self.counts.total() as usize
    }

    fn apply_penalty(&mut self, penalty: f64) {
        if self.total_notes == 0 {
            return;
        }
        self.accuracy = (self.accuracy - penalty / self.total_notes as f64).clamp(0.0, 100.0);
    }
}

struct TrackerState {
    stats: SessionStats,
    last_tier: Option<Tier>,
}

/// Thread-safe owner of the session's [`SessionStats`].
pub struct StatsTracker {
    level_id: String,
    state: Mutex<TrackerState>,
    finalized: AtomicBool,
    final_stats: OnceLock<SessionStats>,
    ui: Arc<dyn UiSink>,
    sink: Arc<dyn ScoreSink>,
}

impl StatsTracker {
    pub fn new(
        level_id: impl Into<String>,
        total_notes: usize,
        ui: Arc<dyn UiSink>,
        sink: Arc<dyn ScoreSink>,
    ) -> Self {
        Self {
            level_id: level_id.into(),
            state: Mutex::new(TrackerState {
                stats: SessionStats::new(total_notes),
                last_tier: None,
            }),
            finalized: AtomicBool::new(false),
            final_stats: OnceLock::new(),
            ui,
            sink,
        }
    }

    pub fn record_hit(&self, tier: Tier) {
        self.record(tier);
    }

    pub fn record_miss(&self) {
        self.record(Tier::Miss);
    }

    fn record(&self, tier: Tier) {
        let complete = {
            let mut state = self.lock();
            if state.stats.resolved() >= state.stats.total_notes {
                warn!(
                    "Ignoring {} report: all {} notes already resolved",
                    tier, state.stats.total_notes
                );
                return;
            }

            state.stats.apply_hit(tier);
            state.last_tier = Some(tier);
            // Published under the lock so pushes reach the UI in mutation order.
            self.ui.publish(&snapshot_of(&state));
            state.stats.resolved() == state.stats.total_notes
        };

        if complete {
            self.finalize();
        }
    }

    /// Finalize if every note has an outcome. Used for empty charts, which
    /// never receive a report.
    pub fn finalize_if_complete(&self) -> bool {
        let complete = {
            let state = self.lock();
            state.stats.resolved() >= state.stats.total_notes
        };
        complete && self.finalize()
    }

    /// Freeze the statistics and hand them to the score sink.
    ///
    /// Returns `true` only for the call that actually finalized.
    fn finalize(&self) -> bool {
        if self.finalized.swap(true, Ordering::AcqRel) {
            return false;
        }

        let stats = self.lock().stats;
        let _ = self.final_stats.set(stats);

        info!(
            "Session `{}` finished: score {}, accuracy {:.2}%, max combo {}",
            self.level_id, stats.score, stats.accuracy, stats.max_combo
        );
        self.sink
            .save(&self.level_id, &ScoreRecord::from_stats(&stats));
        true
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }

    /// Statistics as frozen at finalization.
    pub fn final_stats(&self) -> Option<SessionStats> {
        self.final_stats.get().copied()
    }

    pub fn stats(&self) -> SessionStats {
        self.lock().stats
    }

    pub fn snapshot(&self) -> UiSnapshot {
        snapshot_of(&self.lock())
    }

    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        // Each mutation completes before the guard drops, so a poisoned
        // state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn snapshot_of(state: &TrackerState) -> UiSnapshot {
    UiSnapshot {
        score: state.stats.score,
        combo: state.stats.combo,
        accuracy: state.stats.accuracy,
        last_tier: state.last_tier,
    }
}

impl std::fmt::Debug for StatsTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsTracker")
            .field("level_id", &self.level_id)
            .field("stats", &self.stats())
            .field("finalized", &self.is_finalized())
            .finish()
    }
}
