//! Note lifecycle scheduling.
//!
//! Every chart note gets a [`Lifecycle`]:
//!
//! ```text
//! Pending --(song_time >= spawn)--> Traveling --(judge hit)---------> Judged
//!                                       \------(song_time >= deadline)--> Expired
//! ```
//!
//! The [`Scheduler`] keeps one wake-up entry per live lifecycle in a
//! min-heap keyed by the song time it next needs attention. Each tick pops
//! every entry that is due, checks the actual condition against the current
//! song time (a late tick is handled the same as an on-time one) and pushes
//! the lifecycle back with its next wake time.

mod trajectory;

pub use trajectory::*;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use strum::{Display, IntoStaticStr};
use tracing::debug;

use crate::assets::{NoteVisual, VisualTable};
use crate::config::LaneLayout;
use crate::judge::{Playfield, Tier};
use crate::stats::StatsTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, Display)]
pub enum Phase {
    Pending,
    Traveling,
    Judged,
    Expired,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Judged | Self::Expired)
    }
}

/// Runtime state of one note.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    index: usize,
    phase: Phase,
    /// Held only while traveling
    visual: Option<NoteVisual>,
}

impl Lifecycle {
    fn new(index: usize) -> Self {
        Self {
            index,
            phase: Phase::Pending,
            visual: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn visual(&self) -> Option<&NoteVisual> {
        self.visual.as_ref()
    }

    fn finish(&mut self, phase: Phase) {
        self.phase = phase;
        self.visual = None;
    }
}

/// Heap entry: lifecycle `index` wants attention at song time `at`.
#[derive(Debug, Clone, Copy)]
struct Wake {
    at: f64,
    index: usize,
}

impl PartialEq for Wake {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Wake {}

impl PartialOrd for Wake {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Wake {
    // Reversed so BinaryHeap pops the earliest wake first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Transitions that happened during one [`Scheduler::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub spawned: Vec<usize>,
    pub judged: Vec<usize>,
    pub expired: Vec<usize>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty() && self.judged.is_empty() && self.expired.is_empty()
    }
}

/// Where a traveling note is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct NotePosition {
    pub index: usize,
    pub lane: usize,
    pub position: Vec2,
    pub progress: f64,
    pub visual: NoteVisual,
}

pub struct Scheduler {
    field: Arc<Playfield>,
    stats: Arc<StatsTracker>,
    visuals: VisualTable,
    layout: LaneLayout,
    /// Seconds after a note's hit time at which it expires
    expiry_margin: f64,
    lifecycles: Vec<Lifecycle>,
    queue: BinaryHeap<Wake>,
    judged: Receiver<usize>,
    terminal: usize,
}

impl Scheduler {
    pub(crate) fn new(
        field: Arc<Playfield>,
        stats: Arc<StatsTracker>,
        visuals: VisualTable,
        layout: LaneLayout,
        expiry_margin: f64,
        judged: Receiver<usize>,
    ) -> Self {
        let lifecycles: Vec<Lifecycle> = (0..field.len()).map(Lifecycle::new).collect();
        let queue = field
            .chart()
            .notes()
            .iter()
            .enumerate()
            .map(|(index, note)| Wake {
                at: note.spawn_time,
                index,
            })
            .collect();

        Self {
            field,
            stats,
            visuals,
            layout,
            expiry_margin,
            lifecycles,
            queue,
            judged,
            terminal: 0,
        }
    }

    /// Advance every lifecycle that is due at `song_time`.
    ///
    /// Safe to call at any rate; repeated calls with the same time are no-ops.
    pub fn tick(&mut self, song_time: f64) -> TickReport {
        let mut report = TickReport::default();

        while let Ok(index) = self.judged.try_recv() {
            if self.complete_judged(index) {
                report.judged.push(index);
            }
        }

        while let Some(wake) = self.queue.peek().copied() {
            if wake.at > song_time {
                break;
            }
            self.queue.pop();
            self.advance(wake.index, song_time, &mut report);
        }

        report
    }

    fn advance(&mut self, index: usize, song_time: f64, report: &mut TickReport) {
        let Some(note) = self.field.note(index) else {
            return;
        };
        let (spawn_time, deadline) = (note.spawn_time, note.hit_time + self.expiry_margin);

        match self.lifecycles[index].phase {
            Phase::Pending => {
                if song_time < spawn_time {
                    self.queue.push(Wake {
                        at: spawn_time,
                        index,
                    });
                    return;
                }

                // Pressed early enough to be judged before it ever appeared.
                if self.is_resolved(index) {
                    self.complete_judged(index);
                    report.judged.push(index);
                    return;
                }

                let lifecycle = &mut self.lifecycles[index];
                lifecycle.phase = Phase::Traveling;
                lifecycle.visual = self.visuals.get(index).cloned();
                report.spawned.push(index);
                debug!("Note {} spawned at {:.3}", index, song_time);

                // After a stall the deadline may already be due; the tick
                // loop pops it again before returning.
                self.queue.push(Wake {
                    at: deadline,
                    index,
                });
            }
            Phase::Traveling => {
                if song_time < deadline {
                    self.queue.push(Wake {
                        at: deadline,
                        index,
                    });
                    return;
                }

                let expired = self
                    .field
                    .slot(index)
                    .is_some_and(|slot| slot.try_resolve(Tier::Miss));
                if expired {
                    self.lifecycles[index].finish(Phase::Expired);
                    self.terminal += 1;
                    self.stats.record_miss();
                    report.expired.push(index);
                    debug!("Note {} expired at {:.3}", index, song_time);
                } else if self.complete_judged(index) {
                    report.judged.push(index);
                }
            }
            Phase::Judged | Phase::Expired => {}
        }
    }

    /// Move a judged note to its terminal state. Returns `false` if it was already terminal.
    fn complete_judged(&mut self, index: usize) -> bool {
        let Some(lifecycle) = self.lifecycles.get_mut(index) else {
            return false;
        };
        if lifecycle.phase.is_terminal() {
            return false;
        }

        lifecycle.finish(Phase::Judged);
        self.terminal += 1;
        debug!("Note {} released after judgement", index);
        true
    }

    fn is_resolved(&self, index: usize) -> bool {
        self.field
            .slot(index)
            .is_some_and(|slot| slot.is_resolved())
    }

    /// Positions of every traveling note at `song_time`.
    ///
    /// Pure function of time and the current phases: may be called any
    /// number of times per tick, or not at all.
    pub fn positions(&self, song_time: f64) -> Vec<NotePosition> {
        self.lifecycles
            .iter()
            .filter(|lifecycle| lifecycle.phase == Phase::Traveling)
            .filter_map(|lifecycle| {
                let note = self.field.note(lifecycle.index)?;
                let geometry = self.layout.lanes.get(note.lane)?;
                let progress = progress(song_time, note.spawn_time, note.hit_time);
                Some(NotePosition {
                    index: lifecycle.index,
                    lane: note.lane,
                    position: position(
                        note.trajectory,
                        geometry.start(),
                        geometry.end(),
                        self.layout.arc_amplitude,
                        progress,
                    ),
                    progress,
                    visual: lifecycle.visual.clone()?,
                })
            })
            .collect()
    }

    /// Song time at which the next lifecycle needs a tick, if any remain.
    pub fn next_wake(&self) -> Option<f64> {
        self.queue.peek().map(|wake| wake.at)
    }

    pub fn lifecycle(&self, index: usize) -> Option<&Lifecycle> {
        self.lifecycles.get(index)
    }

    pub fn lifecycles(&self) -> &[Lifecycle] {
        &self.lifecycles
    }

    /// Lifecycles that have reached `Judged` or `Expired`.
    pub fn terminal_count(&self) -> usize {
        self.terminal
    }

    pub fn is_complete(&self) -> bool {
        self.terminal == self.lifecycles.len()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("notes", &self.lifecycles.len())
            .field("terminal", &self.terminal)
            .field("next_wake", &self.next_wake())
            .finish()
    }
}
