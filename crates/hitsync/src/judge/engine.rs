use std::sync::Arc;
use std::sync::mpsc::Sender;

use tracing::{debug, trace};

use super::{Judgement, Playfield, WINDOW_TOLERANCE, classify};
use crate::clock::AnchorClock;
use crate::config::HitWindows;
use crate::stats::StatsTracker;

/// Matches lane presses to notes.
///
/// Cheap to clone and safe to call from any thread; input handlers keep
/// their own copy.
#[derive(Clone)]
pub struct Judge {
    field: Arc<Playfield>,
    windows: HitWindows,
    global_offset: f64,
    stats: Arc<StatsTracker>,
    anchor: Arc<AnchorClock>,
    judged: Sender<usize>,
}

struct Candidate {
    index: usize,
    hit_time: f64,
    diff: f64,
}

impl Judge {
    pub(crate) fn new(
        field: Arc<Playfield>,
        windows: HitWindows,
        global_offset: f64,
        stats: Arc<StatsTracker>,
        anchor: Arc<AnchorClock>,
        judged: Sender<usize>,
    ) -> Self {
        Self {
            field,
            windows,
            global_offset,
            stats,
            anchor,
            judged,
        }
    }

    /// Judge a press in `lane` happening right now on the device clock.
    ///
    /// Presses before the session is anchored are ignored.
    pub fn press(&self, lane: usize) -> Option<Judgement> {
        let song_time = self.anchor.song_time()?;
        self.on_lane_press(lane, song_time)
    }

    /// Judge a press in `lane` at `song_time`.
    ///
    /// Picks the unresolved note nearest in time within the widest window,
    /// ties broken by earlier hit time and then chart order, and classifies
    /// that note alone. A press with no such note, or whose nearest note
    /// falls outside the window on its side, changes nothing and returns
    /// `None`.
    pub fn on_lane_press(&self, lane: usize, song_time: f64) -> Option<Judgement> {
        let Some(indices) = self.field.lane(lane) else {
            trace!("Press in unknown lane {} ignored", lane);
            return None;
        };

        loop {
            let Some(best) = self.nearest_candidate(indices, song_time) else {
                trace!("Press in lane {} at {:.3} matched no note", lane, song_time);
                return None;
            };
            let Some(tier) = classify(best.diff, &self.windows) else {
                trace!(
                    "Press in lane {} at {:.3} outside the window of note {} ({:+.1} ms)",
                    lane,
                    song_time,
                    best.index,
                    best.diff * 1000.0
                );
                return None;
            };

            let won = self
                .field
                .slot(best.index)
                .is_some_and(|slot| slot.try_resolve(tier));
            if !won {
                // Resolved between the scan and the swap (expiry or another
                // press); the next scan no longer sees it.
                continue;
            }

            self.stats.record_hit(tier);
            // The scheduler may already be gone at session end.
            let _ = self.judged.send(best.index);

            debug!(
                "Note {} (lane {}, hit {:.3}) judged {} at {:.3} ({:+.1} ms)",
                best.index,
                lane,
                best.hit_time,
                tier,
                song_time,
                best.diff * 1000.0
            );

            return Some(Judgement {
                index: best.index,
                lane,
                tier,
                diff: best.diff,
            });
        }
    }

    fn nearest_candidate(&self, indices: &[usize], song_time: f64) -> Option<Candidate> {
        let reach = self.windows.widest() + WINDOW_TOLERANCE;
        indices
            .iter()
            .filter_map(|&index| {
                let slot = self.field.slot(index)?;
                if slot.is_resolved() {
                    return None;
                }
                let note = self.field.note(index)?;
                let diff = song_time - (note.hit_time + self.global_offset);
                (diff.abs() <= reach).then_some(Candidate {
                    index,
                    hit_time: note.hit_time,
                    diff,
                })
            })
            .min_by(|a, b| {
                a.diff
                    .abs()
                    .total_cmp(&b.diff.abs())
                    .then(a.hit_time.total_cmp(&b.hit_time))
                    .then(a.index.cmp(&b.index))
            })
    }

    pub fn windows(&self) -> &HitWindows {
        &self.windows
    }

    pub fn anchor(&self) -> &AnchorClock {
        &self.anchor
    }
}

impl std::fmt::Debug for Judge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Judge")
            .field("windows", &self.windows)
            .field("global_offset", &self.global_offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Chart, ChartNote};
    use crate::clock::ManualClock;
    use crate::judge::Tier;
    use crate::persist::MemoryScoreSink;
    use crate::ui::NullUi;
    use std::sync::mpsc::{self, Receiver};

    struct Fixture {
        judge: Judge,
        field: Arc<Playfield>,
        stats: Arc<StatsTracker>,
        judged: Receiver<usize>,
    }

    fn fixture(notes: Vec<ChartNote>, offset: f64) -> Fixture {
        fixture_with(notes, offset, HitWindows::new(0.05, 0.10, 0.15, 0.15))
    }

    fn fixture_with(notes: Vec<ChartNote>, offset: f64, windows: HitWindows) -> Fixture {
        let total = notes.len();
        let field = Arc::new(Playfield::new(Chart::new("test", notes), 2));
        let stats = Arc::new(StatsTracker::new(
            "test",
            total,
            Arc::new(NullUi),
            Arc::new(MemoryScoreSink::new()),
        ));
        let anchor = Arc::new(AnchorClock::new(Arc::new(ManualClock::new(0.0))));
        let (tx, rx) = mpsc::channel();
        let judge = Judge::new(
            Arc::clone(&field),
            windows,
            offset,
            Arc::clone(&stats),
            anchor,
            tx,
        );
        Fixture {
            judge,
            field,
            stats,
            judged: rx,
        }
    }

    fn note(lane: usize, hit: f64) -> ChartNote {
        ChartNote::new(lane, (hit - 1.5).max(0.0), hit)
    }

    #[test]
    fn test_same_time_notes_resolve_one_at_a_time() {
        let f = fixture(vec![note(0, 1.0), note(0, 1.0)], 0.0);

        let first = f.judge.on_lane_press(0, 1.0).unwrap();
        assert_eq!(first.tier, Tier::Perfect);
        assert_eq!(first.index, 0);
        assert_eq!(f.field.unresolved(), 1);
        assert_eq!(f.field.slot(1).unwrap().resolution(), None);

        let second = f.judge.on_lane_press(0, 1.02).unwrap();
        assert_eq!(second.index, 1);
        assert!(f.judge.on_lane_press(0, 1.0).is_none());
    }

    #[test]
    fn test_nearest_note_not_first_listed() {
        let f = fixture(vec![note(0, 1.1), note(0, 1.0)], 0.0);
        let judgement = f.judge.on_lane_press(0, 1.01).unwrap();
        assert_eq!(judgement.index, 1);
        assert_eq!(judgement.tier, Tier::Perfect);
    }

    #[test]
    fn test_nearest_note_outside_early_window_blocks_farther_note() {
        // Late reaches further than early: at 1.16 the note at 1.30 is
        // nearer (-0.14) but outside the 0.10 early window, while the note
        // at 1.0 would still classify as Late (+0.16).
        let f = fixture_with(
            vec![note(0, 1.0), note(0, 1.30)],
            0.0,
            HitWindows::new(0.05, 0.08, 0.10, 0.20),
        );

        assert!(f.judge.on_lane_press(0, 1.16).is_none());
        assert_eq!(f.stats.stats().score, 0);
        assert_eq!(f.stats.stats().resolved(), 0);
        assert_eq!(f.field.unresolved(), 2);
        assert!(f.judged.try_recv().is_err());

        // Nearer to the first note, the same lane judges it Late
        let judgement = f.judge.on_lane_press(0, 1.14).unwrap();
        assert_eq!(judgement.index, 0);
        assert_eq!(judgement.tier, Tier::Late);
    }

    #[test]
    fn test_tiers_by_timing() {
        let f = fixture(
            vec![note(0, 1.0), note(0, 2.0), note(0, 3.0), note(0, 4.0)],
            0.0,
        );
        assert_eq!(f.judge.on_lane_press(0, 1.05).unwrap().tier, Tier::Perfect);
        assert_eq!(f.judge.on_lane_press(0, 1.92).unwrap().tier, Tier::Great);
        assert_eq!(f.judge.on_lane_press(0, 2.88).unwrap().tier, Tier::Early);
        assert_eq!(f.judge.on_lane_press(0, 4.12).unwrap().tier, Tier::Late);
    }

    #[test]
    fn test_stray_press_is_noop() {
        let f = fixture(vec![note(0, 1.0), note(1, 1.0)], 0.0);

        assert!(f.judge.on_lane_press(0, 0.5).is_none());
        assert!(f.judge.on_lane_press(0, 1.3).is_none());
        assert!(f.judge.on_lane_press(5, 1.0).is_none());

        let stats = f.stats.stats();
        assert_eq!(stats.score, 0);
        assert_eq!(stats.combo, 0);
        assert_eq!(stats.resolved(), 0);
        assert_eq!(f.field.unresolved(), 2);
        assert!(f.judged.try_recv().is_err());
    }

    #[test]
    fn test_lane_isolation() {
        let f = fixture(vec![note(1, 1.0)], 0.0);
        assert!(f.judge.on_lane_press(0, 1.0).is_none());
        assert_eq!(f.judge.on_lane_press(1, 1.0).unwrap().index, 0);
    }

    #[test]
    fn test_global_offset_shifts_target() {
        let f = fixture(vec![note(0, 1.0)], 0.1);
        let judgement = f.judge.on_lane_press(0, 1.1).unwrap();
        assert_eq!(judgement.tier, Tier::Perfect);
        assert!(judgement.diff.abs() < 1e-9);
    }

    #[test]
    fn test_hit_notifies_scheduler_and_stats() {
        let f = fixture(vec![note(0, 1.0)], 0.0);
        f.judge.on_lane_press(0, 1.0).unwrap();

        assert_eq!(f.judged.try_recv().unwrap(), 0);
        assert_eq!(f.stats.stats().score, 150);
        assert_eq!(f.stats.stats().combo, 1);
    }

    #[test]
    fn test_expired_note_not_reconsidered() {
        let f = fixture(vec![note(0, 1.0), note(0, 1.2)], 0.0);
        // Expiry path wins the first note
        assert!(f.field.slot(0).unwrap().try_resolve(Tier::Miss));

        let judgement = f.judge.on_lane_press(0, 1.1).unwrap();
        assert_eq!(judgement.index, 1);
        assert_eq!(judgement.tier, Tier::Great);
    }

    #[test]
    fn test_press_before_anchor_ignored() {
        let f = fixture(vec![note(0, 0.0)], 0.0);
        assert!(f.judge.press(0).is_none());

        f.judge.anchor().anchor_at(0.0).unwrap();
        assert_eq!(f.judge.press(0).unwrap().tier, Tier::Perfect);
    }
}
