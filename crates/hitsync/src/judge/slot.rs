use std::sync::atomic::{AtomicU8, Ordering};

use super::Tier;
use crate::chart::{Chart, ChartNote};

const UNJUDGED: u8 = 0;

/// Per-note resolution flag.
///
/// Starts unjudged and can be flipped exactly once; every later attempt
/// fails. The judgement engine and the expiry path both go through
/// [`NoteSlot::try_resolve`], so whichever gets there first owns the outcome.
#[derive(Debug, Default)]
pub struct NoteSlot {
    state: AtomicU8,
}

impl NoteSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt the single unjudged -> `tier` transition.
    pub fn try_resolve(&self, tier: Tier) -> bool {
        self.state
            .compare_exchange(UNJUDGED, tier as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_resolved(&self) -> bool {
        self.state.load(Ordering::Acquire) != UNJUDGED
    }

    pub fn resolution(&self) -> Option<Tier> {
        Tier::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// The chart together with one [`NoteSlot`] per note, indexed by lane.
#[derive(Debug)]
pub struct Playfield {
    chart: Chart,
    slots: Vec<NoteSlot>,
    lanes: Vec<Vec<usize>>,
}

impl Playfield {
    pub fn new(chart: Chart, lane_count: usize) -> Self {
        let slots = (0..chart.len()).map(|_| NoteSlot::new()).collect();
        let lanes = chart.lane_index(lane_count);
        Self {
            chart,
            slots,
            lanes,
        }
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn note(&self, index: usize) -> Option<&ChartNote> {
        self.chart.get(index)
    }

    pub fn slot(&self, index: usize) -> Option<&NoteSlot> {
        self.slots.get(index)
    }

    /// Indices of every note in `lane`, or `None` for an unknown lane.
    pub fn lane(&self, lane: usize) -> Option<&[usize]> {
        self.lanes.get(lane).map(Vec::as_slice)
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn unresolved(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_resolved()).count()
    }
}
