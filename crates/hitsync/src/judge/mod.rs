//! Judgement tiers and the press-to-note matching engine.

mod engine;
mod slot;

pub use engine::*;
pub use slot::*;

use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr, IntoStaticStr};

use crate::config::HitWindows;

/// Slack added to every window edge so that decimal window values
/// (0.05, 0.1, ...) stay inclusive after floating point subtraction.
pub const WINDOW_TOLERANCE: f64 = 1e-9;

/// Accuracy classification of a resolved note.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    IntoStaticStr,
    Display,
)]
#[repr(u8)]
pub enum Tier {
    #[strum(serialize = "PERFECT")]
    Perfect = 1,
    #[strum(serialize = "GREAT")]
    Great = 2,
    #[strum(serialize = "EARLY")]
    Early = 3,
    #[strum(serialize = "LATE")]
    Late = 4,
    #[strum(serialize = "MISS")]
    Miss = 5,
}

impl Tier {
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::from_repr(value)
    }

    pub fn points(&self) -> u32 {
        match self {
            Self::Perfect => 150,
            Self::Great => 125,
            Self::Early | Self::Late => 100,
            Self::Miss => 0,
        }
    }

    /// Accuracy lost for this tier, in percent of one note.
    pub fn penalty(&self) -> f64 {
        match self {
            Self::Perfect => 0.0,
            Self::Great => 25.0,
            Self::Early | Self::Late => 50.0,
            Self::Miss => 100.0,
        }
    }

    pub fn is_hit(&self) -> bool {
        !matches!(self, Self::Miss)
    }

    pub fn short_name(&self) -> &'static str {
        self.into()
    }
}

/// Classify a timing difference (`press - target`, negative = early).
///
/// Windows are closed intervals checked narrowest first. Returns `None`
/// when the press is outside every window.
pub fn classify(diff: f64, windows: &HitWindows) -> Option<Tier> {
    let distance = diff.abs();

    if distance <= windows.perfect + WINDOW_TOLERANCE {
        Some(Tier::Perfect)
    } else if distance <= windows.great + WINDOW_TOLERANCE {
        Some(Tier::Great)
    } else if diff < 0.0 && distance <= windows.early + WINDOW_TOLERANCE {
        Some(Tier::Early)
    } else if diff > 0.0 && distance <= windows.late + WINDOW_TOLERANCE {
        Some(Tier::Late)
    } else {
        None
    }
}

/// Outcome of a successful press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Judgement {
    pub index: usize,
    pub lane: usize,
    pub tier: Tier,
    /// `press - (hit_time + offset)` in seconds
    pub diff: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn windows() -> HitWindows {
        HitWindows::new(0.05, 0.10, 0.15, 0.20)
    }

    #[test]
    fn test_classify_exact() {
        assert_eq!(classify(0.0, &windows()), Some(Tier::Perfect));
    }

    #[test]
    fn test_classify_boundaries_inclusive() {
        let w = windows();
        assert_eq!(classify(0.05, &w), Some(Tier::Perfect));
        assert_eq!(classify(-0.05, &w), Some(Tier::Perfect));
        assert_eq!(classify(0.10, &w), Some(Tier::Great));
        assert_eq!(classify(-0.15, &w), Some(Tier::Early));
        assert_eq!(classify(0.20, &w), Some(Tier::Late));
    }

    #[test]
    fn test_classify_boundary_from_subtraction() {
        // 1.05 - 1.0 is slightly above 0.05 in binary floating point
        let diff = 1.05 - 1.0;
        assert!(diff > 0.05);
        assert_eq!(classify(diff, &windows()), Some(Tier::Perfect));
    }

    #[test]
    fn test_classify_sides() {
        let w = windows();
        assert_eq!(classify(-0.12, &w), Some(Tier::Early));
        assert_eq!(classify(0.12, &w), Some(Tier::Late));
        // Late window is wider than the early one
        assert_eq!(classify(-0.18, &w), None);
        assert_eq!(classify(0.18, &w), Some(Tier::Late));
        assert_eq!(classify(0.25, &w), None);
    }

    #[test]
    fn test_tier_scoring() {
        assert_eq!(Tier::Perfect.points(), 150);
        assert_eq!(Tier::Great.points(), 125);
        assert_eq!(Tier::Early.points(), 100);
        assert_eq!(Tier::Late.points(), 100);
        assert_eq!(Tier::Miss.points(), 0);
        assert_eq!(Tier::Perfect.penalty(), 0.0);
        assert!(Tier::Great.penalty() < Tier::Late.penalty());
        assert!(!Tier::Miss.is_hit());
    }

    #[test]
    fn test_tier_repr_roundtrip() {
        for tier in [Tier::Perfect, Tier::Great, Tier::Early, Tier::Late, Tier::Miss] {
            assert_eq!(Tier::from_u8(tier as u8), Some(tier));
        }
        assert_eq!(Tier::from_u8(0), None);
        assert_eq!(Tier::Late.to_string(), "LATE");
    }
}
