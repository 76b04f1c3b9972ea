use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Error for invalid enum value conversion
#[derive(Debug, Error)]
#[error("Invalid {type_name} value: {value}")]
pub struct InvalidEnumValueError {
    type_name: &'static str,
    value: i32,
}

impl InvalidEnumValueError {
    pub fn new(type_name: &'static str, value: i32) -> Self {
        Self { type_name, value }
    }
}

/// Shape of the path a note follows towards its hit zone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, IntoStaticStr, Display,
)]
#[repr(i32)]
pub enum TrajectoryKind {
    #[default]
    #[strum(serialize = "LINEAR")]
    Linear = 0,
    #[strum(serialize = "ARC UP")]
    ArcUp = 1,
    #[strum(serialize = "ARC DOWN")]
    ArcDown = 2,
}

impl TryFrom<i32> for TrajectoryKind {
    type Error = InvalidEnumValueError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Linear),
            1 => Ok(Self::ArcUp),
            2 => Ok(Self::ArcDown),
            _ => Err(InvalidEnumValueError::new("TrajectoryKind", value)),
        }
    }
}

impl TrajectoryKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// A single note of a chart. Identity is its index in [`Chart::notes`](super::Chart::notes).
///
/// Times are seconds of song position (relative to the anchor instant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartNote {
    pub lane: usize,
    pub spawn_time: f64,
    pub hit_time: f64,
    pub trajectory: TrajectoryKind,
    /// Sprite key for the external resolver
    pub visual_tag: Option<String>,
    /// Animation key for the external resolver
    pub animation_tag: Option<String>,
}

impl ChartNote {
    pub fn new(lane: usize, spawn_time: f64, hit_time: f64) -> Self {
        Self {
            lane,
            spawn_time,
            hit_time,
            trajectory: TrajectoryKind::Linear,
            visual_tag: None,
            animation_tag: None,
        }
    }

    pub fn with_trajectory(mut self, trajectory: TrajectoryKind) -> Self {
        self.trajectory = trajectory;
        self
    }

    pub fn with_visual_tag(mut self, tag: impl Into<String>) -> Self {
        self.visual_tag = Some(tag.into());
        self
    }

    pub fn travel_duration(&self) -> f64 {
        self.hit_time - self.spawn_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_try_from_valid() {
        assert_eq!(TrajectoryKind::try_from(0).unwrap(), TrajectoryKind::Linear);
        assert_eq!(TrajectoryKind::try_from(1).unwrap(), TrajectoryKind::ArcUp);
        assert_eq!(TrajectoryKind::try_from(2).unwrap(), TrajectoryKind::ArcDown);
    }

    #[test]
    fn test_trajectory_try_from_invalid() {
        assert!(TrajectoryKind::try_from(3).is_err());
        assert!(TrajectoryKind::try_from(-1).is_err());
    }

    #[test]
    fn test_trajectory_display() {
        assert_eq!(TrajectoryKind::ArcDown.to_string(), "ARC DOWN");
        assert_eq!(TrajectoryKind::Linear.as_str(), "LINEAR");
    }

    #[test]
    fn test_invalid_enum_value_error_display() {
        let err = InvalidEnumValueError::new("TrajectoryKind", 42);
        assert_eq!(format!("{}", err), "Invalid TrajectoryKind value: 42");
    }

    #[test]
    fn test_travel_duration() {
        let note = ChartNote::new(1, 0.5, 2.0).with_visual_tag("star");
        assert_eq!(note.travel_duration(), 1.5);
        assert_eq!(note.visual_tag.as_deref(), Some("star"));
    }
}
