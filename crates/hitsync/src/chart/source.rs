//! Chart source records.
//!
//! Two layouts are accepted:
//!
//! ```json
//! { "songName": "sakura", "notes": [ { "time": 1.0, "lane": 0 } ] }
//! { "songName": "sakura", "notesWrapper": { "notes": [ { "time": 1.0, "lane": 0 } ] } }
//! ```
//!
//! Every note field except `time` and `lane` is optional.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ChartNote, TrajectoryKind};
use crate::error::LoadError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRecord {
    pub song_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<NoteRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_wrapper: Option<NotesWrapper>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotesWrapper {
    pub notes: Option<Vec<NoteRecord>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_time: Option<f64>,
    pub lane: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory_type: Option<i32>,
}

impl ChartRecord {
    /// Notes from whichever layout the record uses. The flat list wins if both are present.
    pub fn note_records(&self) -> Option<&[NoteRecord]> {
        self.notes
            .as_deref()
            .or_else(|| self.notes_wrapper.as_ref()?.notes.as_deref())
    }
}

/// Parameters that shape how records become notes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    /// Default travel time for notes without an explicit spawn time
    pub travel_time: f64,
    pub lane_count: usize,
    /// Require notes to be listed in non-decreasing hit-time order
    pub strict_ordering: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            travel_time: 1.5,
            lane_count: 2,
            strict_ordering: false,
        }
    }
}

impl From<&crate::config::SessionConfig> for ChartOptions {
    fn from(config: &crate::config::SessionConfig) -> Self {
        Self {
            travel_time: config.timing.travel_time,
            lane_count: config.lane_count(),
            strict_ordering: config.strict_ordering,
        }
    }
}

impl NoteRecord {
    pub(crate) fn to_note(
        &self,
        index: usize,
        options: &ChartOptions,
    ) -> Result<ChartNote, LoadError> {
        let time = self
            .time
            .ok_or_else(|| LoadError::malformed(format!("note {index}: missing `time`")))?;
        if !time.is_finite() || time < 0.0 {
            return Err(LoadError::malformed(format!(
                "note {index}: invalid time {time}"
            )));
        }

        let lane = self
            .lane
            .ok_or_else(|| LoadError::malformed(format!("note {index}: missing `lane`")))?;
        if lane < 0 || lane as u64 >= options.lane_count as u64 {
            return Err(LoadError::malformed(format!(
                "note {index}: lane {lane} outside 0..{}",
                options.lane_count
            )));
        }

        let spawn_time = match self.spawn_time {
            Some(spawn) if !spawn.is_finite() || spawn < 0.0 => {
                return Err(LoadError::malformed(format!(
                    "note {index}: invalid spawn time {spawn}"
                )));
            }
            Some(spawn) if spawn > time => {
                return Err(LoadError::malformed(format!(
                    "note {index}: negative travel duration (spawn {spawn} after hit {time})"
                )));
            }
            Some(spawn) => spawn,
            None => (time - options.travel_time).max(0.0),
        };

        let trajectory = match self.trajectory_type {
            None => TrajectoryKind::default(),
            Some(raw) => TrajectoryKind::try_from(raw).unwrap_or_else(|_| {
                warn!("note {}: invalid trajectory type {}, using default", index, raw);
                TrajectoryKind::default()
            }),
        };

        Ok(ChartNote {
            lane: lane as usize,
            spawn_time,
            hit_time: time,
            trajectory,
            visual_tag: self.sprite_name.clone(),
            animation_tag: self.animation_name.clone(),
        })
    }
}
