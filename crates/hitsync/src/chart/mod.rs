//! Chart model.
//!
//! A [`Chart`] is loaded once per level and never mutated afterwards.
//! Notes keep the order of the source record; that order carries no meaning
//! beyond giving every note a stable index.

mod note;
mod source;

pub use note::*;
pub use source::*;

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::LoadError;

/// Frozen set of notes for one song.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    song_name: String,
    notes: Vec<ChartNote>,
}

impl Chart {
    /// Build a chart from already-validated notes.
    pub fn new(song_name: impl Into<String>, notes: Vec<ChartNote>) -> Self {
        Self {
            song_name: song_name.into(),
            notes,
        }
    }

    /// Load a chart from a JSON file
    pub fn load<P: AsRef<Path>>(path: P, options: &ChartOptions) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(path.to_path_buf())
            } else {
                LoadError::malformed(format!("cannot read {}: {}", path.display(), e))
            }
        })?;

        let chart = Self::from_json(&content, options)?;
        info!(
            "Loaded chart `{}` from {} ({} notes)",
            chart.song_name,
            path.display(),
            chart.len()
        );
        Ok(chart)
    }

    pub fn from_json(json: &str, options: &ChartOptions) -> Result<Self, LoadError> {
        let record: ChartRecord = serde_json::from_str(json)
            .map_err(|e| LoadError::malformed(format!("invalid JSON: {e}")))?;
        Self::from_record(&record, options)
    }

    pub fn from_record(record: &ChartRecord, options: &ChartOptions) -> Result<Self, LoadError> {
        let song_name = match record.song_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(LoadError::malformed("missing `songName`")),
        };

        let records = record
            .note_records()
            .ok_or_else(|| LoadError::malformed("missing `notes`"))?;

        let notes = records
            .iter()
            .enumerate()
            .map(|(index, note)| note.to_note(index, options))
            .collect::<Result<Vec<_>, _>>()?;

        if options.strict_ordering {
            check_ordering(&notes)?;
        }

        for (index, note) in notes.iter().enumerate() {
            debug!(
                "Note {}: lane {}, spawn {:.3}, hit {:.3}, {}",
                index, note.lane, note.spawn_time, note.hit_time, note.trajectory
            );
        }

        Ok(Self { song_name, notes })
    }

    pub fn song_name(&self) -> &str {
        &self.song_name
    }

    pub fn notes(&self) -> &[ChartNote] {
        &self.notes
    }

    pub fn get(&self, index: usize) -> Option<&ChartNote> {
        self.notes.get(index)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Hit time of the last note, or zero for an empty chart.
    pub fn last_hit_time(&self) -> f64 {
        self.notes
            .iter()
            .map(|note| note.hit_time)
            .fold(0.0, f64::max)
    }

    /// Note indices grouped by lane, each group in chart order.
    pub fn lane_index(&self, lane_count: usize) -> Vec<Vec<usize>> {
        let mut lanes = vec![Vec::new(); lane_count];
        for (index, note) in self.notes.iter().enumerate() {
            if let Some(lane) = lanes.get_mut(note.lane) {
                lane.push(index);
            }
        }
        lanes
    }
}

fn check_ordering(notes: &[ChartNote]) -> Result<(), LoadError> {
    for (index, pair) in notes.windows(2).enumerate() {
        if pair[1].hit_time < pair[0].hit_time {
            return Err(LoadError::malformed(format!(
                "note {}: hit time {} precedes previous note's {}",
                index + 1,
                pair[1].hit_time,
                pair[0].hit_time
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REFERENCE_LEVEL: &str = r#"
    {
      "songName": "sakura",
      "notesWrapper": {
        "notes": [
          { "time": 1.0, "lane": 0 },
          { "time": 2.0, "lane": 1 },
          { "time": 3.5, "lane": 0 },
          { "time": 4.0, "lane": 1 }
        ]
      }
    }"#;

    fn options() -> ChartOptions {
        ChartOptions::default()
    }

    fn malformed(json: &str) -> bool {
        matches!(
            Chart::from_json(json, &options()),
            Err(LoadError::Malformed(_))
        )
    }

    #[test]
    fn test_wrapped_layout() {
        let chart = Chart::from_json(REFERENCE_LEVEL, &options()).unwrap();
        assert_eq!(chart.song_name(), "sakura");
        assert_eq!(chart.len(), 4);
        assert_eq!(chart.notes()[2].lane, 0);
        assert_eq!(chart.notes()[2].hit_time, 3.5);
        assert_eq!(chart.last_hit_time(), 4.0);
    }

    #[test]
    fn test_flat_layout_with_optional_fields() {
        let json = r#"{
            "songName": "yuki",
            "notes": [
                { "time": 2.0, "spawnTime": 1.25, "lane": 1, "spriteName": "petal",
                  "animationName": "spin", "trajectoryType": 1 }
            ]
        }"#;
        let chart = Chart::from_json(json, &options()).unwrap();
        let note = &chart.notes()[0];
        assert_eq!(note.spawn_time, 1.25);
        assert_eq!(note.trajectory, TrajectoryKind::ArcUp);
        assert_eq!(note.visual_tag.as_deref(), Some("petal"));
        assert_eq!(note.animation_tag.as_deref(), Some("spin"));
    }

    #[test]
    fn test_default_spawn_time_uses_travel_time() {
        let chart = Chart::from_json(REFERENCE_LEVEL, &options()).unwrap();
        // 1.0 - 1.5 clamps to the start of the song
        assert_eq!(chart.notes()[0].spawn_time, 0.0);
        assert_eq!(chart.notes()[1].spawn_time, 0.5);
    }

    #[test]
    fn test_unknown_trajectory_falls_back_to_linear() {
        let json = r#"{"songName":"s","notes":[{"time":1.0,"lane":0,"trajectoryType":9}]}"#;
        let chart = Chart::from_json(json, &options()).unwrap();
        assert_eq!(chart.notes()[0].trajectory, TrajectoryKind::Linear);
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        assert!(malformed(r#"{"notes":[]}"#));
        assert!(malformed(r#"{"songName":"s"}"#));
        assert!(malformed(r#"{"songName":"s","notesWrapper":{}}"#));
        assert!(malformed(r#"{"songName":"s","notes":[{"lane":0}]}"#));
        assert!(malformed(r#"{"songName":"s","notes":[{"time":1.0}]}"#));
    }

    #[test]
    fn test_negative_duration_is_malformed() {
        assert!(malformed(
            r#"{"songName":"s","notes":[{"time":1.0,"spawnTime":1.5,"lane":0}]}"#
        ));
        assert!(malformed(
            r#"{"songName":"s","notes":[{"time":-1.0,"lane":0}]}"#
        ));
        assert!(malformed(
            r#"{"songName":"s","notes":[{"time":1.0,"spawnTime":-0.5,"lane":0}]}"#
        ));
    }

    #[test]
    fn test_lane_out_of_range_is_malformed() {
        assert!(malformed(r#"{"songName":"s","notes":[{"time":1.0,"lane":2}]}"#));
        assert!(malformed(r#"{"songName":"s","notes":[{"time":1.0,"lane":-1}]}"#));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(matches!(
            Chart::from_json("{ not json", &options()),
            Err(LoadError::Malformed(reason)) if reason.starts_with("invalid JSON")
        ));
        // Wrong field type
        assert!(malformed(r#"{"songName":"s","notes":[{"time":"one","lane":0}]}"#));
        assert!(malformed(r#"{"songName":"s","notes":{"time":1.0}}"#));
    }

    #[test]
    fn test_unordered_allowed_unless_strict() {
        let json = r#"{"songName":"s","notes":[{"time":2.0,"lane":0},{"time":1.0,"lane":1}]}"#;
        assert!(Chart::from_json(json, &options()).is_ok());

        let strict = ChartOptions {
            strict_ordering: true,
            ..options()
        };
        assert!(matches!(
            Chart::from_json(json, &strict),
            Err(LoadError::Malformed(_))
        ));
    }

    #[test]
    fn test_lane_index() {
        let chart = Chart::from_json(REFERENCE_LEVEL, &options()).unwrap();
        let lanes = chart.lane_index(2);
        assert_eq!(lanes, vec![vec![0, 2], vec![1, 3]]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(REFERENCE_LEVEL.as_bytes()).unwrap();

        let chart = Chart::load(file.path(), &options()).unwrap();
        assert_eq!(chart.len(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(matches!(
            Chart::load(&path, &options()),
            Err(LoadError::NotFound(p)) if p == path
        ));
    }
}
