//! Chart validation command.

use std::path::Path;

use anyhow::Result;
use hitsync::{AudioResolver, Chart, DirectoryAudioResolver, TrajectoryKind};

use super::{level_id_for, load_chart};
use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSummary {
    pub song_name: String,
    pub notes: usize,
    pub per_lane: Vec<usize>,
    pub first_hit: Option<f64>,
    pub last_hit: Option<f64>,
    pub linear: usize,
    pub arcs: usize,
    /// Smallest gap between consecutive hit times within one lane
    pub tightest_gap: Option<f64>,
}

impl ChartSummary {
    pub fn new(chart: &Chart, lane_count: usize) -> Self {
        let lanes = chart.lane_index(lane_count);
        let hits = || chart.notes().iter().map(|note| note.hit_time);

        let tightest_gap = lanes
            .iter()
            .flat_map(|indices| {
                let mut times: Vec<f64> = indices
                    .iter()
                    .filter_map(|&i| chart.get(i).map(|note| note.hit_time))
                    .collect();
                times.sort_by(f64::total_cmp);
                times.windows(2).map(|w| w[1] - w[0]).collect::<Vec<_>>()
            })
            .min_by(f64::total_cmp);

        let linear = chart
            .notes()
            .iter()
            .filter(|note| note.trajectory == TrajectoryKind::Linear)
            .count();

        Self {
            song_name: chart.song_name().to_string(),
            notes: chart.len(),
            per_lane: lanes.iter().map(Vec::len).collect(),
            first_hit: hits().min_by(f64::total_cmp),
            last_hit: hits().max_by(f64::total_cmp),
            linear,
            arcs: chart.len() - linear,
            tightest_gap,
        }
    }
}

/// Load a chart, report problems and print a summary
pub fn run(app: &AppConfig, chart_path: &Path, strict: bool) -> Result<()> {
    let mut config = app.session_config(&level_id_for(chart_path, None));
    config.strict_ordering |= strict;
    config.validate()?;

    let chart = load_chart(&config, chart_path)?;
    let summary = ChartSummary::new(&chart, config.lane_count());

    println!("Chart:       {}", chart_path.display());
    println!("Song:        {}", summary.song_name);
    println!("Notes:       {}", summary.notes);
    for (lane, count) in summary.per_lane.iter().enumerate() {
        println!("  Lane {}:    {}", lane, count);
    }
    if let (Some(first), Some(last)) = (summary.first_hit, summary.last_hit) {
        println!("Hit times:   {:.3}s - {:.3}s", first, last);
    }
    println!("Trajectory:  {} linear, {} arc", summary.linear, summary.arcs);
    if let Some(gap) = summary.tightest_gap {
        println!("Tightest:    {:.0} ms between notes in one lane", gap * 1000.0);
        if gap < config.windows.widest() * 2.0 {
            println!("             (press windows overlap)");
        }
    }

    let audio = DirectoryAudioResolver::new(app.audio_dir(chart_path));
    match audio.resolve_clip(&summary.song_name) {
        Ok(handle) => match handle.path {
            Some(path) => println!("Audio:       {}", path.display()),
            None => println!("Audio:       found"),
        },
        Err(e) => println!("Audio:       {} (sessions will not start)", e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hitsync::ChartNote;

    #[test]
    fn test_summary() {
        let chart = Chart::new(
            "sakura",
            vec![
                ChartNote::new(0, 0.0, 1.0),
                ChartNote::new(1, 0.0, 1.5).with_trajectory(TrajectoryKind::ArcUp),
                ChartNote::new(0, 0.0, 1.25),
                ChartNote::new(1, 0.5, 2.5).with_trajectory(TrajectoryKind::ArcDown),
            ],
        );

        let summary = ChartSummary::new(&chart, 2);
        assert_eq!(summary.song_name, "sakura");
        assert_eq!(summary.notes, 4);
        assert_eq!(summary.per_lane, vec![2, 2]);
        assert_eq!(summary.first_hit, Some(1.0));
        assert_eq!(summary.last_hit, Some(2.5));
        assert_eq!(summary.linear, 2);
        assert_eq!(summary.arcs, 2);
        assert_eq!(summary.tightest_gap, Some(0.25));
    }

    #[test]
    fn test_summary_empty_chart() {
        let summary = ChartSummary::new(&Chart::new("s", vec![]), 2);
        assert_eq!(summary.per_lane, vec![0, 0]);
        assert_eq!(summary.first_hit, None);
        assert_eq!(summary.tightest_gap, None);
    }

    #[test]
    fn test_strict_check_rejects_unordered_chart() {
        let dir = tempfile::tempdir().unwrap();
        let chart_path = dir.path().join("messy.json");
        std::fs::write(
            &chart_path,
            r#"{"songName": "messy", "notes": [{"time": 2.0, "lane": 0}, {"time": 1.0, "lane": 1}]}"#,
        )
        .unwrap();

        let app = AppConfig::default();
        assert!(run(&app, &chart_path, false).is_ok());
        assert!(run(&app, &chart_path, true).is_err());
    }
}
