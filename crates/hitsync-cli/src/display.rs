//! Console output for sessions and score records.

use std::collections::BTreeMap;
use std::io::{self, Write};

use hitsync::{ScoreRecord, SessionStats, Tier, UiSink, UiSnapshot};
use owo_colors::OwoColorize;

/// Prints judgement feedback as it happens.
///
/// Lines end in `\r\n` so they stay aligned while the terminal is in raw mode.
#[derive(Debug, Default)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }
}

impl UiSink for ConsoleUi {
    fn publish(&self, snapshot: &UiSnapshot) {
        let line = format_snapshot(snapshot);
        let mut out = io::stdout().lock();
        let _ = write!(out, "{}\r\n", line);
        let _ = out.flush();
    }
}

fn colored_tier(tier: Tier) -> String {
    let name = format!("{:<7}", tier.to_string());
    match tier {
        Tier::Perfect => name.bright_yellow().bold().to_string(),
        Tier::Great => name.bright_green().to_string(),
        Tier::Early => name.bright_cyan().to_string(),
        Tier::Late => name.bright_magenta().to_string(),
        Tier::Miss => name.red().to_string(),
    }
}

pub fn format_snapshot(snapshot: &UiSnapshot) -> String {
    let tier = match snapshot.last_tier {
        Some(tier) => colored_tier(tier),
        None => format!("{:<7}", ""),
    };
    format!(
        "{}  score {:>7}  combo {:>4}  accuracy {:>6.2}%",
        tier, snapshot.score, snapshot.combo, snapshot.accuracy
    )
}

pub fn format_summary(level_id: &str, stats: &SessionStats) -> String {
    let counts = &stats.counts;
    format!(
        "Level:     {}\n\
         Score:     {}\n\
         Accuracy:  {:.2}%\n\
         Max combo: {}\n\
         Notes:     {}/{} resolved (PERFECT {}, GREAT {}, EARLY {}, LATE {}, MISS {})",
        level_id,
        stats.score,
        stats.accuracy,
        stats.max_combo,
        stats.resolved(),
        stats.total_notes,
        counts.perfect,
        counts.great,
        counts.early,
        counts.late,
        counts.miss
    )
}

pub fn format_records(records: &BTreeMap<String, ScoreRecord>) -> String {
    let width = records.keys().map(|k| k.len()).max().unwrap_or(0).max(5);
    let mut lines = vec![format!(
        "{:<width$}  {:>7}  {:>8}  {:>9}  {}",
        "LEVEL", "SCORE", "ACCURACY", "MAX COMBO", "RECORDED"
    )];
    for (level_id, record) in records {
        lines.push(format!(
            "{:<width$}  {:>7}  {:>7.2}%  {:>9}  {}",
            level_id,
            record.score,
            record.accuracy,
            record.max_combo,
            record.recorded_at.format("%Y-%m-%d %H:%M")
        ));
    }
    lines.join("\n")
}
