//! Stored score display command.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use hitsync::JsonScoreStore;

use crate::config::AppConfig;
use crate::display;

/// Print stored records, optionally for a single level
pub fn run(app: &AppConfig, level: Option<&str>) -> Result<()> {
    let store = JsonScoreStore::new(app.scores_path());
    let mut records = store
        .load()
        .with_context(|| format!("Failed to read scores from {}", store.path().display()))?;

    if let Some(level) = level {
        let Some(record) = records.remove(level) else {
            println!("No record for `{}`", level);
            return Ok(());
        };
        records = BTreeMap::from([(level.to_string(), record)]);
    }

    if records.is_empty() {
        println!("No records in {}", store.path().display());
        return Ok(());
    }

    println!("{}", display::format_records(&records));
    Ok(())
}
