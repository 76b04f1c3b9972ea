//! Score persistence.
//!
//! The engine hands final statistics to a [`ScoreSink`] once per session and
//! never waits for an answer. [`JsonScoreStore`] is a small key-value file
//! keyed by level id; each save replaces the previous record for that level.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::stats::SessionStats;

/// What is kept per level after a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: u64,
    pub accuracy: f64,
    pub max_combo: u32,
    pub recorded_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn from_stats(stats: &SessionStats) -> Self {
        Self {
            score: stats.score,
            accuracy: stats.accuracy,
            max_combo: stats.max_combo,
            recorded_at: Utc::now(),
        }
    }
}

/// Fire-and-forget destination for final statistics.
pub trait ScoreSink: Send + Sync {
    fn save(&self, level_id: &str, record: &ScoreRecord);
}

/// In-memory sink that also counts saves
#[derive(Debug, Default)]
pub struct MemoryScoreSink {
    inner: Mutex<(usize, HashMap<String, ScoreRecord>)>,
}

impl MemoryScoreSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, level_id: &str) -> Option<ScoreRecord> {
        self.lock().1.get(level_id).cloned()
    }

    /// Total number of `save` calls received
    pub fn saves(&self) -> usize {
        self.lock().0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, (usize, HashMap<String, ScoreRecord>)> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScoreSink for MemoryScoreSink {
    fn save(&self, level_id: &str, record: &ScoreRecord) {
        let mut inner = self.lock();
        inner.0 += 1;
        inner.1.insert(level_id.to_string(), record.clone());
    }
}

/// JSON file of `level id -> ScoreRecord`
#[derive(Debug)]
pub struct JsonScoreStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonScoreStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored record. A missing file is an empty store.
    pub fn load(&self) -> Result<BTreeMap<String, ScoreRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Score file {} not found, starting empty", self.path.display());
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&content)?)
    }

    pub fn get(&self, level_id: &str) -> Result<Option<ScoreRecord>> {
        Ok(self.load()?.remove(level_id))
    }

    /// Store a record, replacing any previous one for the level.
    pub fn put(&self, level_id: &str, record: &ScoreRecord) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = self.load()?;
        records.insert(level_id.to_string(), record.clone());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&records)?;
        fs::write(&self.path, content)?;
        info!("Saved score for `{}` to {}", level_id, self.path.display());
        Ok(())
    }
}

impl ScoreSink for JsonScoreStore {
    fn save(&self, level_id: &str, record: &ScoreRecord) {
        if let Err(e) = self.put(level_id, record) {
            warn!("Failed to save score for `{}`: {}", level_id, e);
        }
    }
}
