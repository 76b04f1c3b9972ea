//! Application configuration file.
//!
//! ```toml
//! [session]
//! travel_time = 1.5
//! global_offset = 0.012
//!
//! [session.windows]
//! perfect = 0.05
//! great = 0.10
//!
//! [paths]
//! audio_dir = "audio"
//! scores_file = "scores.json"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hitsync::{HitWindows, LaneLayout, SessionConfig};
use serde::Deserialize;
use tracing::{info, warn};

const SCORES_FILE_NAME: &str = "scores.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionSection,
    pub paths: PathsConfig,
}

/// Session settings shared by every level. The level id comes from the command line.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub windows: HitWindows,
    pub travel_time: f64,
    pub global_offset: f64,
    pub start_lead: f64,
    pub layout: LaneLayout,
    pub strict_ordering: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        let defaults = SessionConfig::default();
        Self {
            windows: defaults.windows,
            travel_time: defaults.timing.travel_time,
            global_offset: defaults.timing.global_offset,
            start_lead: defaults.timing.start_lead,
            layout: defaults.layout,
            strict_ordering: defaults.strict_ordering,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `<songName>.<ext>` audio files; the chart's directory if unset
    pub audio_dir: Option<PathBuf>,
    /// Directory of note sprites, registered by file stem
    pub sprite_dir: Option<PathBuf>,
    pub scores_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load the configuration file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Session configuration for one level
    pub fn session_config(&self, level_id: &str) -> SessionConfig {
        let section = &self.session;
        SessionConfig::builder()
            .level_id(level_id)
            .windows(section.windows)
            .travel_time(section.travel_time)
            .global_offset(section.global_offset)
            .start_lead(section.start_lead)
            .layout(section.layout.clone())
            .strict_ordering(section.strict_ordering)
            .build()
    }

    pub fn audio_dir(&self, chart_path: &Path) -> PathBuf {
        match &self.paths.audio_dir {
            Some(dir) => dir.clone(),
            None => chart_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    /// Score file: configured path, else `<data dir>/hitsync/scores.json`.
    pub fn scores_path(&self) -> PathBuf {
        if let Some(path) = &self.paths.scores_file {
            return path.clone();
        }
        match dirs::data_dir() {
            Some(dir) => dir.join("hitsync").join(SCORES_FILE_NAME),
            None => PathBuf::from(SCORES_FILE_NAME),
        }
    }
}
