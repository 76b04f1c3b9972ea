//! CLI command implementations.

pub mod autoplay;
pub mod check;
pub mod play;
pub mod scores;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hitsync::{
    Chart, ChartOptions, DeviceClock, DirectoryAudioResolver, JsonScoreStore, Session,
    SessionConfig, SpriteCatalog, UiSink,
};
use tracing::{debug, warn};

use crate::config::AppConfig;

/// Longest sleep of the session loop between ticks
pub const FRAME: Duration = Duration::from_millis(16);

/// Level id for a chart: the explicit one, else the chart's file stem.
pub fn level_id_for(chart_path: &Path, level: Option<&str>) -> String {
    if let Some(level) = level {
        return level.to_string();
    }
    chart_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("default")
        .to_string()
}

pub fn load_chart(config: &SessionConfig, chart_path: &Path) -> Result<Chart> {
    Chart::load(chart_path, &ChartOptions::from(config))
        .with_context(|| format!("Failed to load chart {}", chart_path.display()))
}

fn sprite_catalog(app: &AppConfig) -> SpriteCatalog {
    let Some(dir) = &app.paths.sprite_dir else {
        return SpriteCatalog::new();
    };
    match SpriteCatalog::from_dir(dir) {
        Ok(catalog) => {
            debug!("Registered {} sprites from {}", catalog.len(), dir.display());
            catalog
        }
        Err(e) => {
            warn!("Failed to read sprite directory {}: {}", dir.display(), e);
            SpriteCatalog::new()
        }
    }
}

/// A ready-to-start session plus the store its score will be written to.
pub struct Prepared {
    pub session: Session,
    pub level_id: String,
    pub store: Arc<JsonScoreStore>,
}

pub fn prepare_session(
    app: &AppConfig,
    chart_path: &Path,
    level: Option<&str>,
    clock: Arc<dyn DeviceClock>,
    ui: Arc<dyn UiSink>,
) -> Result<Prepared> {
    let level_id = level_id_for(chart_path, level);
    let config = app.session_config(&level_id);
    let chart = load_chart(&config, chart_path)?;

    let audio = DirectoryAudioResolver::new(app.audio_dir(chart_path));
    let store = Arc::new(JsonScoreStore::new(app.scores_path()));

    let session = Session::new(
        config,
        chart,
        clock,
        &audio,
        &sprite_catalog(app),
        store.clone(),
        ui,
    )?;

    Ok(Prepared {
        session,
        level_id,
        store,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_id_for() {
        assert_eq!(level_id_for(Path::new("levels/sakura.json"), None), "sakura");
        assert_eq!(
            level_id_for(Path::new("levels/sakura.json"), Some("stage1")),
            "stage1"
        );
    }

    #[test]
    fn test_prepare_session_requires_audio() {
        let dir = tempfile::tempdir().unwrap();
        let chart_path = dir.path().join("sakura.json");
        std::fs::write(
            &chart_path,
            r#"{"songName": "sakura", "notes": [{"time": 1.0, "lane": 0}]}"#,
        )
        .unwrap();

        let mut app = AppConfig::default();
        app.paths.scores_file = Some(dir.path().join("scores.json"));
        let clock: Arc<dyn DeviceClock> = Arc::new(hitsync::ManualClock::new(0.0));

        let missing = prepare_session(
            &app,
            &chart_path,
            None,
            clock.clone(),
            Arc::new(hitsync::NullUi),
        );
        assert!(missing.is_err());

        std::fs::write(dir.path().join("sakura.ogg"), b"OggS").unwrap();
        let prepared =
            prepare_session(&app, &chart_path, None, clock, Arc::new(hitsync::NullUi)).unwrap();
        assert_eq!(prepared.level_id, "sakura");
        assert_eq!(prepared.session.chart().len(), 1);
        assert_eq!(prepared.store.path(), dir.path().join("scores.json"));
    }
}
