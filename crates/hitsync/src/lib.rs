//! # hitsync
//!
//! Timing engine for two-lane rhythm-action play.
//!
//! This crate provides:
//! - Chart loading and validation (notes, lanes, trajectories)
//! - A song clock anchored to a monotonic device clock
//! - Press-to-note judgement with tiered hit windows
//! - Note lifecycle scheduling and trajectory sampling
//! - Score, combo and accuracy tracking with one-shot persistence
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hitsync::prelude::*;
//!
//! let config = SessionConfig::builder().level_id("sakura").build();
//! let chart = Chart::load("levels/sakura.json", &ChartOptions::from(&config))?;
//! let mut session = Session::new(
//!     config,
//!     chart,
//!     Arc::new(MonotonicClock::new()),
//!     &DirectoryAudioResolver::new("audio"),
//!     &SpriteCatalog::new(),
//!     Arc::new(JsonScoreStore::new("scores.json")),
//!     Arc::new(NullUi),
//! )?;
//!
//! let judge = session.judge();
//! // hand `judge` to the input thread, then:
//! let stats = session.run(&StopSignal::new(), Duration::from_millis(16), |_, _, _| {})?;
//! ```

pub mod assets;
pub mod chart;
pub mod clock;
pub mod config;
pub mod error;
pub mod judge;
pub mod persist;
pub mod prelude;
pub mod schedule;
pub mod session;
pub mod signal;
pub mod stats;
pub mod ui;

pub use assets::{
    AssetHandle, AudioHandle, AudioResolver, DirectoryAudioResolver, NoteVisual, SpriteCatalog,
    SpriteResolver, VisualTable,
};
pub use chart::{Chart, ChartNote, ChartOptions, ChartRecord, NoteRecord, TrajectoryKind};
pub use clock::{AnchorClock, DeviceClock, ManualClock, MonotonicClock};
pub use config::{
    HitWindows, LaneGeometry, LaneLayout, SessionConfig, SessionConfigBuilder, TimingConfig,
};
pub use error::{AssetError, ConfigError, Error, LoadError, Result};
pub use judge::{Judge, Judgement, NoteSlot, Playfield, Tier, classify};
pub use persist::{JsonScoreStore, MemoryScoreSink, ScoreRecord, ScoreSink};
pub use schedule::{Lifecycle, NotePosition, Phase, Scheduler, TickReport, Vec2};
pub use session::Session;
pub use signal::StopSignal;
pub use stats::{SessionStats, StatsTracker, TierCounts};
pub use ui::{NullUi, UiSink, UiSnapshot};
