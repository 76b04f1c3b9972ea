//! Prelude module for convenient imports
//!
//! # Usage
//!
//! ```ignore
//! use hitsync::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Session setup: `Session`, `SessionConfig`, `HitWindows`, `Chart`, `ChartOptions`
//! - Clocks and stopping: `MonotonicClock`, `DeviceClock`, `StopSignal`, `Duration`
//! - Collaborators: `DirectoryAudioResolver`, `SpriteCatalog`, `JsonScoreStore`, `UiSink`
//! - Results: `Tier`, `Judgement`, `SessionStats`
//! - Error handling: `Error`, `Result`

// Session setup
pub use crate::chart::{Chart, ChartOptions};
pub use crate::config::{HitWindows, SessionConfig};
pub use crate::session::Session;

// Clocks and stopping
pub use crate::clock::{DeviceClock, MonotonicClock};
pub use crate::signal::StopSignal;
pub use std::time::Duration;

// Collaborators
pub use crate::assets::{AudioResolver, DirectoryAudioResolver, SpriteCatalog, SpriteResolver};
pub use crate::persist::{JsonScoreStore, ScoreRecord, ScoreSink};
pub use crate::ui::{NullUi, UiSink, UiSnapshot};

// Results
pub use crate::judge::{Judge, Judgement, Tier};
pub use crate::stats::SessionStats;

// Error handling
pub use crate::error::{Error, Result};
