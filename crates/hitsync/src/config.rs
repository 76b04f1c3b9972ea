//! Session configuration.
//!
//! Everything a session needs is passed in explicitly at construction:
//! the level being played, the hit windows, timing constants and the lane
//! geometry. There is no process-wide selection state.
//!
//! ## Example
//!
//! ```ignore
//! use hitsync::config::{HitWindows, SessionConfig};
//!
//! let config = SessionConfig::builder()
//!     .level_id("sakura")
//!     .windows(HitWindows::new(0.04, 0.08, 0.12, 0.14))
//!     .global_offset(0.012)
//!     .build();
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schedule::Vec2;

/// Judgement windows in seconds, measured as `|press - (hit_time + offset)|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitWindows {
    pub perfect: f64,
    pub great: f64,
    pub early: f64,
    pub late: f64,
}

impl Default for HitWindows {
    fn default() -> Self {
        Self {
            perfect: 0.05,
            great: 0.10,
            early: 0.15,
            late: 0.15,
        }
    }
}

impl HitWindows {
    pub fn new(perfect: f64, great: f64, early: f64, late: f64) -> Self {
        Self {
            perfect,
            great,
            early,
            late,
        }
    }

    /// Widest window on either side of the hit time.
    pub fn widest(&self) -> f64 {
        self.early.max(self.late)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("perfect", self.perfect),
            ("great", self.great),
            ("early", self.early),
            ("late", self.late),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveWindow { name, value });
            }
        }

        if self.perfect > self.great || self.great > self.early || self.great > self.late {
            return Err(ConfigError::WindowOrder {
                perfect: self.perfect,
                great: self.great,
                early: self.early,
                late: self.late,
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Seconds a note travels before its hit time when the chart gives no spawn time
    pub travel_time: f64,
    /// Added to every note's hit time before judging (input/audio latency calibration)
    pub global_offset: f64,
    /// Delay between starting the session and song position zero
    pub start_lead: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            travel_time: 1.5,
            global_offset: 0.0,
            start_lead: 0.5,
        }
    }
}

/// Where a lane's notes end up, and where they come from relative to that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneGeometry {
    pub hit_zone: Vec2,
    pub spawn_offset: Vec2,
}

impl LaneGeometry {
    pub fn start(&self) -> Vec2 {
        self.hit_zone + self.spawn_offset
    }

    pub fn end(&self) -> Vec2 {
        self.hit_zone
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneLayout {
    pub arc_amplitude: f64,
    pub lanes: Vec<LaneGeometry>,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self {
            arc_amplitude: 120.0,
            lanes: vec![
                LaneGeometry {
                    hit_zone: Vec2::new(-300.0, 0.0),
                    spawn_offset: Vec2::new(-800.0, 0.0),
                },
                LaneGeometry {
                    hit_zone: Vec2::new(300.0, 0.0),
                    spawn_offset: Vec2::new(800.0, 0.0),
                },
            ],
        }
    }
}

impl LaneLayout {
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }
}

/// Configuration for a single play session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Key under which final statistics are persisted
    pub level_id: String,
    pub windows: HitWindows,
    pub timing: TimingConfig,
    pub layout: LaneLayout,
    /// Reject charts whose notes are not listed in hit-time order
    pub strict_ordering: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            level_id: String::from("default"),
            windows: HitWindows::default(),
            timing: TimingConfig::default(),
            layout: LaneLayout::default(),
            strict_ordering: false,
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    pub fn lane_count(&self) -> usize {
        self.layout.lane_count()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.windows.validate()?;

        if self.layout.lanes.is_empty() {
            return Err(ConfigError::NoLanes);
        }

        let travel = self.timing.travel_time;
        if !travel.is_finite() || travel <= 0.0 {
            return Err(ConfigError::InvalidTravelTime(travel));
        }

        let offset = self.timing.global_offset;
        if !offset.is_finite() {
            return Err(ConfigError::InvalidOffset(offset));
        }

        Ok(())
    }
}

/// Builder for SessionConfig
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    level_id: Option<String>,
    windows: Option<HitWindows>,
    travel_time: Option<f64>,
    global_offset: Option<f64>,
    start_lead: Option<f64>,
    layout: Option<LaneLayout>,
    strict_ordering: Option<bool>,
}

impl SessionConfigBuilder {
    pub fn level_id<S: Into<String>>(mut self, id: S) -> Self {
        self.level_id = Some(id.into());
        self
    }

    pub fn windows(mut self, windows: HitWindows) -> Self {
        self.windows = Some(windows);
        self
    }

    pub fn travel_time(mut self, seconds: f64) -> Self {
        self.travel_time = Some(seconds);
        self
    }

    pub fn global_offset(mut self, seconds: f64) -> Self {
        self.global_offset = Some(seconds);
        self
    }

    pub fn start_lead(mut self, seconds: f64) -> Self {
        self.start_lead = Some(seconds);
        self
    }

    pub fn layout(mut self, layout: LaneLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn strict_ordering(mut self, enabled: bool) -> Self {
        self.strict_ordering = Some(enabled);
        self
    }

    /// Build the configuration. Validation happens when the session is created.
    pub fn build(self) -> SessionConfig {
        let default = SessionConfig::default();
        SessionConfig {
            level_id: self.level_id.unwrap_or(default.level_id),
            windows: self.windows.unwrap_or(default.windows),
            timing: TimingConfig {
                travel_time: self.travel_time.unwrap_or(default.timing.travel_time),
                global_offset: self.global_offset.unwrap_or(default.timing.global_offset),
                start_lead: self.start_lead.unwrap_or(default.timing.start_lead),
            },
            layout: self.layout.unwrap_or(default.layout),
            strict_ordering: self.strict_ordering.unwrap_or(default.strict_ordering),
        }
    }
}
