use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::chart::TrajectoryKind;

/// Screen-space point, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn lerp(self, to: Vec2, t: f64) -> Vec2 {
        self + (to - self) * t
    }

    /// Unit normal of `self`, oriented towards screen-up (+y).
    ///
    /// Vertical travel has no up side; the normal then points towards +x.
    fn upward_normal(self) -> Vec2 {
        let len = self.length();
        if len == 0.0 {
            return Vec2::ZERO;
        }
        let n = Vec2::new(-self.y / len, self.x / len);
        if n.y < 0.0 || (n.y == 0.0 && n.x < 0.0) {
            n * -1.0
        } else {
            n
        }
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Vec2> for [f64; 2] {
    fn from(v: Vec2) -> Self {
        [v.x, v.y]
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Fraction of the travel completed at `song_time`, clamped to `[0, 1]`.
///
/// A note whose spawn and hit times coincide is treated as already arrived.
pub fn progress(song_time: f64, spawn_time: f64, hit_time: f64) -> f64 {
    let duration = hit_time - spawn_time;
    if duration <= 0.0 {
        return 1.0;
    }
    ((song_time - spawn_time) / duration).clamp(0.0, 1.0)
}

/// Position along a trajectory at the given progress.
///
/// Arcs add `amplitude * sin(pi * progress)` along the upward normal of the
/// travel direction, so both endpoints sit on the straight line.
pub fn position(
    kind: TrajectoryKind,
    start: Vec2,
    end: Vec2,
    amplitude: f64,
    progress: f64,
) -> Vec2 {
    let p = progress.clamp(0.0, 1.0);
    let base = start.lerp(end, p);

    let sign = match kind {
        TrajectoryKind::Linear => return base,
        TrajectoryKind::ArcUp => 1.0,
        TrajectoryKind::ArcDown => -1.0,
    };

    let normal = (end - start).upward_normal();
    base + normal * (sign * amplitude * (PI * p).sin())
}
