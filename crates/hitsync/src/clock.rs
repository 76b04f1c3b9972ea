//! Device clock and song-time anchor.
//!
//! All timing flows from a single monotonic device clock. The session
//! publishes one anchor instant on that clock; song time is always
//! `device_now - anchor`, recomputed on every read, so nothing drifts with
//! frame rate or scheduling delays.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::error::{Error, Result};

/// Monotonic time source in seconds, usually an audio device's DSP clock.
pub trait DeviceClock: Send + Sync {
    fn now(&self) -> f64;
}

/// [`DeviceClock`] backed by [`Instant`], counting from its creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceClock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to. Shared between threads by reference.
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(seconds: f64) -> Self {
        Self {
            bits: AtomicU64::new(seconds.to_bits()),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        let _ = self
            .bits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                Some((f64::from_bits(bits) + seconds).to_bits())
            });
    }
}

impl DeviceClock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// The instant on the device clock at which song position zero occurs.
///
/// Set exactly once; every reader derives song time from it.
pub struct AnchorClock {
    device: Arc<dyn DeviceClock>,
    anchor: OnceLock<f64>,
}

impl AnchorClock {
    pub fn new(device: Arc<dyn DeviceClock>) -> Self {
        Self {
            device,
            anchor: OnceLock::new(),
        }
    }

    /// Place song position zero `lead` seconds after the current device time.
    pub fn anchor_in(&self, lead: f64) -> Result<f64> {
        let instant = self.device.now() + lead.max(0.0);
        self.anchor_at(instant)
    }

    pub fn anchor_at(&self, instant: f64) -> Result<f64> {
        self.anchor
            .set(instant)
            .map_err(|_| Error::AlreadyStarted)?;
        Ok(instant)
    }

    pub fn anchor(&self) -> Option<f64> {
        self.anchor.get().copied()
    }

    pub fn device_now(&self) -> f64 {
        self.device.now()
    }

    /// Current song time, or `None` before the anchor is published.
    pub fn song_time(&self) -> Option<f64> {
        self.anchor().map(|anchor| self.device.now() - anchor)
    }

    /// Device time corresponding to a song time.
    pub fn device_time_of(&self, song_time: f64) -> Option<f64> {
        self.anchor().map(|anchor| anchor + song_time)
    }
}

impl std::fmt::Debug for AnchorClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorClock")
            .field("anchor", &self.anchor())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1.0);
        clock.advance(0.5);
        assert_eq!(clock.now(), 1.5);
        clock.set(10.0);
        assert_eq!(clock.now(), 10.0);
    }

    #[test]
    fn test_monotonic_clock_moves_forward() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_song_time_unset_before_anchor() {
        let anchor = AnchorClock::new(Arc::new(ManualClock::new(3.0)));
        assert_eq!(anchor.song_time(), None);
    }

    #[test]
    fn test_song_time_relative_to_anchor() {
        let device = Arc::new(ManualClock::new(10.0));
        let anchor = AnchorClock::new(device.clone());

        assert_eq!(anchor.anchor_in(0.5).unwrap(), 10.5);
        assert_eq!(anchor.song_time(), Some(-0.5));

        device.set(12.0);
        assert_eq!(anchor.song_time(), Some(1.5));
        assert_eq!(anchor.device_time_of(2.0), Some(12.5));
    }

    #[test]
    fn test_anchor_set_once() {
        let anchor = AnchorClock::new(Arc::new(ManualClock::new(0.0)));
        anchor.anchor_at(1.0).unwrap();
        assert!(matches!(anchor.anchor_at(2.0), Err(Error::AlreadyStarted)));
        assert_eq!(anchor.anchor(), Some(1.0));
    }
}
