use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::clock::DeviceClock;

/// Longest single sleep inside [`StopSignal::wait_until`].
///
/// The target clock may run at a different rate than the OS timer, so long
/// waits are split and the clock is re-read after each slice.
pub const MAX_WAIT_SLICE: Duration = Duration::from_millis(50);

/// A stop signal that supports interruptible waits.
///
/// Unlike `thread::sleep()`, waits on this signal can be interrupted
/// immediately when `stop()` is called from another thread.
pub struct StopSignal {
    stopped: AtomicBool,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self {
            stopped: AtomicBool::new(false),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
        }
    }

    /// Trigger the signal, waking all waiting threads.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        // Taking the lock orders this notify after any waiter's predicate check.
        drop(self.mutex.lock());
        self.condvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Wait for the specified duration or until stopped.
    ///
    /// Returns `true` if the signal was stopped, `false` if the wait completed normally.
    pub fn wait(&self, duration: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }

        let guard = match self.mutex.lock() {
            Ok(guard) => guard,
            // Mutex poisoned, treat as stopped
            Err(_) => return true,
        };

        match self
            .condvar
            .wait_timeout_while(guard, duration, |_| !self.is_stopped())
        {
            Ok((_, timeout)) => !timeout.timed_out(),
            Err(_) => true,
        }
    }

    /// Wait until `clock` reads at least `deadline`, or until stopped.
    ///
    /// Wakeups are never trusted to be on time: after every slice the clock
    /// is read again and the remaining time recomputed.
    pub fn wait_until(&self, clock: &dyn DeviceClock, deadline: f64) -> bool {
        loop {
            if self.is_stopped() {
                return true;
            }

            let remaining = deadline - clock.now();
            if remaining <= 0.0 {
                return false;
            }

            let slice = Duration::from_secs_f64(remaining).min(MAX_WAIT_SLICE);
            if self.wait(slice) {
                return true;
            }
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignal")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, MonotonicClock};
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_initial_state() {
        let signal = StopSignal::new();
        assert!(!signal.is_stopped());
    }

    #[test]
    fn test_wait_timeout() {
        let signal = StopSignal::new();
        let start = Instant::now();
        let interrupted = signal.wait(Duration::from_millis(50));

        assert!(!interrupted);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_wait_interrupted() {
        let signal = Arc::new(StopSignal::new());
        let waiter = Arc::clone(&signal);

        let handle = thread::spawn(move || {
            let start = Instant::now();
            let interrupted = waiter.wait(Duration::from_secs(10));
            (interrupted, start.elapsed())
        });

        thread::sleep(Duration::from_millis(50));
        signal.stop();

        let (interrupted, elapsed) = handle.join().unwrap();
        assert!(interrupted);
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn test_wait_until_past_deadline_returns_immediately() {
        let signal = StopSignal::new();
        let clock = ManualClock::new(5.0);
        let start = Instant::now();

        assert!(!signal.wait_until(&clock, 4.0));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_wait_until_follows_clock_not_timer() {
        // The clock jumps forward on another thread; the waiter must notice
        // on its next re-read rather than sleeping out the nominal duration.
        let signal = Arc::new(StopSignal::new());
        let clock = Arc::new(ManualClock::new(0.0));

        let waiter_signal = Arc::clone(&signal);
        let waiter_clock = Arc::clone(&clock);
        let handle = thread::spawn(move || {
            let start = Instant::now();
            let stopped = waiter_signal.wait_until(waiter_clock.as_ref(), 1000.0);
            (stopped, start.elapsed())
        });

        thread::sleep(Duration::from_millis(30));
        clock.set(1000.0);

        let (stopped, elapsed) = handle.join().unwrap();
        assert!(!stopped);
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_wait_until_real_clock() {
        let signal = StopSignal::new();
        let clock = MonotonicClock::new();
        let deadline = clock.now() + 0.03;

        assert!(!signal.wait_until(&clock, deadline));
        assert!(clock.now() >= deadline);
    }

    #[test]
    fn test_wait_until_interrupted() {
        let signal = StopSignal::new();
        signal.stop();
        let clock = ManualClock::new(0.0);
        assert!(signal.wait_until(&clock, 10.0));
    }
}
