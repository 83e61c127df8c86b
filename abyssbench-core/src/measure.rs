//! Timing
//!
//! Wall-clock timing on the monotonic clock.

use std::time::{Duration, Instant};

/// Timer bracketing exactly one invocation.
///
/// Nothing but the clock reads happens between `start` and `stop`.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return the elapsed wall time
    #[inline(always)]
    pub fn stop(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_brackets_sleep() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(10));
        let elapsed = timer.stop();

        assert!(elapsed >= Duration::from_millis(10));
        // Generous upper bound for loaded CI machines
        assert!(elapsed < Duration::from_millis(500));
    }

    #[test]
    fn test_consecutive_stops_are_monotonic() {
        let timer = Timer::start();
        let first = timer.stop();
        let second = timer.stop();
        assert!(second >= first);
    }
}
