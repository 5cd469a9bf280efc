//! Shared clock plumbing and the single-shot timer.
//!
//! Durations are kept in ticks, the smallest unit the clock reports.
//! `std::time::Instant` reports nanoseconds, so one tick is one nanosecond
//! and the frequency is fixed rather than queried at startup.

use std::fmt;
use std::hint::black_box;
use std::time::Instant;

/// Ticks per second of the underlying monotonic clock.
pub const TICKS_PER_SECOND: u64 = 1_000_000_000;

/// Convert a tick count to microseconds.
pub fn ticks_to_micros(ticks: f64) -> f64 {
    (ticks * 1000.0) / (TICKS_PER_SECOND as f64 / 1000.0)
}

/// Convert microseconds back to ticks.
pub fn micros_to_ticks(micros: f64) -> f64 {
    (micros * (TICKS_PER_SECOND as f64 / 1000.0)) / 1000.0
}

/// One elapsed-duration measurement in ticks.
///
/// No warm-up, no repetition, no statistics: exactly one invocation of the
/// action is timed. Uses the same tick unit and conversion formula as the
/// adaptive benchmark, so the two kinds of result are directly comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningTime {
    ticks: u64,
}

impl RunningTime {
    /// Time a single invocation of `action`.
    ///
    /// The action's return value is consumed after the timed region so the
    /// optimizer cannot elide the call.
    pub fn test_now<F, T>(action: F) -> Self
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = action();
        let elapsed = start.elapsed();
        black_box(result);

        Self {
            ticks: elapsed.as_nanos() as u64,
        }
    }

    /// Elapsed time in clock ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Elapsed time in microseconds.
    pub fn as_micros(&self) -> f64 {
        ticks_to_micros(self.ticks as f64)
    }
}

impl fmt::Display for RunningTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Running time = {}µs", self.as_micros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn conversion_round_trip() {
        for &ticks in &[0.0, 1.0, 1234.5, 25_000_000.0] {
            let back = micros_to_ticks(ticks_to_micros(ticks));
            assert!((back - ticks).abs() < 1e-6);
        }
    }

    #[test]
    fn one_tick_is_one_thousandth_of_a_microsecond() {
        assert!((ticks_to_micros(1000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sleep_is_a_lower_bound() {
        let running_time = RunningTime::test_now(|| {
            std::thread::sleep(Duration::from_millis(2));
        });
        assert!(running_time.as_micros() >= 2000.0);
        assert!(running_time.ticks() >= 2_000_000);
    }

    #[test]
    fn display_format() {
        let running_time = RunningTime::test_now(|| 7u32);
        let text = running_time.to_string();
        assert!(text.starts_with("Running time = "));
        assert!(text.ends_with("µs"));
    }
}
