//! Process-relative monotonic clock
//!
//! Wraps `std::time::Instant` behind a lazily captured epoch so timestamps can
//! be stored as plain integers. Frame sources stamp frames with `Timestamp::now()`
//! unless the perception service supplies its own capture time.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Epoch all timestamps are measured from, captured on first use
static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Process clock
#[derive(Debug, Clone, Copy)]
pub struct Clock;

impl Clock {
    /// Pin the epoch. Optional; the first `now()` call does the same.
    pub fn init() {
        EPOCH.get_or_init(Instant::now);
    }

    /// Microseconds elapsed since the epoch.
    #[inline]
    pub fn now_micros() -> u64 {
        let epoch = *EPOCH.get_or_init(Instant::now);
        Instant::now().saturating_duration_since(epoch).as_micros() as u64
    }
}

/// A point in time, in microseconds since the process epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from raw microseconds.
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000)
    }

    /// Create a timestamp from fractional seconds. Negative or non-finite
    /// input maps to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            Self((secs * 1_000_000.0) as u64)
        } else {
            Self(0)
        }
    }

    /// Capture the current time.
    #[inline]
    pub fn now() -> Self {
        Self(Clock::now_micros())
    }

    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000
    }

    /// Time elapsed since `earlier`. Saturates to zero if `earlier` is later.
    #[inline]
    pub fn duration_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }

    /// Shift forward by `delta`.
    #[inline]
    pub fn advanced_by(&self, delta: Duration) -> Self {
        Self(self.0.saturating_add(delta.as_micros() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        Clock::init();
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(b >= a);
    }

    #[test]
    fn test_duration_since() {
        let start = Timestamp::from_millis(1_000);
        let end = Timestamp::from_millis(1_600);
        assert_eq!(end.duration_since(start), Duration::from_millis(600));
    }

    #[test]
    fn test_duration_since_saturates() {
        let start = Timestamp::from_millis(2_000);
        let end = Timestamp::from_millis(1_000);
        assert_eq!(end.duration_since(start), Duration::ZERO);
    }

    #[test]
    fn test_from_secs_f64() {
        assert_eq!(Timestamp::from_secs_f64(1.5).as_millis(), 1_500);
        assert_eq!(Timestamp::from_secs_f64(-3.0), Timestamp::default());
        assert_eq!(Timestamp::from_secs_f64(f64::NAN), Timestamp::default());
    }

    #[test]
    fn test_advanced_by() {
        let t = Timestamp::from_millis(10).advanced_by(Duration::from_millis(5));
        assert_eq!(t.as_millis(), 15);
        assert_eq!(t.as_micros(), 15_000);
    }
}
