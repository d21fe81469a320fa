//! Epoch duration formatting.

use std::fmt;
use std::time::{Duration, Instant};

/// Elapsed time split into whole minutes and remaining seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochTime {
    pub minutes: u64,
    pub seconds: f64,
}

impl EpochTime {
    /// Time elapsed between `start` and `end` (zero if `end` is earlier).
    #[must_use]
    pub fn between(start: Instant, end: Instant) -> Self {
        Self::from(end.saturating_duration_since(start))
    }
}

impl From<Duration> for EpochTime {
    fn from(elapsed: Duration) -> Self {
        let minutes = elapsed.as_secs() / 60;
        let seconds = elapsed.as_secs_f64() - Duration::from_secs(minutes * 60).as_secs_f64();
        Self { minutes, seconds }
    }
}

impl fmt::Display for EpochTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m {:.2}s", self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_minutes_and_seconds() {
        let t = EpochTime::from(Duration::from_millis(125_500));
        assert_eq!(t.minutes, 2);
        assert!((t.seconds - 5.5).abs() < 1e-9);
        assert_eq!(t.to_string(), "2m 5.50s");
    }

    #[test]
    fn test_under_a_minute() {
        let t = EpochTime::from(Duration::from_secs(42));
        assert_eq!(t.minutes, 0);
        assert!((t.seconds - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_between_is_never_negative() {
        let now = Instant::now();
        let later = now + Duration::from_secs(61);
        assert_eq!(EpochTime::between(later, now).minutes, 0);
        assert_eq!(EpochTime::between(now, later).minutes, 1);
    }
}
