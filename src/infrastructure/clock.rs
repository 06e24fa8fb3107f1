use crate::domain::ports::Clock;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A deterministic clock that advances one second per reading.
///
/// Keeps "most recent first" orderings stable in tests without sleeping.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime<Utc>,
    ticks: AtomicI64,
}

impl SteppingClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            ticks: AtomicI64::new(0),
        }
    }

    /// Jumps forward, for deadline scenarios.
    pub fn advance(&self, by: TimeDelta) {
        self.ticks.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + TimeDelta::seconds(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_stepping_clock_advances() {
        let start = Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap();
        let clock = SteppingClock::starting_at(start);
        let first = clock.now();
        let second = clock.now();
        assert_eq!(first, start);
        assert!(second > first);
        assert_eq!(clock.today(), start.date_naive());
    }

    #[test]
    fn test_advance_moves_today() {
        let start = Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap();
        let clock = SteppingClock::starting_at(start);
        clock.advance(TimeDelta::days(3));
        assert_eq!(
            clock.today(),
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
        );
    }
}
