//! Wall-clock abstraction and UTC bucket keys.
//!
//! Quota rollover compares explicit UTC day/hour bucket keys rather than
//! raw timestamps, so a process that sleeps across any number of boundaries
//! resets lazily on its next admission check.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};

/// Source of "now" for the admission controller and executor.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests and simulations. Clones share the same
/// underlying instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// UTC day bucket for `ts`.
pub fn day_key(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// UTC (day, hour) bucket for `ts`.
pub fn hour_key(ts: DateTime<Utc>) -> (NaiveDate, u32) {
    (ts.date_naive(), ts.hour())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hour_key_changes_at_hour_boundary() {
        let before = Utc.with_ymd_and_hms(2025, 6, 1, 10, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();
        assert_ne!(hour_key(before), hour_key(after));
        assert_eq!(day_key(before), day_key(after));
    }

    #[test]
    fn day_key_changes_at_midnight_utc() {
        let before = Utc.with_ymd_and_hms(2025, 6, 1, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
        assert_ne!(day_key(before), day_key(after));
        assert_ne!(hour_key(before), hour_key(after));
    }

    #[test]
    fn manual_clock_advance_is_shared_across_clones() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        let other = clock.clone();
        clock.advance(Duration::minutes(5));
        assert_eq!(other.now(), clock.now());
    }
}
