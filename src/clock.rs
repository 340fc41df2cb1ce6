//! Time source for "today" and "now".
//!
//! Journal and streak logic pivots on the local calendar date. Core
//! operations take `today` and `now` as explicit arguments; the async facade
//! reads them from a [`Clock`] once per call so a single operation never
//! straddles midnight.

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::Mutex;

/// Source of the current local date and UTC instant.
pub trait Clock: Send + Sync {
    /// The local calendar date.
    fn today(&self) -> NaiveDate;

    /// The current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a settable date.
///
/// `now_utc` returns noon UTC of the pinned date, so timestamps stay
/// ordered with the date.
#[derive(Debug)]
pub struct FixedClock {
    date: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Mutex::new(date),
        }
    }

    /// Moves the clock to `date`.
    pub fn set(&self, date: NaiveDate) {
        let mut guard = self.date.lock().unwrap_or_else(|e| e.into_inner());
        *guard = date;
    }

    /// Moves the clock forward by `days`.
    pub fn advance_days(&self, days: i64) {
        let mut guard = self.date.lock().unwrap_or_else(|e| e.into_inner());
        *guard = *guard + chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn now_utc(&self) -> DateTime<Utc> {
        let date = self.today();
        date.and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advance() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.today(), start);

        clock.advance_days(1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        clock.advance_days(1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(clock.now_utc().date_naive(), clock.today());
    }

    #[test]
    fn test_fixed_clock_set() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let target = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        clock.set(target);
        assert_eq!(clock.today(), target);
    }
}
