//! Time source
//!
//! Injected into stores so timestamps and derived states (overdue bills,
//! expiring documents) are testable.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day used for due-date comparisons
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// `day + days`, or `None` when that falls outside the calendar range
pub fn days_after(day: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| day.checked_add_signed(delta))
}

/// Wall clock with the household's UTC offset applied to `today`
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Midnight UTC on the given day
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(NaiveTime::default()).and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.guard() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.guard() += by;
    }

    // a panic elsewhere cannot leave a half-written timestamp behind
    fn guard(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.guard()
    }
}
