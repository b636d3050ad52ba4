//! Wall-clock source for timestamps and listing dates.
//!
//! RULE: Nothing in the engine calls `Utc::now()` directly.
//! Stores and presenters take a clock so tests can pin time.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

pub trait ReportClock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ReportClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    current: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            current: Cell::new(at),
        }
    }

    /// Move the clock forward. Returns the new time.
    pub fn advance(&self, by: Duration) -> DateTime<Utc> {
        let next = self.current.get() + by;
        self.current.set(next);
        next
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.current.set(at);
    }
}

impl ReportClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.current.get()
    }
}
