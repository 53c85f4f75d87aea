//! Elapsed-time arithmetic for tasks.

use chrono::{DateTime, Utc};
use std::fmt;

/// Minutes in an hour.
const MINUTES_PER_HOUR: i64 = 60;

/// Whole minutes spent on a task, truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSpent {
    minutes: i64,
}

impl TimeSpent {
    /// Computes the whole minutes between two instants, never negative.
    #[must_use]
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let minutes = end.signed_duration_since(start).num_minutes().max(0);
        Self { minutes }
    }

    /// Creates a value from a minute count.
    #[must_use]
    pub const fn from_minutes(minutes: i64) -> Self {
        Self { minutes }
    }

    /// Returns the total number of minutes.
    #[must_use]
    pub const fn minutes(self) -> i64 {
        self.minutes
    }

    /// Returns whether less than one minute elapsed.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.minutes == 0
    }
}

impl fmt::Display for TimeSpent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.minutes.div_euclid(MINUTES_PER_HOUR);
        let minutes = self.minutes.rem_euclid(MINUTES_PER_HOUR);
        write!(f, "{hours}h {minutes}m")
    }
}
