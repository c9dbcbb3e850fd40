//! Remaining-time breakdown for countdown displays.
//!
//! Each projection is computed from absolute instants, so a display that
//! misses ticks is correct again on the next one.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Whole days, hours, minutes and seconds left until a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl Countdown {
    /// Split a non-negative number of seconds. Negative input yields zero.
    pub fn from_seconds(total: i64) -> Self {
        let total = total.max(0);
        Self {
            days: total / SECS_PER_DAY,
            hours: ((total % SECS_PER_DAY) / SECS_PER_HOUR) as u8,
            minutes: ((total % SECS_PER_HOUR) / SECS_PER_MINUTE) as u8,
            seconds: (total % SECS_PER_MINUTE) as u8,
        }
    }

    pub fn total_seconds(&self) -> i64 {
        self.days * SECS_PER_DAY
            + i64::from(self.hours) * SECS_PER_HOUR
            + i64::from(self.minutes) * SECS_PER_MINUTE
            + i64::from(self.seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CountdownState {
    Remaining(Countdown),
    /// The target lies strictly before "now".
    Passed,
}

impl CountdownState {
    /// Project the time left from `now` until `target`.
    pub fn project<Tz1: TimeZone, Tz2: TimeZone>(
        target: &DateTime<Tz1>,
        now: &DateTime<Tz2>,
    ) -> Self {
        let remaining = target.with_timezone(&Utc) - now.with_timezone(&Utc);
        if remaining < Duration::zero() {
            Self::Passed
        } else {
            Self::Remaining(Countdown::from_seconds(remaining.num_seconds()))
        }
    }

    pub fn has_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// The remaining breakdown, or `None` once passed.
    pub fn remaining(&self) -> Option<Countdown> {
        match self {
            Self::Remaining(countdown) => Some(*countdown),
            Self::Passed => None,
        }
    }
}
