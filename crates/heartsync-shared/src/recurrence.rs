//! Annual recurrence.
//!
//! A recurring event tracks its anniversary instead of the one-off date. The
//! next occurrence is midnight of the original month/day in the current (or
//! following) year, evaluated in the time zone of `now`.

use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// What a February 29 anniversary becomes in a year without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeapDayPolicy {
    /// Celebrate on February 28.
    #[default]
    ClampToFeb28,
    /// Celebrate on March 1.
    RollToMar1,
}

impl LeapDayPolicy {
    /// The anniversary of `month`/`day` in `year`, applying the policy when
    /// the day does not exist that year.
    pub fn anniversary(self, year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
            if month != 2 || day != 29 {
                return None;
            }
            match self {
                Self::ClampToFeb28 => NaiveDate::from_ymd_opt(year, 2, 28),
                Self::RollToMar1 => NaiveDate::from_ymd_opt(year, 3, 1),
            }
        })
    }
}

impl FromStr for LeapDayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" | "feb28" | "clamp_to_feb28" => Ok(Self::ClampToFeb28),
            "roll" | "mar1" | "roll_to_mar1" => Ok(Self::RollToMar1),
            other => Err(format!("unknown leap day policy '{other}'")),
        }
    }
}

/// Next date an event should count down to, with the default
/// [`LeapDayPolicy`].
pub fn next_occurrence<Tz: TimeZone>(
    original: &DateTime<Tz>,
    is_recurring: bool,
    now: &DateTime<Tz>,
) -> DateTime<Tz> {
    next_occurrence_with(original, is_recurring, now, LeapDayPolicy::default())
}

/// Next date an event should count down to.
///
/// One-off events and events still in the future return `original`
/// unchanged. Otherwise the anniversary in `now`'s year is used, moved to the
/// following year if it is already behind `now`.
pub fn next_occurrence_with<Tz: TimeZone>(
    original: &DateTime<Tz>,
    is_recurring: bool,
    now: &DateTime<Tz>,
    policy: LeapDayPolicy,
) -> DateTime<Tz> {
    if !is_recurring || original > now {
        return original.clone();
    }

    let tz = now.timezone();
    let local = original.with_timezone(&tz);
    let (month, day) = (local.month(), local.day());

    match anniversary_at(&tz, now.year(), month, day, policy) {
        Some(candidate) if &candidate >= now => candidate,
        _ => anniversary_at(&tz, now.year() + 1, month, day, policy)
            .unwrap_or_else(|| original.clone()),
    }
}

/// Local midnight of the anniversary in `year`.
fn anniversary_at<Tz: TimeZone>(
    tz: &Tz,
    year: i32,
    month: u32,
    day: u32,
    policy: LeapDayPolicy,
) -> Option<DateTime<Tz>> {
    let midnight = policy.anniversary(year, month, day)?.and_time(NaiveTime::MIN);
    // Zones that skip midnight on a DST switch have no local midnight that day.
    Some(
        tz.from_local_datetime(&midnight)
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&midnight)),
    )
}
