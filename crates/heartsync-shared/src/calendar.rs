//! Moments grouped by calendar day, for the shared calendar screen.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::MomentRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MomentCalendar {
    days: BTreeMap<NaiveDate, Vec<MomentRecord>>,
}

impl MomentCalendar {
    /// Group a snapshot of moments. Within a day, moments are ordered by
    /// creation time.
    pub fn from_moments(moments: impl IntoIterator<Item = MomentRecord>) -> Self {
        let mut days: BTreeMap<NaiveDate, Vec<MomentRecord>> = BTreeMap::new();
        for moment in moments {
            days.entry(moment.date).or_default().push(moment);
        }
        for day in days.values_mut() {
            day.sort_by_key(|m| m.created_at);
        }
        Self { days }
    }

    pub fn moments_on(&self, day: NaiveDate) -> &[MomentRecord] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Days carrying at least one moment, ascending.
    pub fn marked_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Marked days within one month, for a month grid.
    pub fn marked_days_in(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Vec::new();
        };
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        match next {
            Some(next) => self.days.range(first..next).map(|(d, _)| *d).collect(),
            None => self.days.range(first..).map(|(d, _)| *d).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
