//! Ordering of the countdown list.
//!
//! Upcoming events come first, soonest first. One-off events whose date has
//! gone by sink to the bottom. The sort is stable, so events with equal keys
//! keep the order the store delivered them in.

use chrono::{DateTime, TimeZone, Utc};

use crate::countdown::CountdownState;
use crate::recurrence::{next_occurrence_with, LeapDayPolicy};
use crate::types::EventRecord;

/// An event together with the values the list is sorted and rendered by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSchedule {
    pub event: EventRecord,
    /// Target of the countdown.
    pub next: DateTime<Utc>,
    /// A one-off event whose date is behind "now". Recurring events never pass.
    pub has_passed: bool,
}

impl EventSchedule {
    pub fn compute<Tz: TimeZone>(
        event: &EventRecord,
        now: &DateTime<Tz>,
        policy: LeapDayPolicy,
    ) -> Self {
        let tz = now.timezone();
        let original = event.date.with_timezone(&tz);
        let next = next_occurrence_with(&original, event.is_recurring, now, policy);
        let has_passed = !event.is_recurring && &next < now;

        Self {
            event: event.clone(),
            next: next.with_timezone(&Utc),
            has_passed,
        }
    }

    /// Remaining time at `now`.
    pub fn countdown<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> CountdownState {
        if self.has_passed {
            CountdownState::Passed
        } else {
            CountdownState::project(&self.next, now)
        }
    }
}

/// Compute and sort schedules for a snapshot of events.
pub fn schedule_events<Tz: TimeZone>(
    events: &[EventRecord],
    now: &DateTime<Tz>,
    policy: LeapDayPolicy,
) -> Vec<EventSchedule> {
    let mut schedules: Vec<EventSchedule> = events
        .iter()
        .map(|event| EventSchedule::compute(event, now, policy))
        .collect();

    // `sort_by` is stable.
    schedules.sort_by(|a, b| {
        a.has_passed
            .cmp(&b.has_passed)
            .then_with(|| a.next.cmp(&b.next))
    });
    schedules
}

/// Sort events for display with the default [`LeapDayPolicy`].
pub fn order_events<Tz: TimeZone>(events: &[EventRecord], now: &DateTime<Tz>) -> Vec<EventRecord> {
    order_events_with(events, now, LeapDayPolicy::default())
}

/// Sort events for display.
pub fn order_events_with<Tz: TimeZone>(
    events: &[EventRecord],
    now: &DateTime<Tz>,
    policy: LeapDayPolicy,
) -> Vec<EventRecord> {
    schedule_events(events, now, policy)
        .into_iter()
        .map(|schedule| schedule.event)
        .collect()
}
