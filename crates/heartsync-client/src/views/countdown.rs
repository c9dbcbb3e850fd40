//! Live countdown to one event.
//!
//! Each displayed countdown owns a timer. Every tick re-projects from the
//! clock's absolute time, so a late or skipped tick never drifts. A recurring
//! event's target is resolved again on each tick and rolls over to the next
//! anniversary once the current one arrives.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use heartsync_shared::{CountdownState, EventRecord, EventSchedule, LeapDayPolicy};

use crate::session::Session;

/// What a ticker counts down to.
#[derive(Debug, Clone)]
enum Target {
    Instant(DateTime<Utc>),
    Event {
        event: EventRecord,
        policy: LeapDayPolicy,
    },
}

impl Target {
    fn project(&self, clock: &dyn Clock) -> CountdownState {
        match self {
            Self::Instant(at) => CountdownState::project(at, &clock.utc()),
            Self::Event { event, policy } => {
                let now = clock.local();
                EventSchedule::compute(event, &now, *policy).countdown(&now)
            }
        }
    }
}

pub struct CountdownTicker {
    current: watch::Receiver<CountdownState>,
    /// `None` for a countdown that had already passed when shown.
    task: Option<JoinHandle<()>>,
}

impl CountdownTicker {
    /// Tick every `period` until `target` has passed.
    pub fn start(target: DateTime<Utc>, clock: Arc<dyn Clock + Send + Sync>, period: Duration) -> Self {
        Self::spawn(Target::Instant(target), clock, period)
    }

    /// Tick every `period` towards the event's next occurrence. One-off events
    /// stop once passed; recurring ones keep counting to the following year.
    pub fn for_event(
        event: EventRecord,
        policy: LeapDayPolicy,
        clock: Arc<dyn Clock + Send + Sync>,
        period: Duration,
    ) -> Self {
        Self::spawn(Target::Event { event, policy }, clock, period)
    }

    /// Count down to a row of the event list with the session's clock,
    /// leap-day policy and configured tick.
    pub fn for_schedule(session: &Session, schedule: &EventSchedule) -> Self {
        let state = session.state();
        Self::for_event(
            schedule.event.clone(),
            state.leap_day_policy(),
            state.clock.clone(),
            state.config.countdown_tick,
        )
    }

    fn spawn(target: Target, clock: Arc<dyn Clock + Send + Sync>, period: Duration) -> Self {
        let initial = target.project(clock.as_ref());
        let (tx, rx) = watch::channel(initial);
        if initial.has_passed() {
            return Self {
                current: rx,
                task: None,
            };
        }

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let state = target.project(clock.as_ref());
                if tx.send(state).is_err() || state.has_passed() {
                    break;
                }
            }
        });

        Self {
            current: rx,
            task: Some(task),
        }
    }

    pub fn current(&self) -> CountdownState {
        *self.current.borrow()
    }

    /// Wait for the next tick. `None` once the countdown has stopped.
    pub async fn changed(&mut self) -> Option<CountdownState> {
        self.current.changed().await.ok()?;
        Some(*self.current.borrow_and_update())
    }

    /// Stop ticking.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use heartsync_backend::memory::ManualClock;
    use heartsync_shared::{Countdown, EventId};

    fn target() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn recomputes_from_clock_each_tick() {
        let clock = Arc::new(ManualClock::new(target() - chrono::Duration::seconds(90)));
        let mut ticker = CountdownTicker::start(target(), clock.clone(), Duration::from_secs(1));
        assert_eq!(
            ticker.current().remaining(),
            Some(Countdown {
                days: 0,
                hours: 0,
                minutes: 1,
                seconds: 30
            })
        );

        clock.advance(chrono::Duration::seconds(30));
        let state = ticker.changed().await.unwrap();
        assert_eq!(state.remaining().map(|c| c.total_seconds()), Some(60));

        clock.set(target() + chrono::Duration::seconds(1));
        assert_eq!(ticker.changed().await, Some(CountdownState::Passed));
        // Stops once passed.
        assert_eq!(ticker.changed().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn exactly_at_target_is_zero_not_passed() {
        let clock = Arc::new(ManualClock::new(target()));
        let ticker = CountdownTicker::start(target(), clock, Duration::from_secs(1));
        assert_eq!(
            ticker.current(),
            CountdownState::Remaining(Countdown::from_seconds(0))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_updates() {
        let clock = Arc::new(ManualClock::new(target() - chrono::Duration::days(3)));
        let ticker = CountdownTicker::start(target(), clock, Duration::from_secs(1));
        let mut rx = ticker.current.clone();
        ticker.cancel();

        // The first tick may or may not have landed; after that the sender
        // is gone.
        while rx.changed().await.is_ok() {}
        assert!(rx.has_changed().is_err());
    }

    fn event(date: DateTime<Utc>, is_recurring: bool) -> EventRecord {
        EventRecord {
            id: EventId::from("e1"),
            title: "Anniversary".to_string(),
            date,
            is_recurring,
            color: None,
            created_at: date,
        }
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, min, s)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test(start_paused = true)]
    async fn recurring_event_rolls_over_to_next_year() {
        let clock = Arc::new(ManualClock::new(local(2025, 8, 14, 23, 59, 59)));
        let anniversary = event(local(2023, 8, 15, 12, 0, 0), true);
        let mut ticker = CountdownTicker::for_event(
            anniversary,
            LeapDayPolicy::default(),
            clock.clone(),
            Duration::from_secs(1),
        );
        assert_eq!(ticker.current().remaining().map(|c| c.total_seconds()), Some(1));

        clock.advance(chrono::Duration::seconds(5));
        let state = ticker.changed().await.unwrap();
        let remaining = state.remaining().unwrap();
        assert_eq!(remaining.days, 364);

        // Still ticking.
        clock.advance(chrono::Duration::seconds(1));
        assert!(!ticker.changed().await.unwrap().has_passed());
    }

    #[tokio::test(start_paused = true)]
    async fn one_off_event_stops_once_passed() {
        let clock = Arc::new(ManualClock::new(target() - chrono::Duration::seconds(2)));
        let mut ticker = CountdownTicker::for_event(
            event(target(), false),
            LeapDayPolicy::default(),
            clock.clone(),
            Duration::from_secs(1),
        );
        clock.advance(chrono::Duration::seconds(5));
        assert_eq!(ticker.changed().await, Some(CountdownState::Passed));
        assert_eq!(ticker.changed().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn already_passed_event_does_not_tick() {
        let clock = Arc::new(ManualClock::new(target() + chrono::Duration::days(1)));
        let mut ticker = CountdownTicker::for_event(
            event(target(), false),
            LeapDayPolicy::default(),
            clock,
            Duration::from_secs(1),
        );
        assert_eq!(ticker.current(), CountdownState::Passed);
        assert!(ticker.task.is_none());
        assert_eq!(ticker.changed().await, None);
    }
}
