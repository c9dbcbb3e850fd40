use heartsync_shared::{schedule_events, EventSchedule};

use crate::commands::{during, CommandError, Operation};
use crate::session::Session;
use crate::views::LiveView;

/// The countdown list: upcoming events soonest first, passed one-offs last.
pub type EventListView = LiveView<Vec<EventSchedule>>;

/// Watch the room's events, ordered as of each snapshot's arrival in the
/// device's local time.
pub fn watch_events(session: &Session) -> Result<EventListView, CommandError> {
    let room = session.require_room()?;
    let state = session.state();
    let subscription = state
        .backend
        .rooms
        .subscribe_events(&room)
        .map_err(during(Operation::Subscribe))?;

    let clock = state.clock.clone();
    let policy = state.leap_day_policy();
    Ok(LiveView::spawn(subscription, Vec::new(), move |events| {
        schedule_events(&events, &clock.local(), policy)
    }))
}
