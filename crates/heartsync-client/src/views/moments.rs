use heartsync_shared::calendar::MomentCalendar;

use crate::commands::{during, CommandError, Operation};
use crate::session::Session;
use crate::views::LiveView;

/// Moments grouped by day for the calendar screen.
pub type MomentCalendarView = LiveView<MomentCalendar>;

pub fn watch_moments(session: &Session) -> Result<MomentCalendarView, CommandError> {
    let room = session.require_room()?;
    let subscription = session
        .state()
        .backend
        .rooms
        .subscribe_moments(&room)
        .map_err(during(Operation::Subscribe))?;

    Ok(LiveView::spawn(subscription, MomentCalendar::default(), |moments| {
        MomentCalendar::from_moments(moments)
    }))
}
