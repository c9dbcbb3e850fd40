//! Countdown events in the shared room.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{info, warn};

use heartsync_shared::validation::validate_event;
use heartsync_shared::{EventDraft, EventId};

use crate::commands::{during, CommandError, Operation};
use crate::session::Session;

/// Fields of the event editor.
#[derive(Debug, Clone, Default)]
pub struct EventForm {
    pub title: String,
    pub date: Option<DateTime<Utc>>,
    pub is_recurring: bool,
    /// `None` takes the device's preferred colour, or the first preset.
    pub color: Option<String>,
}

impl EventForm {
    fn draft(&self, session: &Session) -> Result<EventDraft, CommandError> {
        let preferred = session.state().preferences().default_event_color;
        let color = self.color.as_deref().or(preferred.as_deref());
        Ok(validate_event(&self.title, self.date, self.is_recurring, color)?)
    }
}

pub async fn create_event(session: &Session, form: &EventForm) -> Result<EventId, CommandError> {
    let room = session.require_room()?;
    let draft = form.draft(session)?;

    let id = session
        .state()
        .backend
        .rooms
        .add_event(&room, &draft)
        .await
        .map_err(during(Operation::SaveEvent))?;

    info!(room = %room, event = %id, recurring = draft.is_recurring, "Event created");
    Ok(id)
}

pub async fn update_event(session: &Session, id: &EventId, form: &EventForm) -> Result<(), CommandError> {
    let room = session.require_room()?;
    let draft = form.draft(session)?;

    session
        .state()
        .backend
        .rooms
        .update_event(&room, id, &draft)
        .await
        .map_err(during(Operation::SaveEvent))?;

    info!(room = %room, event = %id, "Event updated");
    Ok(())
}

/// Delete every selected event. All deletions are attempted; the ones that
/// failed are reported together. Returns how many were deleted.
pub async fn delete_events(session: &Session, ids: &[EventId]) -> Result<usize, CommandError> {
    let room = session.require_room()?;
    let rooms = &session.state().backend.rooms;

    let results = join_all(ids.iter().map(|id| rooms.delete_event(&room, id))).await;

    let failed: Vec<(EventId, _)> = ids
        .iter()
        .cloned()
        .zip(results)
        .filter_map(|(id, result)| result.err().map(|e| (id, e)))
        .collect();

    let deleted = ids.len() - failed.len();
    info!(room = %room, deleted, failed = failed.len(), "Events deleted");

    if failed.is_empty() {
        Ok(deleted)
    } else {
        for (id, e) in &failed {
            warn!(room = %room, event = %id, error = %e, "Event not deleted");
        }
        Err(CommandError::DeleteEvents {
            attempted: ids.len(),
            failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use heartsync_backend::memory::Fault;
    use heartsync_backend::RoomStore;
    use heartsync_shared::constants::PRESET_COLORS;
    use heartsync_shared::ValidationError;

    use crate::test_support::{couple, signed_up};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
    }

    fn form(title: &str, month: u32) -> EventForm {
        EventForm {
            title: title.to_string(),
            date: Some(Utc.with_ymd_and_hms(2025, month, 8, 0, 0, 0).unwrap()),
            is_recurring: false,
            color: None,
        }
    }

    async fn stored_events(
        memory: &heartsync_backend::memory::MemoryBackend,
        session: &Session,
    ) -> Vec<heartsync_shared::EventRecord> {
        let room = session.room_id().unwrap();
        memory
            .subscribe_events(&room)
            .unwrap()
            .next_snapshot()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_update() {
        let c = couple(now()).await;
        let id = create_event(&c.alice, &form("Trip", 6)).await.unwrap();

        let events = stored_events(&c.memory, &c.bob).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].color.as_deref(), Some(PRESET_COLORS[0]));

        let mut edit = form("Trip to Lisbon", 7);
        edit.color = Some("#60A5FA".to_string());
        update_event(&c.bob, &id, &edit).await.unwrap();

        let events = stored_events(&c.memory, &c.alice).await;
        assert_eq!(events[0].title, "Trip to Lisbon");
        assert_eq!(events[0].color.as_deref(), Some("#60A5FA"));
    }

    #[tokio::test]
    async fn missing_title_writes_nothing() {
        let c = couple(now()).await;
        let err = create_event(&c.alice, &form("  ", 6)).await.unwrap_err();
        assert!(matches!(err, CommandError::Validation(ValidationError::EmptyTitle)));
        assert_eq!(err.notice().title, "Missing Info");
        assert!(stored_events(&c.memory, &c.alice).await.is_empty());
    }

    #[tokio::test]
    async fn unpaired_session_is_refused() {
        let c = couple(now()).await;
        let carol = signed_up(c.alice.state(), "carol@example.com", "Carol").await;
        let err = create_event(&carol, &form("Solo", 6)).await.unwrap_err();
        assert!(matches!(err, CommandError::NotPaired));
    }

    #[tokio::test]
    async fn delete_reports_failures_together() {
        let c = couple(now()).await;
        let a = create_event(&c.alice, &form("A", 3)).await.unwrap();
        let b = create_event(&c.alice, &form("B", 4)).await.unwrap();
        let missing = EventId::from("missing");

        let err = delete_events(&c.alice, &[a, missing.clone(), b])
            .await
            .unwrap_err();
        match err {
            CommandError::DeleteEvents { attempted, failed } => {
                assert_eq!(attempted, 3);
                assert_eq!(failed.len(), 1);
                assert_eq!(failed[0].0, missing);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(stored_events(&c.memory, &c.alice).await.is_empty());
    }

    #[tokio::test]
    async fn delete_all_selected() {
        let c = couple(now()).await;
        let ids = vec![
            create_event(&c.alice, &form("A", 3)).await.unwrap(),
            create_event(&c.alice, &form("B", 4)).await.unwrap(),
        ];
        assert_eq!(delete_events(&c.bob, &ids).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn store_failure_is_save_event() {
        let c = couple(now()).await;
        c.memory.inject(Fault::RoomWrite, 1);
        let err = create_event(&c.alice, &form("A", 3)).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Backend {
                op: Operation::SaveEvent,
                ..
            }
        ));
    }
}
