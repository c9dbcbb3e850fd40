use tracing::debug;

use heartsync_shared::validation::message_text;
use heartsync_shared::{MessageDraft, MessageId};

use crate::commands::{during, CommandError, Operation};
use crate::session::Session;

/// Send a chat message to the partner. Blank text sends nothing and
/// returns `None`.
pub async fn send_message(session: &Session, text: &str) -> Result<Option<MessageId>, CommandError> {
    let room = session.require_room()?;
    let Some(text) = message_text(text) else {
        return Ok(None);
    };

    let draft = MessageDraft {
        sender_id: session.user_id().clone(),
        sender_name: Some(session.profile().display_name.clone()),
        text,
    };
    let id = session
        .state()
        .backend
        .rooms
        .send_message(&room, &draft)
        .await
        .map_err(during(Operation::SendMessage))?;

    debug!(room = %room, message = %id, "Message sent");
    Ok(Some(id))
}
