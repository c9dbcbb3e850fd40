use heartsync_shared::ChatMessage;

use crate::commands::{during, CommandError, Operation};
use crate::session::Session;
use crate::views::LiveView;

/// The conversation, oldest message first.
pub type MessageListView = LiveView<Vec<ChatMessage>>;

pub fn watch_messages(session: &Session) -> Result<MessageListView, CommandError> {
    let room = session.require_room()?;
    let subscription = session
        .state()
        .backend
        .rooms
        .subscribe_messages(&room)
        .map_err(during(Operation::Subscribe))?;

    Ok(LiveView::spawn(subscription, Vec::new(), |mut messages: Vec<ChatMessage>| {
        messages.sort_by_key(|m| m.created_at);
        messages
    }))
}
