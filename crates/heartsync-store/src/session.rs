//! The signed-in session, kept across restarts.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use heartsync_shared::UserId;

use crate::database::Database;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub user_id: UserId,
    pub email: String,
    /// Provider token used to resume the session.
    pub token: String,
    pub signed_in_at: DateTime<Utc>,
}

impl Database {
    /// Store `session`, replacing any previous one.
    pub fn save_session(&self, session: &PersistedSession) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO session (id, user_id, email, token, signed_in_at)
             VALUES (1, ?1, ?2, ?3, ?4)",
            params![
                session.user_id.as_str(),
                session.email,
                session.token,
                session.signed_in_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn load_session(&self) -> Result<Option<PersistedSession>> {
        let row = self
            .conn()
            .query_row(
                "SELECT user_id, email, token, signed_in_at FROM session WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, email, token, signed_in_at)) = row else {
            return Ok(None);
        };
        let signed_in_at = DateTime::parse_from_rfc3339(&signed_in_at)?.with_timezone(&Utc);

        Ok(Some(PersistedSession {
            user_id: UserId(user_id),
            email,
            token,
            signed_in_at,
        }))
    }

    /// Forget the stored session. Returns whether there was one.
    pub fn clear_session(&self) -> Result<bool> {
        let affected = self.conn().execute("DELETE FROM session WHERE id = 1", [])?;
        Ok(affected > 0)
    }
}
