//! Device preferences, stored as one JSON document.

use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use heartsync_shared::LeapDayPolicy;

use crate::database::Database;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    /// Colour preselected in the event editor.
    pub default_event_color: Option<String>,
    /// Overrides the configured leap-day policy on this device.
    pub leap_day_policy: Option<LeapDayPolicy>,
}

impl Database {
    /// Stored preferences, or the defaults when none were saved.
    pub fn load_preferences(&self) -> Result<Preferences> {
        let json: Option<String> = self
            .conn()
            .query_row("SELECT json FROM preferences WHERE id = 1", [], |row| row.get(0))
            .optional()?;

        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Preferences::default()),
        }
    }

    pub fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        let json = serde_json::to_string(preferences)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO preferences (id, json) VALUES (1, ?1)",
            params![json],
        )?;
        tracing::debug!("preferences saved");
        Ok(())
    }
}
