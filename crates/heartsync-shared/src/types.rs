//! Identifiers and the records stored in the shared room documents.
//!
//! Records derive `Serialize`/`Deserialize` with camelCase field names so they
//! map one-to-one onto the backend documents.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{FALLBACK_COLOR, PRESET_COLORS};
use crate::pairing::PairingCode;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Account identifier assigned by the auth provider. Opaque and immutable.
    UserId
);
string_id!(
    /// Key of the shared document two partners read and write.
    /// Only [`crate::room::derive_room_id`] should build one.
    RoomId
);
string_id!(
    /// Server-assigned id of an [`EventRecord`].
    EventId
);
string_id!(
    /// Server-assigned id of a [`MomentRecord`].
    MomentId
);
string_id!(
    /// Server-assigned id of a [`ChatMessage`].
    MessageId
);

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A user's profile document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    /// Short code other users type to pair with this account.
    pub pairing_code: PairingCode,
    #[serde(default)]
    pub partner_id: Option<UserId>,
    #[serde(default)]
    pub partner_name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl UserProfile {
    /// Whether this profile points at `other` as its partner.
    pub fn is_partnered_with(&self, other: &UserId) -> bool {
        self.partner_id.as_ref() == Some(other)
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// The shared room document two partners hang their collections from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: RoomId,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// An important date (anniversary, birthday, trip…) tracked with a countdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EventRecord {
    /// Colour to render the event with, falling back to a neutral grey.
    pub fn accent_color(&self) -> &str {
        self.color.as_deref().unwrap_or(FALLBACK_COLOR)
    }
}

/// Validated content of an event, as written to the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub date: DateTime<Utc>,
    pub is_recurring: bool,
    pub color: String,
}

impl EventDraft {
    /// Colour preselected in the editor.
    pub fn default_color() -> String {
        PRESET_COLORS[0].to_string()
    }
}

// ---------------------------------------------------------------------------
// Moments
// ---------------------------------------------------------------------------

/// A memory pinned to a calendar day, optionally with a hosted picture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MomentRecord {
    pub id: MomentId,
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated content of a moment. `image_url` is the hosted URL, never a
/// local file reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MomentDraft {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A chat message in the room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender_id: UserId,
    #[serde(default)]
    pub sender_name: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Outgoing message content; the store assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    pub sender_id: UserId,
    pub sender_name: Option<String>,
    pub text: String,
}
