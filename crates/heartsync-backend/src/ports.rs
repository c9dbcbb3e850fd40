//! Ports to the hosted backend.
//!
//! Each trait is one external collaborator. Adapters map their own failures
//! onto [`AuthError`] / [`BackendError`] so the client sees a single taxonomy.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use heartsync_shared::{
    ChatMessage, EventDraft, EventId, EventRecord, MessageDraft, MessageId, MomentDraft, MomentId,
    MomentRecord, PairingCode, Room, RoomId, UserId, UserProfile,
};

use crate::error::{AuthError, BackendResult};
use crate::subscription::Subscription;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// A signed-in account as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
    /// Opaque token that can be exchanged for a fresh session later.
    pub token: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Resume a session from a previously issued token.
    async fn refresh(&self, token: &str) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;

    /// Remove the account the token belongs to, ending all its sessions.
    async fn delete_account(&self, token: &str) -> Result<(), AuthError>;
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// The partner side of a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerRef {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartnerUpdate {
    Link(PartnerRef),
    Unlink,
}

impl PartnerUpdate {
    /// The update that restores `profile`'s current partner fields.
    pub fn restoring(profile: &UserProfile) -> Self {
        match &profile.partner_id {
            Some(id) => Self::Link(PartnerRef {
                id: id.clone(),
                name: profile.partner_name.clone().unwrap_or_default(),
            }),
            None => Self::Unlink,
        }
    }
}

/// A partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub bio: Option<String>,
    pub partner: Option<PartnerUpdate>,
}

impl ProfilePatch {
    pub fn partner(update: PartnerUpdate) -> Self {
        Self {
            partner: Some(update),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the patch to a profile in place.
    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.display_name {
            profile.display_name = name.clone();
        }
        if let Some(url) = &self.profile_image_url {
            profile.profile_image_url = Some(url.clone());
        }
        if let Some(bio) = &self.bio {
            profile.bio = Some(bio.clone());
        }
        match &self.partner {
            Some(PartnerUpdate::Link(partner)) => {
                profile.partner_id = Some(partner.id.clone());
                profile.partner_name = Some(partner.name.clone());
            }
            Some(PartnerUpdate::Unlink) => {
                profile.partner_id = None;
                profile.partner_name = None;
            }
            None => {}
        }
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn create_profile(&self, profile: &UserProfile) -> BackendResult<()>;

    async fn get_profile(&self, user_id: &UserId) -> BackendResult<Option<UserProfile>>;

    async fn find_by_pairing_code(&self, code: &PairingCode) -> BackendResult<Option<UserProfile>>;

    async fn update_profile(&self, user_id: &UserId, patch: &ProfilePatch) -> BackendResult<()>;
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

/// The shared room and its collections. Ids and creation timestamps are
/// assigned by the store.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Create the room document unless it already exists.
    async fn ensure_room(&self, room: &RoomId) -> BackendResult<Room>;

    async fn add_event(&self, room: &RoomId, draft: &EventDraft) -> BackendResult<EventId>;

    async fn update_event(&self, room: &RoomId, id: &EventId, draft: &EventDraft) -> BackendResult<()>;

    async fn delete_event(&self, room: &RoomId, id: &EventId) -> BackendResult<()>;

    async fn add_moment(&self, room: &RoomId, draft: &MomentDraft) -> BackendResult<MomentId>;

    async fn send_message(&self, room: &RoomId, draft: &MessageDraft) -> BackendResult<MessageId>;

    /// Push every change of the room's events as a full snapshot.
    fn subscribe_events(&self, room: &RoomId) -> BackendResult<Subscription<EventRecord>>;

    fn subscribe_moments(&self, room: &RoomId) -> BackendResult<Subscription<MomentRecord>>;

    /// Messages arrive ordered by creation time, oldest first.
    fn subscribe_messages(&self, room: &RoomId) -> BackendResult<Subscription<ChatMessage>>;
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// A picture on the device, waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub path: PathBuf,
}

impl LocalImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Interpret a picker result: `file://` URIs are local files, anything
    /// else is already hosted.
    pub fn from_uri(uri: &str) -> Option<Self> {
        uri.strip_prefix("file://").map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string())
    }

    pub fn mime(&self) -> &'static str {
        let ext = self
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            Some("heic") => "image/heic",
            _ => "image/jpeg",
        }
    }
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload the file and return its public URL.
    async fn upload(&self, image: &LocalImage) -> BackendResult<String>;
}
