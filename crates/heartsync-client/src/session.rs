//! The signed-in user's session.
//!
//! A [`Session`] is created by sign-up, sign-in or restore and consumed by
//! sign-out. Commands that act on behalf of the user take it explicitly.

use heartsync_backend::AuthUser;
use heartsync_shared::{derive_room_id, RoomId, UserId, UserProfile};
use tracing::debug;

use crate::commands::{during, CommandError, Operation};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct Session {
    state: AppState,
    user: AuthUser,
    profile: UserProfile,
}

impl Session {
    pub(crate) fn new(state: AppState, user: AuthUser, profile: UserProfile) -> Self {
        Self {
            state,
            user,
            profile,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn user_id(&self) -> &UserId {
        &self.user.user_id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub(crate) fn token(&self) -> &str {
        &self.user.token
    }

    /// The profile as last read or written by this session.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub(crate) fn profile_mut(&mut self) -> &mut UserProfile {
        &mut self.profile
    }

    /// The shared room, once paired.
    pub fn room_id(&self) -> Option<RoomId> {
        self.profile
            .partner_id
            .as_ref()
            .map(|partner| derive_room_id(self.user_id(), partner))
    }

    /// The shared room, or `NotPaired`.
    pub fn require_room(&self) -> Result<RoomId, CommandError> {
        self.room_id().ok_or(CommandError::NotPaired)
    }

    /// Re-read the profile from the backend. The partner may have linked or
    /// unlinked from their side.
    pub async fn refresh_profile(&mut self) -> Result<&UserProfile, CommandError> {
        let profile = self
            .state
            .backend
            .profiles
            .get_profile(self.user_id())
            .await
            .map_err(during(Operation::LoadProfile))?
            .ok_or_else(|| CommandError::ProfileMissing(self.user_id().clone()))?;

        debug!(user_id = %self.user_id(), partner = ?profile.partner_id, "Profile refreshed");
        self.profile = profile;
        Ok(&self.profile)
    }

    pub(crate) fn into_parts(self) -> (AppState, AuthUser) {
        (self.state, self.user)
    }
}
