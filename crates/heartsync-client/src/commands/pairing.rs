//! Pairing two accounts into a couple.
//!
//! A pairing is two profile writes that the store cannot commit together.
//! When the second write fails, the first one is reverted to its previous
//! value. If the revert fails too, the links are left inconsistent and the
//! user is told so.

use tracing::{error, info, warn};

use heartsync_backend::{BackendError, PartnerRef, PartnerUpdate, ProfilePatch, ProfileStore};
use heartsync_shared::validation::pairing_input;
use heartsync_shared::{derive_room_id, Room, UserId, UserProfile};

use crate::commands::{during, CommandError, Operation};
use crate::session::Session;

/// How the signed-in user's partner link looks from both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartnerStatus {
    Unpaired,
    /// Both profiles point at each other.
    Paired(UserProfile),
    /// This user points at the partner, but the partner does not point back.
    Asymmetric(UserProfile),
}

impl PartnerStatus {
    pub fn is_paired(&self) -> bool {
        matches!(self, Self::Paired(_))
    }
}

/// Pair with the owner of the typed pairing code and open the shared room.
pub async fn connect_partner(session: &mut Session, code: &str) -> Result<Room, CommandError> {
    let code = pairing_input(code, &session.profile().pairing_code)?;
    let profiles = session.state().backend.profiles.clone();
    let me = session.user_id().clone();

    let partner = profiles
        .find_by_pairing_code(&code)
        .await
        .map_err(during(Operation::Connect))?
        .ok_or(CommandError::NotFound)?;

    if partner.user_id == me {
        return Err(heartsync_shared::ValidationError::SelfPairing.into());
    }
    if partner.partner_id.as_ref().is_some_and(|p| p != &me) {
        info!(user_id = %me, partner = %partner.user_id, "Pairing target already taken");
        return Err(CommandError::Unavailable);
    }

    let before = current_profile(profiles.as_ref(), &me).await?;
    if let Some(current) = before.partner_id.as_ref().filter(|p| *p != &partner.user_id) {
        info!(user_id = %me, partner = %current, "Already paired with someone else");
        return Err(CommandError::AlreadyPaired);
    }

    let link_me = ProfilePatch::partner(PartnerUpdate::Link(PartnerRef {
        id: partner.user_id.clone(),
        name: partner.display_name.clone(),
    }));
    let link_partner = ProfilePatch::partner(PartnerUpdate::Link(PartnerRef {
        id: me.clone(),
        name: before.display_name.clone(),
    }));

    write_pair(
        profiles.as_ref(),
        (&me, &link_me, &before),
        (&partner.user_id, &link_partner),
        Operation::Connect,
    )
    .await?;

    let room_id = derive_room_id(&me, &partner.user_id);
    let room = session
        .state()
        .backend
        .rooms
        .ensure_room(&room_id)
        .await
        .map_err(during(Operation::Connect))?;

    link_me.apply(session.profile_mut());
    info!(user_id = %me, partner = %partner.user_id, room = %room.room_id, "Partners connected");
    Ok(room)
}

/// Unlink both partners.
pub async fn disconnect_partner(session: &mut Session) -> Result<(), CommandError> {
    let partner_id = session
        .profile()
        .partner_id
        .clone()
        .ok_or(CommandError::NotPaired)?;
    let profiles = session.state().backend.profiles.clone();
    let me = session.user_id().clone();

    let before = current_profile(profiles.as_ref(), &me).await?;
    let unlink = ProfilePatch::partner(PartnerUpdate::Unlink);

    let partner = profiles
        .get_profile(&partner_id)
        .await
        .map_err(during(Operation::Disconnect))?;

    match partner {
        // Only clear the partner's side if it still points here.
        Some(partner) if partner.is_partnered_with(&me) => {
            write_pair(
                profiles.as_ref(),
                (&me, &unlink, &before),
                (&partner_id, &unlink),
                Operation::Disconnect,
            )
            .await?;
        }
        _ => {
            profiles
                .update_profile(&me, &unlink)
                .await
                .map_err(during(Operation::Disconnect))?;
        }
    }

    unlink.apply(session.profile_mut());
    info!(user_id = %me, partner = %partner_id, "Partners disconnected");
    Ok(())
}

/// Read the partner's profile and compare its link with ours.
pub async fn partner_status(session: &Session) -> Result<PartnerStatus, CommandError> {
    let Some(partner_id) = &session.profile().partner_id else {
        return Ok(PartnerStatus::Unpaired);
    };

    let partner = session
        .state()
        .backend
        .profiles
        .get_profile(partner_id)
        .await
        .map_err(during(Operation::LoadProfile))?;

    Ok(match partner {
        None => {
            warn!(user_id = %session.user_id(), partner = %partner_id, "Partner profile missing");
            PartnerStatus::Unpaired
        }
        Some(p) if p.is_partnered_with(session.user_id()) => PartnerStatus::Paired(p),
        Some(p) => PartnerStatus::Asymmetric(p),
    })
}

async fn current_profile(profiles: &dyn ProfileStore, user_id: &UserId) -> Result<UserProfile, CommandError> {
    profiles
        .get_profile(user_id)
        .await
        .map_err(during(Operation::LoadProfile))?
        .ok_or_else(|| CommandError::ProfileMissing(user_id.clone()))
}

/// Write `first` then `second`, reverting `first` if `second` fails.
async fn write_pair(
    profiles: &dyn ProfileStore,
    first: (&UserId, &ProfilePatch, &UserProfile),
    second: (&UserId, &ProfilePatch),
    op: Operation,
) -> Result<(), CommandError> {
    let (first_id, first_patch, first_before) = first;
    let (second_id, second_patch) = second;

    profiles
        .update_profile(first_id, first_patch)
        .await
        .map_err(during(op))?;

    let Err(failure) = profiles.update_profile(second_id, second_patch).await else {
        return Ok(());
    };

    warn!(user_id = %first_id, partner = %second_id, error = %failure, "Partner write failed, reverting");
    let revert = ProfilePatch::partner(PartnerUpdate::restoring(first_before));
    match profiles.update_profile(first_id, &revert).await {
        Ok(()) => Err(during(op)(failure)),
        Err(revert_failure) => {
            error!(
                user_id = %first_id,
                partner = %second_id,
                error = %failure,
                revert_error = %revert_failure,
                "Partner link left inconsistent"
            );
            Err(inconsistent(first_id, second_id, failure))
        }
    }
}

fn inconsistent(user: &UserId, partner: &UserId, source: BackendError) -> CommandError {
    CommandError::InconsistentPairing {
        user: user.clone(),
        partner: partner.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heartsync_backend::memory::{Fault, MemoryBackend};
    use heartsync_backend::Backend;

    use crate::commands::auth::{sign_up, SignUpForm};
    use crate::config::ClientConfig;
    use crate::state::AppState;

    async fn couple() -> (MemoryBackend, Session, Session) {
        let memory = MemoryBackend::new();
        let state = AppState::new(Backend::from_memory(memory.clone()), ClientConfig::default());
        let mut sessions = Vec::new();
        for (email, name) in [("alice@example.com", "Alice"), ("bob@example.com", "Bob")] {
            let form = SignUpForm {
                email: email.to_string(),
                password: "secret1".to_string(),
                display_name: name.to_string(),
                ..SignUpForm::default()
            };
            sessions.push(sign_up(&state, form).await.unwrap());
        }
        let bob = sessions.pop().unwrap();
        let alice = sessions.pop().unwrap();
        (memory, alice, bob)
    }

    #[tokio::test]
    async fn connect_links_both_and_creates_room() {
        let (memory, mut alice, mut bob) = couple().await;
        let code = bob.profile().pairing_code.to_string();

        let room = connect_partner(&mut alice, &code).await.unwrap();
        assert_eq!(Some(room.room_id.clone()), alice.room_id());
        assert_eq!(alice.profile().partner_name.as_deref(), Some("Bob"));

        let stored_bob = memory.profile(bob.user_id()).unwrap();
        assert!(stored_bob.is_partnered_with(alice.user_id()));
        assert_eq!(stored_bob.partner_name.as_deref(), Some("Alice"));

        bob.refresh_profile().await.unwrap();
        assert_eq!(bob.room_id(), alice.room_id());
        assert!(partner_status(&alice).await.unwrap().is_paired());
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let (_, mut alice, _) = couple().await;
        let err = connect_partner(&mut alice, "ZZZZZ9").await.unwrap_err();
        assert!(matches!(err, CommandError::NotFound));
        assert!(alice.profile().partner_id.is_none());
    }

    #[tokio::test]
    async fn own_code_is_rejected() {
        let (_, mut alice, _) = couple().await;
        let own = alice.profile().pairing_code.to_string();
        let err = connect_partner(&mut alice, &own).await.unwrap_err();
        assert_eq!(err.notice().message, "You cannot connect with yourself.");
    }

    #[tokio::test]
    async fn taken_partner_is_unavailable() {
        let (memory, mut alice, bob) = couple().await;
        let state = alice.state().clone();
        let mut carol = sign_up(
            &state,
            SignUpForm {
                email: "carol@example.com".to_string(),
                password: "secret1".to_string(),
                display_name: "Carol".to_string(),
                ..SignUpForm::default()
            },
        )
        .await
        .unwrap();

        connect_partner(&mut carol, bob.profile().pairing_code.as_str())
            .await
            .unwrap();

        let err = connect_partner(&mut alice, bob.profile().pairing_code.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Unavailable));
        assert!(memory.profile(alice.user_id()).unwrap().partner_id.is_none());
    }

    #[tokio::test]
    async fn paired_user_cannot_connect_elsewhere() {
        let (memory, mut alice, bob) = couple().await;
        let state = alice.state().clone();
        let carol = sign_up(
            &state,
            SignUpForm {
                email: "carol@example.com".to_string(),
                password: "secret1".to_string(),
                display_name: "Carol".to_string(),
                ..SignUpForm::default()
            },
        )
        .await
        .unwrap();
        connect_partner(&mut alice, bob.profile().pairing_code.as_str())
            .await
            .unwrap();

        let err = connect_partner(&mut alice, carol.profile().pairing_code.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::AlreadyPaired));
        assert!(memory.profile(alice.user_id()).unwrap().is_partnered_with(bob.user_id()));
        assert!(memory.profile(bob.user_id()).unwrap().is_partnered_with(alice.user_id()));
        assert!(memory.profile(carol.user_id()).unwrap().partner_id.is_none());
        assert!(partner_status(&alice).await.unwrap().is_paired());

        // Connecting to the current partner again is harmless.
        connect_partner(&mut alice, bob.profile().pairing_code.as_str())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_partner_write_reverts_first() {
        let (memory, mut alice, bob) = couple().await;
        memory.inject(Fault::ProfileUpdate(bob.user_id().clone()), 1);

        let err = connect_partner(&mut alice, bob.profile().pairing_code.as_str())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Backend {
                op: Operation::Connect,
                ..
            }
        ));
        assert!(memory.profile(alice.user_id()).unwrap().partner_id.is_none());
        assert!(alice.profile().partner_id.is_none());
    }

    #[tokio::test]
    async fn failed_revert_is_reported_inconsistent() {
        let (memory, mut alice, bob) = couple().await;
        memory.inject(Fault::ProfileUpdate(bob.user_id().clone()), 1);
        // Alice's link goes through, the revert does not.
        memory.inject_after(Fault::ProfileUpdate(alice.user_id().clone()), 1, 1);

        let err = connect_partner(&mut alice, bob.profile().pairing_code.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InconsistentPairing { .. }));
        assert_eq!(err.notice().title, "Connection Failed");

        // Alice's stored profile still points at bob, who does not point back.
        let stored = memory.profile(alice.user_id()).unwrap();
        assert!(stored.is_partnered_with(bob.user_id()));
        alice.refresh_profile().await.unwrap();
        assert!(matches!(
            partner_status(&alice).await.unwrap(),
            PartnerStatus::Asymmetric(_)
        ));
    }

    #[tokio::test]
    async fn disconnect_clears_both_sides() {
        let (memory, mut alice, bob) = couple().await;
        connect_partner(&mut alice, bob.profile().pairing_code.as_str())
            .await
            .unwrap();

        disconnect_partner(&mut alice).await.unwrap();
        assert!(alice.room_id().is_none());
        assert!(memory.profile(alice.user_id()).unwrap().partner_id.is_none());
        assert!(memory.profile(bob.user_id()).unwrap().partner_id.is_none());
        assert_eq!(partner_status(&alice).await.unwrap(), PartnerStatus::Unpaired);

        let err = disconnect_partner(&mut alice).await.unwrap_err();
        assert!(matches!(err, CommandError::NotPaired));
    }

    #[tokio::test]
    async fn one_sided_link_is_asymmetric() {
        let (memory, mut alice, bob) = couple().await;
        connect_partner(&mut alice, bob.profile().pairing_code.as_str())
            .await
            .unwrap();
        let profiles: &dyn ProfileStore = &memory;
        profiles
            .update_profile(bob.user_id(), &ProfilePatch::partner(PartnerUpdate::Unlink))
            .await
            .unwrap();

        assert!(matches!(
            partner_status(&alice).await.unwrap(),
            PartnerStatus::Asymmetric(_)
        ));
    }
}
