//! Sign-up, sign-in, session restore and sign-out.

use tracing::{error, info, warn};

use heartsync_backend::AuthError;
use heartsync_shared::constants::MAX_PAIRING_CODE_ATTEMPTS;
use heartsync_shared::validation::{display_name, require_fields};
use heartsync_shared::{PairingCode, UserProfile};
use heartsync_store::Database;

use crate::commands::{during, CommandError, Operation};
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub gender: Option<String>,
    /// An already hosted picture, if the user picked one.
    pub profile_image_url: Option<String>,
}

/// Create the account and its profile, with a fresh pairing code.
///
/// If the profile cannot be written the new account is deleted again, so the
/// same email can be retried.
pub async fn sign_up(state: &AppState, form: SignUpForm) -> Result<Session, CommandError> {
    require_fields(&[&form.email, &form.password, &form.display_name].map(String::as_str))?;
    let name = display_name(&form.display_name)?;
    let pairing_code = unique_pairing_code(state).await?;

    let user = state
        .backend
        .auth
        .create_account(&form.email, &form.password)
        .await
        .map_err(CommandError::SignUp)?;

    let profile = UserProfile {
        user_id: user.user_id.clone(),
        email: user.email.clone(),
        display_name: name,
        gender: form.gender,
        pairing_code,
        partner_id: None,
        partner_name: None,
        profile_image_url: form.profile_image_url,
        bio: None,
    };
    if let Err(failure) = state.backend.profiles.create_profile(&profile).await {
        warn!(user_id = %user.user_id, error = %failure, "Profile write failed, deleting account");
        if let Err(e) = state.backend.auth.delete_account(&user.token).await {
            error!(user_id = %user.user_id, error = %e, "Account left without a profile");
        }
        return Err(during(Operation::SignUp)(failure));
    }

    state.persist_session(&user);
    info!(user_id = %user.user_id, code = %profile.pairing_code, "Account created");

    Ok(Session::new(state.clone(), user, profile))
}

pub async fn sign_in(state: &AppState, email: &str, password: &str) -> Result<Session, CommandError> {
    require_fields(&[email, password])?;

    let user = state
        .backend
        .auth
        .sign_in(email, password)
        .await
        .map_err(CommandError::SignIn)?;

    let profile = state
        .backend
        .profiles
        .get_profile(&user.user_id)
        .await
        .map_err(during(Operation::LoadProfile))?
        .ok_or_else(|| CommandError::ProfileMissing(user.user_id.clone()))?;

    state.persist_session(&user);
    info!(user_id = %user.user_id, "Signed in");

    Ok(Session::new(state.clone(), user, profile))
}

/// Resume the persisted session, if any. A token the provider no longer
/// accepts is forgotten and `None` returned.
pub async fn restore_session(state: &AppState) -> Result<Option<Session>, CommandError> {
    let Some(persisted) = state.with_db(Database::load_session).transpose()?.flatten() else {
        return Ok(None);
    };

    let user = match state.backend.auth.refresh(&persisted.token).await {
        Ok(user) => user,
        Err(
            e @ (AuthError::SessionExpired | AuthError::UserNotFound | AuthError::InvalidCredential),
        ) => {
            warn!(user_id = %persisted.user_id, error = %e, "Persisted session rejected");
            state.forget_session();
            return Ok(None);
        }
        Err(e) => return Err(CommandError::SignIn(e)),
    };

    let profile = state
        .backend
        .profiles
        .get_profile(&user.user_id)
        .await
        .map_err(during(Operation::LoadProfile))?
        .ok_or_else(|| CommandError::ProfileMissing(user.user_id.clone()))?;

    info!(user_id = %user.user_id, "Session restored");
    Ok(Some(Session::new(state.clone(), user, profile)))
}

/// End the session here and at the provider.
pub async fn sign_out(session: Session) -> Result<(), CommandError> {
    let token = session.token().to_string();
    let (state, user) = session.into_parts();

    state.forget_session();
    state
        .backend
        .auth
        .sign_out(&token)
        .await
        .map_err(CommandError::SignOut)?;

    info!(user_id = %user.user_id, "Signed out");
    Ok(())
}

async fn unique_pairing_code(state: &AppState) -> Result<PairingCode, CommandError> {
    for _ in 0..MAX_PAIRING_CODE_ATTEMPTS {
        let code = PairingCode::generate(&mut rand::thread_rng());
        let taken = state
            .backend
            .profiles
            .find_by_pairing_code(&code)
            .await
            .map_err(during(Operation::SignUp))?;
        if taken.is_none() {
            return Ok(code);
        }
        warn!(code = %code, "Pairing code collision, retrying");
    }
    Err(CommandError::PairingCodeExhausted)
}
