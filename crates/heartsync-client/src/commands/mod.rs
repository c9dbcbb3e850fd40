//! Commands invoked by the screens.
//!
//! Each sub-module groups related commands by domain. Every command returns
//! `Result<_, CommandError>`; the caller turns a failure into a [`Notice`]
//! for the user.

pub mod auth;
pub mod events;
pub mod messaging;
pub mod moments;
pub mod pairing;
pub mod profile;

use heartsync_backend::{AuthError, BackendError};
use heartsync_shared::{EventId, UserId, ValidationError};
use heartsync_store::StoreError;
use thiserror::Error;

/// A short alert shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// What the user was doing when the backend failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SignUp,
    Connect,
    Disconnect,
    SaveEvent,
    AddMoment,
    SendMessage,
    UpdateProfile,
    LoadProfile,
    Subscribe,
}

impl Operation {
    fn title(self) -> &'static str {
        match self {
            Self::SignUp => "Sign Up",
            Self::Connect => "Connection Failed",
            Self::SendMessage => "Message",
            Self::UpdateProfile => "Error updating profile",
            _ => "Error",
        }
    }
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("sign-in failed: {0}")]
    SignIn(AuthError),

    #[error("sign-up failed: {0}")]
    SignUp(AuthError),

    #[error("sign-out failed: {0}")]
    SignOut(AuthError),

    #[error("{op:?} failed: {source}")]
    Backend {
        op: Operation,
        #[source]
        source: BackendError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// No profile carries the entered pairing code.
    #[error("no user with that pairing code")]
    NotFound,

    /// The target already has another partner.
    #[error("user is already paired")]
    Unavailable,

    /// The signed-in user already has a different partner.
    #[error("already paired with another user")]
    AlreadyPaired,

    #[error("no partner connected")]
    NotPaired,

    #[error("no profile for signed-in user {0}")]
    ProfileMissing(UserId),

    /// A partner-link write failed and so did restoring the first one.
    #[error("partner link between {user} and {partner} left inconsistent: {source}")]
    InconsistentPairing {
        user: UserId,
        partner: UserId,
        #[source]
        source: BackendError,
    },

    #[error("could not allocate a unique pairing code")]
    PairingCodeExhausted,

    #[error("{} of {attempted} events could not be deleted", .failed.len())]
    DeleteEvents {
        attempted: usize,
        failed: Vec<(EventId, BackendError)>,
    },
}

impl CommandError {
    /// The alert for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(e) => Notice::new(validation_title(e), e.to_string()),
            Self::SignIn(e) => Notice::new("SignIn", sign_in_message(e)),
            Self::SignUp(e) => Notice::new("Sign Up", sign_up_message(e)),
            Self::SignOut(e) => Notice::new("Error", e.to_string()),
            Self::Backend {
                op: Operation::Disconnect,
                ..
            } => Notice::new("Error", "Failed to unlink. Please try again."),
            Self::Backend { op, source } => Notice::new(op.title(), source.to_string()),
            Self::Store(e) => Notice::new("Error", e.to_string()),
            Self::NotFound => Notice::new(
                "Not Found",
                "No user found with that ID. Please check and try again.",
            ),
            Self::Unavailable => Notice::new(
                "Unavailable",
                "This user is already connected to someone else.",
            ),
            Self::AlreadyPaired => Notice::new(
                "Already Connected",
                "You are already connected to a partner. Unlink first to connect with someone else.",
            ),
            Self::NotPaired => Notice::new("Error", "No partner is currently connected."),
            Self::ProfileMissing(_) => {
                Notice::new("Error", "Your profile could not be found. Please sign in again.")
            }
            Self::InconsistentPairing { .. } => Notice::new(
                "Connection Failed",
                "Your partner link could not be completed. Please try connecting again.",
            ),
            Self::PairingCodeExhausted => Notice::new(
                "Sign Up",
                "Could not create your pairing code. Please try again.",
            ),
            Self::DeleteEvents { attempted, failed } => Notice::new(
                "Error",
                format!(
                    "Could not delete {} of {attempted} selected events.",
                    failed.len()
                ),
            ),
        }
    }
}

/// Attach the operation to a backend failure.
pub(crate) fn during(op: Operation) -> impl FnOnce(BackendError) -> CommandError {
    move |source| CommandError::Backend { op, source }
}

fn validation_title(e: &ValidationError) -> &'static str {
    match e {
        ValidationError::EmptyTitle
        | ValidationError::MissingDate
        | ValidationError::IncompleteForm => "Missing Info",
        ValidationError::SelfPairing => "Oops!",
        _ => "Error",
    }
}

fn sign_in_message(e: &AuthError) -> String {
    match e {
        AuthError::UserNotFound => "No user found with this email.".to_string(),
        AuthError::WrongPassword => "Incorrect password.".to_string(),
        AuthError::InvalidEmail => "Invalid email format.".to_string(),
        AuthError::InvalidCredential => {
            "Invalid credentials. Please check your email and password.".to_string()
        }
        other => other.to_string(),
    }
}

fn sign_up_message(e: &AuthError) -> String {
    match e {
        AuthError::EmailAlreadyInUse => "Email already in use. Please try another email.".to_string(),
        AuthError::InvalidEmail => "Invalid email format. Please enter a valid email.".to_string(),
        AuthError::WeakPassword => "Weak password. Please choose a stronger password.".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_messages() {
        let cases = [
            (AuthError::UserNotFound, "No user found with this email."),
            (AuthError::WrongPassword, "Incorrect password."),
            (AuthError::InvalidEmail, "Invalid email format."),
            (
                AuthError::InvalidCredential,
                "Invalid credentials. Please check your email and password.",
            ),
            (AuthError::Provider("Too many attempts".into()), "Too many attempts"),
        ];
        for (error, expected) in cases {
            assert_eq!(CommandError::SignIn(error).notice().message, expected);
        }
    }

    #[test]
    fn sign_up_messages() {
        let cases = [
            (
                AuthError::EmailAlreadyInUse,
                "Email already in use. Please try another email.",
            ),
            (
                AuthError::InvalidEmail,
                "Invalid email format. Please enter a valid email.",
            ),
            (
                AuthError::WeakPassword,
                "Weak password. Please choose a stronger password.",
            ),
        ];
        for (error, expected) in cases {
            let notice = CommandError::SignUp(error).notice();
            assert_eq!(notice.title, "Sign Up");
            assert_eq!(notice.message, expected);
        }
    }

    #[test]
    fn pairing_notices() {
        assert_eq!(
            CommandError::NotFound.notice(),
            Notice::new("Not Found", "No user found with that ID. Please check and try again.")
        );
        assert_eq!(CommandError::Unavailable.notice().title, "Unavailable");
        assert_eq!(CommandError::AlreadyPaired.notice().title, "Already Connected");
        assert_eq!(
            CommandError::from(ValidationError::SelfPairing).notice(),
            Notice::new("Oops!", "You cannot connect with yourself.")
        );
        assert_eq!(
            CommandError::from(ValidationError::EmptyPairingCode).notice().message,
            "Please enter your partner's ID."
        );
    }

    #[test]
    fn backend_failures_carry_operation_title() {
        let err = during(Operation::Connect)(BackendError::Unavailable("offline".into()));
        assert_eq!(err.notice().title, "Connection Failed");

        let err = during(Operation::SignUp)(BackendError::Unavailable("offline".into()));
        assert_eq!(err.notice().title, "Sign Up");

        let err = during(Operation::Disconnect)(BackendError::Unavailable("offline".into()));
        assert_eq!(err.notice().message, "Failed to unlink. Please try again.");
    }
}
