use thiserror::Error;

/// Failures reported by the authentication provider.
///
/// Variants mirror the provider's error codes; the client turns them into
/// user-readable messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("auth/user-not-found")]
    UserNotFound,

    #[error("auth/wrong-password")]
    WrongPassword,

    #[error("auth/invalid-email")]
    InvalidEmail,

    #[error("auth/invalid-credential")]
    InvalidCredential,

    #[error("auth/email-already-in-use")]
    EmailAlreadyInUse,

    #[error("auth/weak-password")]
    WeakPassword,

    /// A persisted session token is no longer accepted.
    #[error("auth/session-expired")]
    SessionExpired,

    /// Anything else, with the provider's own message.
    #[error("{0}")]
    Provider(String),
}

impl AuthError {
    /// Map a provider error code onto a variant.
    pub fn from_code(code: &str, message: &str) -> Self {
        match code {
            "auth/user-not-found" => Self::UserNotFound,
            "auth/wrong-password" => Self::WrongPassword,
            "auth/invalid-email" => Self::InvalidEmail,
            "auth/invalid-credential" => Self::InvalidCredential,
            "auth/email-already-in-use" => Self::EmailAlreadyInUse,
            "auth/weak-password" => Self::WeakPassword,
            "auth/user-token-expired" | "auth/session-expired" => Self::SessionExpired,
            _ => Self::Provider(message.to_string()),
        }
    }
}

/// Failures of document reads/writes and uploads.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The store refused the write (rules, conflicts, malformed data).
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// Network or service failure.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Image upload failed: {0}")]
    Upload(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
