use thiserror::Error;

/// Input rejected locally, before anything is written to the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide a title.")]
    EmptyTitle,

    #[error("Please pick a date.")]
    MissingDate,

    #[error("Invalid colour '{0}', expected #RRGGBB")]
    InvalidColor(String),

    #[error("Please enter your partner's ID.")]
    EmptyPairingCode,

    #[error("You cannot connect with yourself.")]
    SelfPairing,

    #[error("Invalid pairing code: {0}")]
    PairingCode(#[from] PairingCodeError),

    #[error("Please enter a name.")]
    EmptyDisplayName,

    #[error("Please fill all fields")]
    IncompleteForm,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairingCodeError {
    #[error("expected {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("unexpected character '{0}'")]
    InvalidCharacter(char),
}
