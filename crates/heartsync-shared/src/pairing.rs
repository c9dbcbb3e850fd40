//! Short pairing codes.
//!
//! Every profile carries a 6-character alphanumeric code the user reads out
//! to their partner. The code is only a lookup key; the pairing itself links
//! the two internal [`UserId`](crate::types::UserId)s.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{PAIRING_CODE_ALPHABET, PAIRING_CODE_LENGTH};
use crate::error::PairingCodeError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PairingCode(String);

impl PairingCode {
    /// Draw a random code from `rng`. Uniqueness is the caller's concern.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..PAIRING_CODE_LENGTH)
            .map(|_| {
                let idx = rng.gen_range(0..PAIRING_CODE_ALPHABET.len());
                PAIRING_CODE_ALPHABET[idx] as char
            })
            .collect();
        Self(code)
    }

    /// Parse user input. Surrounding whitespace is ignored; codes are case
    /// sensitive.
    pub fn parse(input: &str) -> Result<Self, PairingCodeError> {
        let code = input.trim();

        let actual = code.chars().count();
        if actual != PAIRING_CODE_LENGTH {
            return Err(PairingCodeError::WrongLength {
                expected: PAIRING_CODE_LENGTH,
                actual,
            });
        }

        if let Some(bad) = code.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(PairingCodeError::InvalidCharacter(bad));
        }

        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PairingCode {
    type Error = PairingCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PairingCode> for String {
    fn from(code: PairingCode) -> Self {
        code.0
    }
}
