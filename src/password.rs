//! Password strength checks and bcrypt hashes for the users in the config file.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

/// Why a password could not be turned into a [PasswordHash].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PasswordError {
    /// zxcvbn scored the password below 3. Holds its suggestions.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// bcrypt failed, e.g. because the cost is out of range.
    #[error("hashing failed: {0}")]
    HashingError(String),
}

/// A plain text password strong enough to be hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Accept `raw_password` if zxcvbn scores it 3 or 4.
    ///
    /// # Errors
    ///
    /// Returns [PasswordError::TooWeak] with zxcvbn's feedback otherwise.
    pub fn new(raw_password: &str) -> Result<Self, PasswordError> {
        let entropy = zxcvbn(raw_password, &[]);

        match entropy.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_owned())),
            _ => {
                let feedback = entropy
                    .feedback()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| Feedback::default().to_string());
                Err(PasswordError::TooWeak(feedback))
            }
        }
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("********")
    }
}

/// A bcrypt hash, as stored in the `users` section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// bcrypt's default cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds. Tests use 4 to stay fast.
    ///
    /// # Errors
    ///
    /// Returns [PasswordError::HashingError] if bcrypt fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, PasswordError> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| PasswordError::HashingError(error.to_string()))
    }

    /// Wrap an existing hash as is. A malformed hash only fails at [PasswordHash::verify].
    pub fn new_unchecked(hash: &str) -> Self {
        Self(hash.to_owned())
    }

    /// Check the strength of `raw_password` and hash it.
    ///
    /// # Errors
    ///
    /// Returns [PasswordError::TooWeak] or [PasswordError::HashingError].
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, PasswordError> {
        Self::new(ValidatedPassword::new(raw_password)?, cost)
    }

    /// Whether `raw_password` matches this hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
