//! A validated email address used to identify the owner of a session or transaction.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The error returned when a string is not a valid email address.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0} is not a valid email address")]
pub struct EmailAddressError(pub String);

/// An email address that has passed basic validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create and validate an email address.
    ///
    /// Leading and trailing whitespace is removed before validation.
    ///
    /// # Errors
    ///
    /// This function will return an error if `raw_email` does not have a
    /// non-empty local part and domain separated by a single '@'.
    pub fn new(raw_email: &str) -> Result<Self, EmailAddressError> {
        let email = raw_email.trim();

        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(email.to_owned()))
            }
            _ => Err(EmailAddressError(raw_email.to_owned())),
        }
    }

    /// Create a new `Email` without any validation.
    ///
    /// The caller should ensure that `raw_email` is a correctly formatted email address.
    /// For emails coming from the user this function should **not** be used, use [Email::new].
    pub fn new_unchecked(raw_email: &str) -> Self {
        Self(raw_email.to_owned())
    }

    /// The email address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::new(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
mod email_tests {
    use super::{Email, EmailAddressError};

    #[test]
    fn create_email_success() {
        let email = Email::new("foo@bar.baz");

        assert_eq!(email.unwrap().as_str(), "foo@bar.baz");
    }

    #[test]
    fn create_email_trims_whitespace() {
        let email = Email::new("  foo@bar.baz ").unwrap();

        assert_eq!(email.as_str(), "foo@bar.baz");
    }

    #[test]
    fn create_email_fails_with_no_at_symbol() {
        let email = Email::new("foobar.baz");

        assert!(matches!(email, Err(EmailAddressError(_))));
    }

    #[test]
    fn create_email_fails_with_empty_string() {
        let email = Email::new("");

        assert!(matches!(email, Err(EmailAddressError(_))));
    }

    #[test]
    fn create_email_fails_with_missing_domain() {
        assert!(Email::new("foo@").is_err());
        assert!(Email::new("@bar.baz").is_err());
        assert!(Email::new("foo@bar@baz").is_err());
    }

    #[test]
    fn deserialize_rejects_invalid_email() {
        let result: Result<Email, _> = serde_json::from_str("\"not-an-email\"");

        assert!(result.is_err());
    }
}
