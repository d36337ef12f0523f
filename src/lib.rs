//! fintrack is the core of a personal finance app.
//!
//! This library provides the controllers behind the log-in form and the transaction entry form,
//! and the currency converter that normalizes every transaction into US dollars before it is
//! submitted. Rendering, routing, sessions and storage belong to the host application, which
//! plugs them in through the traits in [alert], [navigation], [auth], [currency] and
//! [transaction].

#![warn(missing_docs)]

use rust_decimal::Decimal;

pub mod alert;
pub mod auth;
pub mod config;
pub mod currency;
pub mod email;
pub mod endpoints;
pub mod log_in;
pub mod navigation;
pub mod password;
pub mod redirect;
pub mod session;
pub mod transaction;

#[cfg(test)]
mod test_utils;

pub use alert::{AlertType, ChannelNotifier, Notification, Notifier};
pub use auth::{AuthResponse, AuthService, Credentials, LocalAuthService};
pub use config::Config;
pub use currency::{CANONICAL_CURRENCY, Currency, CurrencyConverter};
pub use email::Email;
pub use log_in::{LogInController, LogInPhase};
pub use navigation::Navigator;
pub use session::Session;
pub use transaction::{NewTransaction, SubmissionClient, TransactionFormController};

use crate::currency::ConversionError;

/// Shown when a required form field is empty.
pub const MISSING_FIELDS_MSG: &str = "Please fill in all fields.";

/// Shown when a transaction could not be submitted.
pub const SUBMISSION_FAILED_MSG: &str = "Failed to add transaction. Please try again.";

/// The ways a form can be filled in incorrectly.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("the {0} field is required")]
    MissingField(&'static str),

    /// The amount is not a number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// The amount is below zero.
    #[error("the amount {0} is negative")]
    NegativeAmount(Decimal),

    /// A select field was given a value that is not one of its options.
    #[error("\"{value}\" is not a valid {field}")]
    InvalidChoice {
        /// The name of the field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The field cannot be changed by the user.
    #[error("the {0} field cannot be changed")]
    ReadOnlyField(&'static str),

    /// The form has no field with this name.
    #[error("there is no field called \"{0}\"")]
    UnknownField(String),

    /// Transactions can only be created for a logged in user.
    #[error("no user is logged in")]
    NotLoggedIn,
}

/// The errors that may occur in the application.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The form was filled in incorrectly. Nothing was sent to any external service.
    #[error("invalid form: {0}")]
    Validation(#[from] ValidationError),

    /// The authentication service rejected the credentials.
    ///
    /// The message comes from the service and is shown to the user as is.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    /// An external service failed in an unexpected way.
    ///
    /// The string should only be logged for debugging, users are shown a general message.
    #[error("an unexpected error occurred: {0}")]
    Unexpected(String),

    /// The amount could not be converted into the canonical currency, so the transaction cannot
    /// be trusted and must not be submitted.
    #[error("currency conversion unavailable: {0}")]
    ConversionUnavailable(ConversionError),

    /// The submission client rejected the transaction.
    #[error("submission failed: {0}")]
    SubmissionFailure(String),

    /// The form was submitted again while the previous submission was still in flight.
    #[error("a submission is already in progress")]
    SubmissionInProgress,

    /// The form was submitted again after it had already succeeded.
    #[error("the form has already been submitted")]
    FormClosed,

    /// Could not acquire the lock on a form's state.
    #[error("could not acquire the form state lock")]
    StateLockError,
}

impl Error {
    /// The message to show the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(ValidationError::MissingField(_)) => MISSING_FIELDS_MSG.to_owned(),
            Error::Validation(
                ValidationError::InvalidAmount(_) | ValidationError::NegativeAmount(_),
            ) => "Please enter a valid, non-negative amount.".to_owned(),
            Error::Validation(ValidationError::NotLoggedIn) => {
                "You must be logged in to add a transaction.".to_owned()
            }
            Error::Validation(error) => {
                let mut message = capitalise_first_char(&error.to_string());
                message.push('.');
                message
            }
            Error::AuthenticationFailure(reason) => reason.clone(),
            Error::ConversionUnavailable(_) => format!(
                "Could not convert the amount to {CANONICAL_CURRENCY}. Please try again later."
            ),
            Error::SubmissionFailure(_) => SUBMISSION_FAILED_MSG.to_owned(),
            Error::SubmissionInProgress => "Your request is already being processed.".to_owned(),
            Error::FormClosed => "This form has already been submitted.".to_owned(),
            Error::Unexpected(_) | Error::StateLockError => {
                "An unexpected error occurred. Please try again.".to_owned()
            }
        }
    }
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
