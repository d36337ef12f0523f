//! The transaction entry form: the transaction model, the form state, the submission client
//! and the controller that ties them together.

mod client;
mod controller;
mod core;
mod form;

pub use client::{JsonLinesClient, SubmissionClient, SubmissionError};
pub use controller::{
    DEFAULT_NAVIGATION_DELAY, FormPhase, TRANSACTION_ADDED_MSG, TransactionFormController,
};
pub use self::core::{Category, NewTransaction, TransactionType, parse_amount, round_to_cents};
pub use form::{TransactionForm, ValidTransactionForm, derive_converted_amount};
