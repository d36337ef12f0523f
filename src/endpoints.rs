//! The routes that the forms navigate between.
//!
//! Routing itself belongs to the host application, these are the names it must understand.

/// The application's home view.
pub const ROOT: &str = "/";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/login";
/// The route for getting the sign up page.
pub const SIGN_UP_VIEW: &str = "/signup";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
