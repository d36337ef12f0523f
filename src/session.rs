//! The identity of the currently authenticated user.
//!
//! Sessions are owned by an external identity provider. Forms receive a [Session] value when
//! they are constructed and only ever read from it.

use crate::email::Email;

/// The authenticated user of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    /// The user's email address, used to tag the transactions they create.
    pub email: Email,
}

/// A read-only snapshot of the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<SessionUser>,
}

impl Session {
    /// A session for a logged in user.
    pub fn authenticated(email: Email) -> Self {
        Self {
            user: Some(SessionUser { email }),
        }
    }

    /// A session with no logged in user.
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    /// The logged in user, or `None` if nobody is logged in.
    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// The logged in user's email address.
    pub fn email(&self) -> Option<&Email> {
        self.user.as_ref().map(|user| &user.email)
    }
}
