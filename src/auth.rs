//! The contract with the authentication service and a local implementation of it.
//!
//! The log-in form only needs to know whether a set of credentials was accepted. How sessions are
//! created and stored afterwards is up to the service.

use std::{collections::HashMap, fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{email::Email, password::PasswordHash};

/// Shown when the email and password do not match a known user.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Invalid credentials";

/// The email and password entered in the log-in form.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    /// The email address entered by the user.
    pub email: String,
    /// The password entered by the user, in plain text.
    pub password: String,
    /// Whether the service should perform its own redirect after signing in.
    ///
    /// The log-in form decides where to navigate itself, so this is always `false` for
    /// credentials created with [Credentials::new].
    pub redirect: bool,
}

impl Credentials {
    /// Create credentials that ask the service not to redirect.
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_owned(),
            password: password.to_owned(),
            redirect: false,
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"********")
            .field("redirect", &self.redirect)
            .finish()
    }
}

/// The authentication service's verdict on a set of credentials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthResponse {
    /// Whether the user is now signed in.
    pub ok: bool,
    /// Why the credentials were rejected, suitable for showing to the user.
    pub error: Option<String>,
}

impl AuthResponse {
    /// The credentials were accepted.
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    /// The credentials were rejected because of `reason`.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(reason.into()),
        }
    }
}

/// The error returned when the authentication service itself failed, as opposed to rejecting
/// the credentials.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("authentication service error: {0}")]
pub struct AuthServiceError(pub String);

/// Verifies credentials, e.g. an identity provider.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check `credentials` and sign the user in if they are valid.
    ///
    /// Rejected credentials are reported as an [AuthResponse] with an error message. An `Err` is
    /// only returned if the service could not reach a verdict.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthResponse, AuthServiceError>;
}

/// An [AuthService] that checks credentials against a fixed set of users with bcrypt password
/// hashes, e.g. users listed in the config file.
#[derive(Debug, Clone, Default)]
pub struct LocalAuthService {
    users: Arc<HashMap<String, PasswordHash>>,
}

impl LocalAuthService {
    /// Create a service that accepts the given users.
    ///
    /// Email addresses are matched case-insensitively.
    pub fn new(users: impl IntoIterator<Item = (Email, PasswordHash)>) -> Self {
        let users = users
            .into_iter()
            .map(|(email, password_hash)| (email.as_str().to_lowercase(), password_hash))
            .collect();

        Self {
            users: Arc::new(users),
        }
    }
}

#[async_trait]
impl AuthService for LocalAuthService {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthResponse, AuthServiceError> {
        let email = match Email::new(&credentials.email) {
            Ok(email) => email,
            Err(error) => {
                tracing::debug!("Rejected log-in: {error}");
                return Ok(AuthResponse::failure(INVALID_CREDENTIALS_ERROR_MSG));
            }
        };

        let Some(password_hash) = self.users.get(&email.as_str().to_lowercase()).cloned() else {
            tracing::debug!("Rejected log-in for unknown user {email}");
            return Ok(AuthResponse::failure(INVALID_CREDENTIALS_ERROR_MSG));
        };

        let password = credentials.password.clone();
        // bcrypt verification is CPU bound.
        let is_password_valid =
            tokio::task::spawn_blocking(move || password_hash.verify(&password))
                .await
                .map_err(|error| AuthServiceError(error.to_string()))?
                .map_err(|error| {
                    tracing::error!("Unhandled error while verifying credentials: {error}");
                    AuthServiceError(error.to_string())
                })?;

        if is_password_valid {
            Ok(AuthResponse::success())
        } else {
            tracing::debug!("Rejected log-in for {email}: incorrect password");
            Ok(AuthResponse::failure(INVALID_CREDENTIALS_ERROR_MSG))
        }
    }
}
