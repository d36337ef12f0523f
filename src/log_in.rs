//! The controller behind the log-in form.
//! The auth module defines the contract with the service that checks the credentials.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    Error,
    alert::{Notification, Notifier},
    auth::{AuthResponse, AuthService, Credentials},
    endpoints,
    navigation::Navigator,
    redirect::parse_redirect_query,
};

/// Shown after the user logged in.
pub const LOG_IN_SUCCESS_MSG: &str = "Successfully Logged In";

/// Shown when logging in failed for a reason the authentication service did not explain.
pub const LOG_IN_FALLBACK_ERROR_MSG: &str = "An error occurred during login.";

/// Where the log-in form is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogInPhase {
    /// Waiting for the user to submit their credentials.
    Idle,
    /// The credentials are being checked, the submit control is disabled.
    Authenticating,
    /// The user logged in and was sent to the home view.
    Redirected,
}

#[derive(Debug)]
struct LogInState {
    phase: LogInPhase,
    error: Option<String>,
}

/// The controller behind the log-in form.
pub struct LogInController {
    state: Mutex<LogInState>,
    auth: Arc<dyn AuthService>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    requested_redirect: Option<String>,
}

impl LogInController {
    /// Create the controller for the log-in page opened with the query string `query`.
    pub fn new(
        auth: Arc<dyn AuthService>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        query: &str,
    ) -> Self {
        Self {
            state: Mutex::new(LogInState {
                phase: LogInPhase::Idle,
                error: None,
            }),
            auth,
            notifier,
            navigator,
            requested_redirect: parse_redirect_query(query),
        }
    }

    /// Where the form is in its lifecycle.
    pub fn phase(&self) -> Result<LogInPhase, Error> {
        Ok(self.lock_state()?.phase)
    }

    /// The error message to display above the form, if any.
    pub fn error(&self) -> Option<String> {
        self.lock_state().ok().and_then(|state| state.error.clone())
    }

    /// Whether the credentials are being checked.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase(), Ok(LogInPhase::Authenticating))
    }

    /// The text for the submit control.
    pub fn submit_label(&self) -> &'static str {
        if self.is_loading() {
            "Logging in ..."
        } else {
            "Login"
        }
    }

    /// The page the user asked to return to after logging in, from the `redirect` query parameter.
    ///
    /// Successful log-ins currently always navigate to [endpoints::ROOT].
    pub fn requested_redirect(&self) -> Option<&str> {
        self.requested_redirect.as_deref()
    }

    /// Log in with `email` and `password`.
    ///
    /// Any previous error is cleared before the credentials are checked. If the authentication
    /// service rejects them, its explanation is shown verbatim. On success a notification is
    /// shown and the user is sent to the home view.
    ///
    /// # Errors
    ///
    /// - [Error::SubmissionInProgress] if a log-in is already in flight.
    /// - [Error::FormClosed] if the user already logged in.
    /// - [Error::AuthenticationFailure] if the credentials were rejected.
    /// - [Error::Unexpected] if the service failed or gave no verdict. Only a failed service
    ///   shows the fallback message, a missing verdict leaves the form idle without an error.
    pub async fn submit(&self, email: &str, password: &str) -> Result<(), Error> {
        self.begin_authentication()?;

        let credentials = Credentials::new(email, password);
        tracing::debug!("Checking {credentials:?}");

        let _in_flight = InFlightAuthentication { state: &self.state };

        match self.auth.sign_in(&credentials).await {
            Ok(AuthResponse {
                error: Some(reason),
                ..
            }) if !reason.is_empty() => {
                tracing::info!("Log-in rejected for {email}: {reason}");
                self.finish_with_error(reason.clone())?;

                Err(Error::AuthenticationFailure(reason))
            }
            Ok(AuthResponse { ok: true, .. }) => {
                self.lock_state()?.phase = LogInPhase::Redirected;
                tracing::info!("Logged in {email}");

                if let Some(redirect_url) = &self.requested_redirect {
                    tracing::debug!(
                        "Navigating to {} instead of requested {redirect_url}",
                        endpoints::ROOT
                    );
                }

                self.notifier
                    .notify(Notification::success(LOG_IN_SUCCESS_MSG));
                self.navigator.navigate(endpoints::ROOT);

                Ok(())
            }
            Ok(AuthResponse { ok: false, .. }) => {
                tracing::warn!("Authentication service gave no verdict for {email}");
                self.lock_state()?.phase = LogInPhase::Idle;

                Err(Error::Unexpected(
                    "the authentication service gave no verdict".to_owned(),
                ))
            }
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                self.finish_with_error(LOG_IN_FALLBACK_ERROR_MSG.to_owned())?;

                Err(Error::Unexpected(error.0))
            }
        }
    }

    fn begin_authentication(&self) -> Result<(), Error> {
        let mut state = self.lock_state()?;

        match state.phase {
            LogInPhase::Idle => {
                state.phase = LogInPhase::Authenticating;
                state.error = None;
                Ok(())
            }
            LogInPhase::Authenticating => Err(Error::SubmissionInProgress),
            LogInPhase::Redirected => Err(Error::FormClosed),
        }
    }

    fn finish_with_error(&self, message: String) -> Result<(), Error> {
        let mut state = self.lock_state()?;
        state.phase = LogInPhase::Idle;
        state.error = Some(message);

        Ok(())
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, LogInState>, Error> {
        self.state.lock().map_err(|error| {
            tracing::error!("could not acquire the log-in state lock: {error}");
            Error::StateLockError
        })
    }
}

/// Returns the form to idle if a log-in is dropped before the service answers.
struct InFlightAuthentication<'a> {
    state: &'a Mutex<LogInState>,
}

impl Drop for InFlightAuthentication<'_> {
    fn drop(&mut self) {
        match self.state.lock() {
            Ok(mut state) if state.phase == LogInPhase::Authenticating => {
                tracing::warn!("Log-in was cancelled");
                state.phase = LogInPhase::Idle;
            }
            Ok(_) => {}
            Err(error) => tracing::error!("could not acquire the log-in state lock: {error}"),
        }
    }
}
