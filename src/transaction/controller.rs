//! Drives the transaction entry form from first keystroke to submission.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use rust_decimal::Decimal;

use crate::{
    Error,
    alert::{Notification, Notifier},
    currency::{CANONICAL_CURRENCY, CurrencyConverter},
    endpoints,
    navigation::Navigator,
    session::Session,
    transaction::{
        client::SubmissionClient,
        core::{NewTransaction, parse_amount, round_to_cents},
        form::{TransactionForm, ValidTransactionForm, derive_converted_amount},
    },
};

/// How long to wait after a successful submission before navigating home.
pub const DEFAULT_NAVIGATION_DELAY: Duration = Duration::from_secs(1);

/// Shown after a transaction was submitted.
pub const TRANSACTION_ADDED_MSG: &str = "Transaction added successfully!";

/// Where the transaction form is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// The user is filling in the form.
    Editing,
    /// A submission is in flight, further submissions are rejected.
    Submitting,
    /// The transaction was submitted and the form will navigate away.
    Submitted,
}

#[derive(Debug)]
struct FormState {
    form: TransactionForm,
    phase: FormPhase,
}

/// The controller behind the transaction entry form.
///
/// All methods take `&self` so the controller can be shared between the tasks handling user
/// events. At most one submission is in flight at any time.
pub struct TransactionFormController {
    state: Mutex<FormState>,
    converter: Arc<CurrencyConverter>,
    client: Arc<dyn SubmissionClient>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    navigation_delay: Duration,
}

impl TransactionFormController {
    /// Create the controller for a freshly opened form.
    ///
    /// The transaction's owner is taken from `session` and cannot be changed.
    pub fn new(
        session: &Session,
        converter: Arc<CurrencyConverter>,
        client: Arc<dyn SubmissionClient>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            state: Mutex::new(FormState {
                form: TransactionForm::new(session),
                phase: FormPhase::Editing,
            }),
            converter,
            client,
            notifier,
            navigator,
            navigation_delay: DEFAULT_NAVIGATION_DELAY,
        }
    }

    /// Set how long to wait after a successful submission before navigating home.
    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.navigation_delay = delay;
        self
    }

    /// A snapshot of the form's fields.
    pub fn form(&self) -> Result<TransactionForm, Error> {
        Ok(self.lock_state()?.form.clone())
    }

    /// Where the form is in its lifecycle.
    pub fn phase(&self) -> Result<FormPhase, Error> {
        Ok(self.lock_state()?.phase)
    }

    /// Whether the submit control should be disabled.
    pub fn is_submit_disabled(&self) -> bool {
        !matches!(self.phase(), Ok(FormPhase::Editing))
    }

    /// Handle a change to the field called `name`.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the field does not exist, is read-only or `value` is not
    /// an allowed choice.
    pub fn update(&self, name: &str, value: &str) -> Result<(), Error> {
        let mut state = self.lock_state()?;

        state.form.update(name, value).map_err(|error| {
            tracing::warn!("Rejected change to field \"{name}\": {error}");
            Error::Validation(error)
        })
    }

    /// The current amount expressed in the canonical currency, before rounding.
    ///
    /// This is recomputed from the current fields on every call.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the amount or currency is missing or invalid, or
    /// [Error::ConversionUnavailable] if the amount cannot be converted.
    pub async fn converted_amount(&self) -> Result<Decimal, Error> {
        let (raw_amount, currency) = {
            let state = self.lock_state()?;
            (state.form.amount.clone(), state.form.currency)
        };

        let amount = parse_amount(&raw_amount)?;
        let currency = currency.ok_or(crate::ValidationError::MissingField("currency"))?;

        derive_converted_amount(&self.converter, amount, currency)
            .await
            .map_err(Error::ConversionUnavailable)
    }

    /// The converted amount formatted for display, e.g. "$108.00".
    ///
    /// Returns `None` while no amount can be derived from the form.
    pub async fn converted_amount_preview(&self) -> Option<String> {
        self.converted_amount()
            .await
            .ok()
            .map(|amount| format!("${}", round_to_cents(amount)))
    }

    /// The label shown next to the form, e.g. "Amount in USD: $108.00".
    ///
    /// A dash stands in for the amount while none can be derived.
    pub async fn converted_amount_display(&self) -> String {
        let preview = self
            .converted_amount_preview()
            .await
            .unwrap_or_else(|| "$\u{2014}".to_owned());

        format!("Amount in {CANONICAL_CURRENCY}: {preview}")
    }

    /// Submit the form.
    ///
    /// The form is validated, the amount is converted into the canonical currency and the
    /// resulting transaction is handed to the submission client. Every outcome is reported to
    /// the user through the notifier. On success the form is reset and, after the navigation
    /// delay, the user is sent to the home view. On failure the form keeps its values so the
    /// user can try again.
    ///
    /// # Errors
    ///
    /// - [Error::SubmissionInProgress] or [Error::FormClosed] if the form is not being edited.
    /// - [Error::Validation] if the form is incomplete. The client is not called.
    /// - [Error::ConversionUnavailable] if the amount could not be converted. The client is not
    ///   called.
    /// - [Error::SubmissionFailure] if the client rejected the transaction.
    pub async fn submit(&self) -> Result<NewTransaction, Error> {
        let valid_form = match self.begin_submission() {
            Ok(valid_form) => valid_form,
            Err(error @ Error::Validation(_)) => {
                tracing::warn!("Blocked submission of incomplete transaction form: {error}");
                self.notifier
                    .notify(Notification::alert(error.user_message()));
                return Err(error);
            }
            Err(error) => return Err(error),
        };

        let _in_flight = InFlightSubmission { state: &self.state };

        match self.convert_and_submit(valid_form).await {
            Ok(transaction) => {
                {
                    let mut state = self.lock_state()?;
                    state.phase = FormPhase::Submitted;
                    state.form.reset();
                }

                tracing::info!(
                    "Submitted {} of {} {} ({} {})",
                    transaction.transaction_type,
                    transaction.amount,
                    transaction.currency,
                    transaction.converted_amount,
                    CANONICAL_CURRENCY,
                );
                self.notifier
                    .notify(Notification::success(TRANSACTION_ADDED_MSG));

                tokio::time::sleep(self.navigation_delay).await;
                self.navigator.navigate(endpoints::ROOT);

                Ok(transaction)
            }
            Err(error) => {
                tracing::error!("Could not submit transaction: {error}");
                self.lock_state()?.phase = FormPhase::Editing;
                self.notifier
                    .notify(Notification::error(error.user_message()));

                Err(error)
            }
        }
    }

    /// Move from editing to submitting if the form is valid.
    fn begin_submission(&self) -> Result<ValidTransactionForm, Error> {
        let mut state = self.lock_state()?;

        match state.phase {
            FormPhase::Editing => {}
            FormPhase::Submitting => {
                tracing::debug!("Ignored submission while another is in flight");
                return Err(Error::SubmissionInProgress);
            }
            FormPhase::Submitted => return Err(Error::FormClosed),
        }

        let valid_form = state.form.validate()?;
        state.phase = FormPhase::Submitting;

        Ok(valid_form)
    }

    async fn convert_and_submit(
        &self,
        valid_form: ValidTransactionForm,
    ) -> Result<NewTransaction, Error> {
        let converted_amount =
            derive_converted_amount(&self.converter, valid_form.amount, valid_form.currency)
                .await
                .map_err(Error::ConversionUnavailable)?;

        let transaction = NewTransaction {
            transaction_type: valid_form.transaction_type,
            amount: valid_form.amount,
            currency: valid_form.currency,
            category: valid_form.category,
            email: valid_form.email,
            converted_amount: round_to_cents(converted_amount),
        };

        self.client
            .add_transaction(&transaction)
            .await
            .map_err(|error| Error::SubmissionFailure(error.0))?;

        Ok(transaction)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, FormState>, Error> {
        self.state.lock().map_err(|error| {
            tracing::error!("could not acquire the form state lock: {error}");
            Error::StateLockError
        })
    }
}

/// Returns the form to editing if a submission is dropped before it finishes.
struct InFlightSubmission<'a> {
    state: &'a Mutex<FormState>,
}

impl Drop for InFlightSubmission<'_> {
    fn drop(&mut self) {
        match self.state.lock() {
            Ok(mut state) if state.phase == FormPhase::Submitting => {
                tracing::warn!("Transaction submission was cancelled");
                state.phase = FormPhase::Editing;
            }
            Ok(_) => {}
            Err(error) => tracing::error!("could not acquire the form state lock: {error}"),
        }
    }
}
