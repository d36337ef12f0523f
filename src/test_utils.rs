#![allow(missing_docs)]

//! Fakes for the collaborator traits, shared by the unit tests.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    alert::{Notification, Notifier},
    auth::{AuthResponse, AuthService, AuthServiceError, Credentials},
    currency::{ExchangeRate, RateSource, RateSourceError},
    navigation::Navigator,
    transaction::{NewTransaction, SubmissionClient, SubmissionError},
};

/// Serves a fixed list of rates and counts how often it was asked for them.
pub(crate) struct CountingRateSource {
    rates: Vec<ExchangeRate>,
    fetch_count: AtomicUsize,
}

impl CountingRateSource {
    pub(crate) fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for CountingRateSource {
    async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>, RateSourceError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.rates.clone())
    }
}

pub(crate) fn countable_rates(rates: Vec<ExchangeRate>) -> Arc<CountingRateSource> {
    Arc::new(CountingRateSource {
        rates,
        fetch_count: AtomicUsize::new(0),
    })
}

pub(crate) struct FailingRateSource;

#[async_trait]
impl RateSource for FailingRateSource {
    async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>, RateSourceError> {
        Err(RateSourceError("rate service unavailable".to_owned()))
    }
}

/// A rate source that can be switched between serving rates and failing.
pub(crate) struct FlakyRateSource {
    rates: Vec<ExchangeRate>,
    is_failing: AtomicBool,
}

impl FlakyRateSource {
    pub(crate) fn new(rates: Vec<ExchangeRate>) -> Self {
        Self {
            rates,
            is_failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn start_failing(&self) {
        self.is_failing.store(true, Ordering::SeqCst);
    }

    pub(crate) fn stop_failing(&self) {
        self.is_failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl RateSource for FlakyRateSource {
    async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>, RateSourceError> {
        if self.is_failing.load(Ordering::SeqCst) {
            Err(RateSourceError("rate service unavailable".to_owned()))
        } else {
            Ok(self.rates.clone())
        }
    }
}

/// Serves a fixed list of rates after a delay.
pub(crate) struct SlowRateSource {
    rates: Vec<ExchangeRate>,
    delay: Duration,
}

impl SlowRateSource {
    pub(crate) fn new(rates: Vec<ExchangeRate>, delay: Duration) -> Self {
        Self { rates, delay }
    }
}

#[async_trait]
impl RateSource for SlowRateSource {
    async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>, RateSourceError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.rates.clone())
    }
}

/// Records the transactions it accepts.
#[derive(Default)]
pub(crate) struct RecordingClient {
    submitted: Mutex<Vec<NewTransaction>>,
    is_failing: AtomicBool,
    delay: Duration,
}

impl RecordingClient {
    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub(crate) fn failing() -> Self {
        let client = Self::default();
        client.set_failing(true);
        client
    }

    pub(crate) fn set_failing(&self, is_failing: bool) {
        self.is_failing.store(is_failing, Ordering::SeqCst);
    }

    /// The transactions that were accepted, in order.
    pub(crate) fn submitted(&self) -> Vec<NewTransaction> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionClient for RecordingClient {
    async fn add_transaction(&self, transaction: &NewTransaction) -> Result<(), SubmissionError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.is_failing.load(Ordering::SeqCst) {
            return Err(SubmissionError("HTTP 500".to_owned()));
        }

        self.submitted.lock().unwrap().push(transaction.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_owned());
    }
}

/// Gives the same canned answer to every sign-in request.
pub(crate) struct StubAuthService {
    response: Mutex<Result<AuthResponse, AuthServiceError>>,
    requests: Mutex<Vec<Credentials>>,
    delay: Duration,
}

impl StubAuthService {
    pub(crate) fn responding(response: Result<AuthResponse, AuthServiceError>) -> Self {
        Self {
            response: Mutex::new(response),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn set_response(&self, response: Result<AuthResponse, AuthServiceError>) {
        *self.response.lock().unwrap() = response;
    }

    pub(crate) fn requests(&self) -> Vec<Credentials> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthService for StubAuthService {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthResponse, AuthServiceError> {
        self.requests.lock().unwrap().push(credentials.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.response.lock().unwrap().clone()
    }
}
