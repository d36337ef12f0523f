//! Converts amounts between currencies using cached exchange rates.

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, Ordering},
};

use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;

use crate::currency::{
    Currency,
    rates::{RateSource, RateTable},
};

/// How long fetched rates are used before they are refreshed, unless configured otherwise.
pub const DEFAULT_RATE_TTL: Duration = Duration::hours(1);

/// The errors that may occur when converting an amount.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// There is no known exchange rate for the requested pair.
    #[error("no exchange rate is available for {from}/{to}")]
    RateUnavailable {
        /// The currency being converted from.
        from: Currency,
        /// The currency being converted to.
        to: Currency,
    },

    /// The most recent attempt to fetch rates failed.
    #[error("exchange rates could not be fetched: {0}")]
    SourceFailed(String),

    /// Only non-negative amounts can be converted.
    #[error("cannot convert the negative amount {0}")]
    NegativeAmount(Decimal),

    /// The converted amount is too large to represent.
    #[error("{amount} {from} is too large to convert into {to}")]
    Overflow {
        /// The amount being converted.
        amount: Decimal,
        /// The currency being converted from.
        from: Currency,
        /// The currency being converted to.
        to: Currency,
    },
}

/// A snapshot of the converter's rate lookup state.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterStatus {
    /// Whether rates are currently being fetched.
    pub is_loading: bool,
    /// The error from the most recent fetch, if it failed.
    pub error: Option<ConversionError>,
}

/// Converts amounts between currencies.
///
/// Rates are fetched from a [RateSource] on first use and cached for the configured time-to-live.
/// Converting between two identical currencies never touches the rates.
pub struct CurrencyConverter {
    source: Arc<dyn RateSource>,
    ttl: Duration,
    table: RwLock<Option<RateTable>>,
    last_error: RwLock<Option<ConversionError>>,
    is_loading: AtomicBool,
    // Held while fetching so concurrent conversions share a single fetch.
    refresh_lock: Mutex<()>,
}

impl CurrencyConverter {
    /// Create a converter that caches rates from `source` for [DEFAULT_RATE_TTL].
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self::with_ttl(source, DEFAULT_RATE_TTL)
    }

    /// Create a converter that caches rates from `source` for `ttl`.
    ///
    /// A zero `ttl` fetches rates for every conversion.
    pub fn with_ttl(source: Arc<dyn RateSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            table: RwLock::new(None),
            last_error: RwLock::new(None),
            is_loading: AtomicBool::new(false),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Convert `amount` from the currency `from` into the currency `to`.
    ///
    /// The result is not rounded.
    ///
    /// # Errors
    ///
    /// Returns [ConversionError::NegativeAmount] if `amount` is negative and
    /// [ConversionError::RateUnavailable] if no rate is known for the pair, e.g. because the rate
    /// source could not be reached. Returns [ConversionError::Overflow] if the result does not fit
    /// in a [Decimal].
    pub async fn convert(
        &self,
        amount: Decimal,
        from: Currency,
        to: Currency,
    ) -> Result<Decimal, ConversionError> {
        if amount < Decimal::ZERO {
            return Err(ConversionError::NegativeAmount(amount));
        }

        if from == to {
            return Ok(amount);
        }

        self.refresh_if_stale().await;

        let rate = self
            .read_table(|table| table.and_then(|table| table.get(from, to)))
            .ok_or(ConversionError::RateUnavailable { from, to })?;

        amount
            .checked_mul(rate)
            .ok_or(ConversionError::Overflow { amount, from, to })
    }

    /// Whether rates are being fetched and whether the last fetch failed.
    pub fn status(&self) -> ConverterStatus {
        let error = match self.last_error.read() {
            Ok(last_error) => last_error.clone(),
            Err(error) => Some(ConversionError::SourceFailed(error.to_string())),
        };

        ConverterStatus {
            is_loading: self.is_loading.load(Ordering::Acquire),
            error,
        }
    }

    /// Fetch new rates now, regardless of whether the cached rates are stale.
    ///
    /// On failure the previous rates, if any, are kept and the error is reported by
    /// [CurrencyConverter::status].
    pub async fn refresh(&self) {
        let _guard = self.refresh_lock.lock().await;
        self.fetch().await;
    }

    async fn refresh_if_stale(&self) {
        if !self.is_stale() {
            return;
        }

        let _guard = self.refresh_lock.lock().await;

        // Another task may have refreshed the rates while we waited for the lock.
        if !self.is_stale() {
            return;
        }

        self.fetch().await;
    }

    async fn fetch(&self) {
        let _loading = LoadingFlag::raise(&self.is_loading);
        tracing::debug!("Fetching exchange rates");

        let result = self.source.fetch_rates().await;
        let fetched_at = OffsetDateTime::now_utc();

        match result {
            Ok(rates) => {
                tracing::info!("Fetched {} exchange rates", rates.len());
                let table = RateTable::new(rates, fetched_at);

                match self.table.write() {
                    Ok(mut cached) => *cached = Some(table),
                    Err(error) => tracing::error!("Could not update the rate cache: {error}"),
                }

                self.set_last_error(None);
            }
            Err(error) => {
                if self.read_table(|table| table.is_some()) {
                    tracing::warn!("{error}, continuing with previously fetched rates");
                } else {
                    tracing::error!("{error}");
                }

                self.set_last_error(Some(ConversionError::SourceFailed(error.0)));
            }
        }
    }

    fn is_stale(&self) -> bool {
        let ttl = self.ttl;

        self.read_table(|table| match table {
            Some(table) => OffsetDateTime::now_utc() - table.fetched_at() >= ttl,
            None => true,
        })
    }

    fn read_table<T>(&self, f: impl FnOnce(Option<&RateTable>) -> T) -> T {
        match self.table.read() {
            Ok(table) => f(table.as_ref()),
            Err(error) => {
                tracing::error!("Could not read the rate cache: {error}");
                f(None)
            }
        }
    }

    fn set_last_error(&self, error: Option<ConversionError>) {
        match self.last_error.write() {
            Ok(mut last_error) => *last_error = error,
            Err(error) => tracing::error!("Could not record the rate fetch status: {error}"),
        }
    }
}

/// Sets the loading flag for as long as it is alive, including when a fetch is cancelled.
struct LoadingFlag<'a>(&'a AtomicBool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
