//! Exchange rates and the sources they are fetched from.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::currency::Currency;

/// The number of `to_currency` units one unit of `from_currency` is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// The currency being converted from.
    pub from: Currency,
    /// The currency being converted to.
    pub to: Currency,
    /// The multiplier applied to an amount in `from` to get the amount in `to`.
    pub rate: Decimal,
}

impl ExchangeRate {
    /// Create a new exchange rate.
    pub fn new(from: Currency, to: Currency, rate: Decimal) -> Self {
        Self { from, to, rate }
    }
}

/// The error returned when a [RateSource] could not provide rates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("could not fetch exchange rates: {0}")]
pub struct RateSourceError(pub String);

/// Somewhere exchange rates can be fetched from, e.g. a market data API.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the latest available exchange rates.
    async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>, RateSourceError>;
}

/// A [RateSource] that always returns the same rates, e.g. rates read from a config file.
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
    rates: Vec<ExchangeRate>,
}

impl StaticRateSource {
    /// Create a source that serves `rates`.
    pub fn new(rates: Vec<ExchangeRate>) -> Self {
        Self { rates }
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn fetch_rates(&self) -> Result<Vec<ExchangeRate>, RateSourceError> {
        Ok(self.rates.clone())
    }
}

/// A lookup table of rates between every pair of currencies that can be derived from a set of
/// fetched rates.
#[derive(Debug, Clone)]
pub(crate) struct RateTable {
    rates: HashMap<(Currency, Currency), Decimal>,
    fetched_at: OffsetDateTime,
}

impl RateTable {
    /// Build the table from `exchange_rates`, adding inverse rates and rates that can be derived
    /// through a single intermediate currency.
    ///
    /// When the same pair appears more than once, the last rate wins.
    pub(crate) fn new(exchange_rates: Vec<ExchangeRate>, fetched_at: OffsetDateTime) -> Self {
        let mut rates = HashMap::new();
        let mut currencies = HashSet::new();

        for rate in exchange_rates {
            // Self-referential rates carry no information.
            if rate.from == rate.to {
                continue;
            }

            currencies.insert(rate.from);
            currencies.insert(rate.to);
            rates.insert((rate.from, rate.to), rate.rate);

            if rate.rate.is_zero() {
                tracing::warn!(
                    "Zero exchange rate encountered for {}/{}. Cannot calculate inverse.",
                    rate.from,
                    rate.to
                );
                continue;
            }

            match Decimal::ONE.checked_div(rate.rate) {
                Some(inverse) => {
                    rates.insert((rate.to, rate.from), inverse);
                }
                None => tracing::warn!(
                    "The inverse of the exchange rate {}/{} is out of range.",
                    rate.from,
                    rate.to
                ),
            }
        }

        let mut currencies: Vec<Currency> = currencies.into_iter().collect();
        currencies.sort();

        let mut derived = Vec::new();

        for &from in &currencies {
            for &to in &currencies {
                if from == to || rates.contains_key(&(from, to)) {
                    continue;
                }

                let via_rate = currencies.iter().find_map(|&via| {
                    let first = rates.get(&(from, via))?;
                    let second = rates.get(&(via, to))?;
                    first.checked_mul(*second)
                });

                if let Some(rate) = via_rate {
                    derived.push(((from, to), rate));
                }
            }
        }

        rates.extend(derived);

        Self { rates, fetched_at }
    }

    /// The rate for converting `from` into `to`, if known.
    pub(crate) fn get(&self, from: Currency, to: Currency) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }

        self.rates.get(&(from, to)).copied()
    }

    /// When the rates in this table were fetched.
    pub(crate) fn fetched_at(&self) -> OffsetDateTime {
        self.fetched_at
    }
}
