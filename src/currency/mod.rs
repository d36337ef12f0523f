//! Currencies, exchange rates and conversion between them.

mod code;
mod converter;
mod rates;

pub use code::{CANONICAL_CURRENCY, Currency, UnsupportedCurrency};
pub use converter::{ConversionError, ConverterStatus, CurrencyConverter, DEFAULT_RATE_TTL};
pub use rates::{ExchangeRate, RateSource, RateSourceError, StaticRateSource};
