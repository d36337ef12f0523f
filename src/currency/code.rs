//! The supported currency codes.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// A supported ISO 4217 currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    /// United States dollar.
    Usd,
    /// Euro.
    Eur,
    /// Bangladeshi taka.
    Bdt,
    /// Indian rupee.
    Inr,
}

/// The currency all transaction amounts are normalized into before they are submitted.
pub const CANONICAL_CURRENCY: Currency = Currency::Usd;

impl Currency {
    /// Every supported currency, in the order they are offered to the user.
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Bdt, Currency::Inr];

    /// The three letter currency code, e.g. "USD".
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Bdt => "BDT",
            Currency::Inr => "INR",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The error returned when a string is not a supported currency code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("\"{0}\" is not a supported currency")]
pub struct UnsupportedCurrency(pub String);

impl FromStr for Currency {
    type Err = UnsupportedCurrency;

    /// Parse a currency code, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();

        Currency::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| UnsupportedCurrency(s.to_owned()))
    }
}

impl TryFrom<String> for Currency {
    type Error = UnsupportedCurrency;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{CANONICAL_CURRENCY, Currency, UnsupportedCurrency};

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("EUR".parse(), Ok(Currency::Eur));
        assert_eq!("inr".parse(), Ok(Currency::Inr));
        assert_eq!(" bdt ".parse(), Ok(Currency::Bdt));
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(
            "XYZ".parse::<Currency>(),
            Err(UnsupportedCurrency("XYZ".to_owned()))
        );
        assert!("".parse::<Currency>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for currency in Currency::ALL {
            assert_eq!(currency.to_string().parse(), Ok(currency));
        }
    }

    #[test]
    fn canonical_currency_is_usd() {
        assert_eq!(CANONICAL_CURRENCY, Currency::Usd);
    }

    #[test]
    fn serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), "\"EUR\"");
        assert_eq!(
            serde_json::from_str::<Currency>("\"usd\"").unwrap(),
            Currency::Usd
        );
    }
}
