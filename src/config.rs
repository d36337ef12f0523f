//! Settings loaded from a JSON config file.
//!
//! ```json
//! {
//!     "rate_ttl_secs": 3600,
//!     "navigation_delay_ms": 1000,
//!     "rates": [{ "from": "EUR", "to": "USD", "rate": "1.08" }],
//!     "users": [{ "email": "jo@example.com", "password_hash": "$2b$12$..." }]
//! }
//! ```
//!
//! Every key is optional.

use std::{fs, path::Path};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    auth::LocalAuthService,
    currency::{ExchangeRate, StaticRateSource},
    email::Email,
    password::PasswordHash,
};

/// The errors that may occur when loading the config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("could not read config file {path}: {source}")]
    Io {
        /// The path of the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The config file is not valid JSON or has the wrong shape.
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// An exchange rate is negative.
    #[error("the exchange rate {from}/{to} must not be negative, got {rate}")]
    NegativeRate {
        /// The currency being converted from.
        from: String,
        /// The currency being converted to.
        to: String,
        /// The rejected rate.
        rate: Decimal,
    },
}

/// A user that may log in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    /// The user's email address.
    pub email: Email,
    /// A bcrypt hash of the user's password, see the `hash_password` binary.
    pub password_hash: PasswordHash,
}

/// The application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long fetched exchange rates are used before they are fetched again.
    pub rate_ttl_secs: u64,
    /// How long to wait after adding a transaction before navigating home.
    pub navigation_delay_ms: u64,
    /// The exchange rates served by the static rate source.
    pub rates: Vec<ExchangeRate>,
    /// The users accepted by the local authentication service.
    pub users: Vec<UserConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rate_ttl_secs: 3600,
            navigation_delay_ms: 1000,
            rates: Vec::new(),
            users: Vec::new(),
        }
    }
}

impl Config {
    /// Read the config from the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON or contains invalid values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_json(&json)?;
        tracing::info!(
            "Loaded config from {} with {} exchange rates and {} users",
            path.display(),
            config.rates.len(),
            config.users.len()
        );

        Ok(config)
    }

    /// Parse the config from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not valid JSON or contains invalid values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;

        if let Some(rate) = config.rates.iter().find(|rate| rate.rate < Decimal::ZERO) {
            return Err(ConfigError::NegativeRate {
                from: rate.from.to_string(),
                to: rate.to.to_string(),
                rate: rate.rate,
            });
        }

        Ok(config)
    }

    /// How long fetched exchange rates are used before they are fetched again.
    pub fn rate_ttl(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.rate_ttl_secs).unwrap_or(i64::MAX))
    }

    /// How long to wait after adding a transaction before navigating home.
    pub fn navigation_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.navigation_delay_ms)
    }

    /// A rate source serving the configured exchange rates.
    pub fn rate_source(&self) -> StaticRateSource {
        StaticRateSource::new(self.rates.clone())
    }

    /// An authentication service accepting the configured users.
    pub fn auth_service(&self) -> LocalAuthService {
        LocalAuthService::new(
            self.users
                .iter()
                .map(|user| (user.email.clone(), user.password_hash.clone())),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rust_decimal_macros::dec;

    use crate::currency::{Currency, ExchangeRate};

    use super::{Config, ConfigError};

    #[test]
    fn empty_object_uses_defaults() {
        let config = Config::from_json("{}").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.rate_ttl(), time::Duration::hours(1));
        assert_eq!(
            config.navigation_delay(),
            std::time::Duration::from_secs(1)
        );
    }

    #[test]
    fn parses_rates_and_users() {
        let config = Config::from_json(
            r#"{
                "rate_ttl_secs": 60,
                "navigation_delay_ms": 0,
                "rates": [{ "from": "EUR", "to": "USD", "rate": "1.08" }],
                "users": [{ "email": "jo@example.com", "password_hash": "$2b$04$abc" }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.rate_ttl(), time::Duration::minutes(1));
        assert_eq!(
            config.rates,
            vec![ExchangeRate::new(Currency::Eur, Currency::Usd, dec!(1.08))]
        );
        assert_eq!(config.users[0].email.as_str(), "jo@example.com");
    }

    #[test]
    fn rejects_unknown_currency() {
        let result = Config::from_json(r#"{ "rates": [{ "from": "GBP", "to": "USD", "rate": "1.3" }] }"#);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_invalid_user_email() {
        let result = Config::from_json(
            r#"{ "users": [{ "email": "nobody", "password_hash": "$2b$04$abc" }] }"#,
        );

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_negative_rate() {
        let result = Config::from_json(r#"{ "rates": [{ "from": "EUR", "to": "USD", "rate": "-1" }] }"#);

        assert!(matches!(result, Err(ConfigError::NegativeRate { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = Config::load(Path::new("/definitely/not/a/config.json"));

        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
