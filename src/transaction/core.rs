//! Defines the core data models for transactions.

use std::{fmt::Display, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{ValidationError, currency::Currency, email::Email};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that was earned.
    #[default]
    Income,
    /// Money that was spent.
    Expense,
}

impl TransactionType {
    fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(ValidationError::InvalidChoice {
                field: "type",
                value: other.to_owned(),
            }),
        }
    }
}

/// What a transaction was for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Wages and other employment income.
    #[default]
    Salary,
    /// Groceries and eating out.
    Food,
    /// Housing costs.
    Rent,
    /// Leisure spending.
    Entertainment,
    /// Anything that does not fit the other categories.
    Other,
}

impl Category {
    /// Every category, in the order they are offered to the user.
    pub const ALL: [Category; 5] = [
        Category::Salary,
        Category::Food,
        Category::Rent,
        Category::Entertainment,
        Category::Other,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Food => "food",
            Category::Rent => "rent",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();

        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| ValidationError::InvalidChoice {
                field: "category",
                value: value.to_owned(),
            })
    }
}

/// A validated transaction, normalized into the canonical currency and ready to be submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount exactly as entered, in `currency`.
    pub amount: Decimal,
    /// The currency `amount` was entered in.
    pub currency: Currency,
    /// What the transaction was for.
    pub category: Category,
    /// The email of the user that owns the transaction.
    pub email: Email,
    /// `amount` in the canonical currency, rounded to cents.
    pub converted_amount: Decimal,
}

// ============================================================================
// AMOUNTS
// ============================================================================

/// Parse an amount typed by the user.
///
/// # Errors
///
/// Returns [ValidationError::MissingField] for blank input, [ValidationError::InvalidAmount] if
/// `raw_amount` is not a number and [ValidationError::NegativeAmount] if it is below zero.
pub fn parse_amount(raw_amount: &str) -> Result<Decimal, ValidationError> {
    let raw_amount = raw_amount.trim();

    if raw_amount.is_empty() {
        return Err(ValidationError::MissingField("amount"));
    }

    let amount = Decimal::from_str(raw_amount)
        .or_else(|_| Decimal::from_scientific(raw_amount))
        .map_err(|_| ValidationError::InvalidAmount(raw_amount.to_owned()))?;

    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(amount));
    }

    Ok(amount)
}

/// Round `amount` to two decimal places, always keeping two places, e.g. 50 becomes 50.00.
///
/// Midpoints are rounded away from zero.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
