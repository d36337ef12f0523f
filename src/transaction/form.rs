//! The editable state of the transaction entry form.

use rust_decimal::Decimal;

use crate::{
    ValidationError,
    currency::{CANONICAL_CURRENCY, ConversionError, Currency, CurrencyConverter},
    email::Email,
    session::Session,
    transaction::core::{Category, TransactionType, parse_amount},
};

/// The fields of the transaction form as the user has filled them in so far.
///
/// The amount is kept as the raw text the user typed so that partially typed numbers survive
/// until submission.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionForm {
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// The amount as typed by the user.
    pub amount: String,
    /// The currency the amount was entered in.
    pub currency: Option<Currency>,
    /// What the transaction was for.
    pub category: Category,
    email: Option<Email>,
}

/// The validated contents of a [TransactionForm].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTransactionForm {
    pub(crate) transaction_type: TransactionType,
    pub(crate) amount: Decimal,
    pub(crate) currency: Currency,
    pub(crate) category: Category,
    pub(crate) email: Email,
}

impl TransactionForm {
    /// Create a form with the default values and the email of the session's user.
    pub fn new(session: &Session) -> Self {
        Self {
            transaction_type: TransactionType::default(),
            amount: String::new(),
            currency: Some(CANONICAL_CURRENCY),
            category: Category::default(),
            email: session.email().cloned(),
        }
    }

    /// The email of the user the transaction will belong to.
    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    /// Set the field called `name` to `value`.
    ///
    /// `name` is one of "type", "amount", "currency" or "category". An empty currency clears the
    /// selection.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a field, if the field is read-only or if `value` is not
    /// one of the allowed choices for the field. The form is left unchanged on error.
    pub fn update(&mut self, name: &str, value: &str) -> Result<(), ValidationError> {
        match name {
            "type" => self.transaction_type = value.parse()?,
            "amount" => self.amount = value.to_owned(),
            "currency" if value.trim().is_empty() => self.currency = None,
            "currency" => {
                let currency = value
                    .parse()
                    .map_err(|_| ValidationError::InvalidChoice {
                        field: "currency",
                        value: value.to_owned(),
                    })?;
                self.currency = Some(currency);
            }
            "category" => self.category = value.parse()?,
            "email" => return Err(ValidationError::ReadOnlyField("email")),
            other => return Err(ValidationError::UnknownField(other.to_owned())),
        }

        Ok(())
    }

    /// Check that the form can be submitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is missing or invalid, no currency is selected or there is
    /// no logged in user.
    pub fn validate(&self) -> Result<ValidTransactionForm, ValidationError> {
        let amount = parse_amount(&self.amount)?;
        let currency = self.currency.ok_or(ValidationError::MissingField("currency"))?;
        let email = self.email.clone().ok_or(ValidationError::NotLoggedIn)?;

        Ok(ValidTransactionForm {
            transaction_type: self.transaction_type,
            amount,
            currency,
            category: self.category,
            email,
        })
    }

    /// Restore the default values, keeping the user's email.
    pub fn reset(&mut self) {
        let email = self.email.take();
        *self = Self {
            email,
            ..Self::new(&Session::anonymous())
        };
    }
}

/// Express `amount`, entered in `currency`, in the canonical currency.
///
/// Amounts already in the canonical currency are returned as is without consulting the
/// converter. The result is not rounded.
pub async fn derive_converted_amount(
    converter: &CurrencyConverter,
    amount: Decimal,
    currency: Currency,
) -> Result<Decimal, ConversionError> {
    if currency == CANONICAL_CURRENCY {
        return Ok(amount);
    }

    converter
        .convert(amount, currency, CANONICAL_CURRENCY)
        .await
}
