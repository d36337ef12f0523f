//! The boundary where new transactions leave the application.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::transaction::core::NewTransaction;

/// The error returned when a transaction could not be submitted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("could not submit transaction: {0}")]
pub struct SubmissionError(pub String);

/// Persists new transactions, e.g. by sending them to a REST API.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// Submit `transaction`. Only success or failure is reported back.
    async fn add_transaction(&self, transaction: &NewTransaction) -> Result<(), SubmissionError>;
}

/// A [SubmissionClient] that appends each transaction as a line of JSON to a file.
#[derive(Debug, Clone)]
pub struct JsonLinesClient {
    path: PathBuf,
}

impl JsonLinesClient {
    /// Create a client that appends to the file at `path`, creating it if needed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SubmissionClient for JsonLinesClient {
    async fn add_transaction(&self, transaction: &NewTransaction) -> Result<(), SubmissionError> {
        let mut line = serde_json::to_string(transaction)
            .map_err(|error| SubmissionError(format!("could not serialize as JSON: {error}")))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|error| SubmissionError(format!("could not open {:?}: {error}", self.path)))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|error| SubmissionError(format!("could not write {:?}: {error}", self.path)))?;

        file.flush()
            .await
            .map_err(|error| SubmissionError(format!("could not write {:?}: {error}", self.path)))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal_macros::dec;

    use crate::{
        currency::Currency,
        email::Email,
        transaction::core::{Category, NewTransaction, TransactionType},
    };

    use super::{JsonLinesClient, SubmissionClient};

    fn transaction(amount: rust_decimal::Decimal) -> NewTransaction {
        NewTransaction {
            transaction_type: TransactionType::Income,
            amount,
            currency: Currency::Usd,
            category: Category::Salary,
            email: Email::new_unchecked("jo@example.com"),
            converted_amount: amount,
        }
    }

    #[tokio::test]
    async fn appends_one_json_line_per_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.jsonl");
        let client = JsonLinesClient::new(&path);

        client.add_transaction(&transaction(dec!(1.00))).await.unwrap();
        client.add_transaction(&transaction(dec!(2.00))).await.unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<NewTransaction> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines, vec![transaction(dec!(1.00)), transaction(dec!(2.00))]);
    }

    #[tokio::test]
    async fn reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("transactions.jsonl");
        let client = JsonLinesClient::new(path);

        let result = client.add_transaction(&transaction(dec!(1))).await;

        assert!(result.is_err());
    }
}
