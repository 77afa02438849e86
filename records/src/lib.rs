//! Transaction payload types shared by the demo producer and consumer.
//!
//! This crate defines the wire schema for the demo: each Kafka message value
//! is a plain UTF-8 JSON object (no schema registry, no binary envelope) and
//! each message key is the record's transaction id. Field names are
//! PascalCase on the wire, matching the schema used by the other demo
//! clients in this project.
//!
//! # Example
//!
//! ```
//! use kafka_records::{StreamRecord, TransactionGenerator};
//!
//! let mut generator = TransactionGenerator::new();
//! let record = generator.next_record();
//! assert_eq!(record.key(), record.transaction_id);
//! ```

mod generator;

pub use generator::TransactionGenerator;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Trait for types that flow through the demo as Kafka message payloads.
///
/// Implementors supply the message key used for partition assignment on the
/// producing side. Payloads are self-describing JSON; the consumer uses the
/// same type to validate what it reads back.
pub trait StreamRecord:
    Serialize + DeserializeOwned + std::fmt::Debug + Send + Sync
{
    /// Key used for partition assignment. Must be unique per message
    /// within a producer run.
    fn key(&self) -> &str;
}

/// Kind of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
    Payment,
}

/// Processing status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// A single financial transaction event.
///
/// The JSON field names are PascalCase on the wire:
///
/// ```json
/// {
///   "TransactionId": "7f9c24e8b2de4f1a9e1c2d4b5a6f7081",
///   "AccountNumber": "4532015112830366",
///   "Amount": 2411.57,
///   "Currency": "USD",
///   "Timestamp": "2026-08-06T12:00:00Z",
///   "TransactionType": "deposit",
///   "Status": "completed"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionRecord {
    /// Unique per message; doubles as the Kafka message key.
    pub transaction_id: String,
    pub account_number: String,
    /// Non-negative, two decimal places.
    pub amount: f64,
    pub currency: String,
    /// RFC 3339.
    pub timestamp: String,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
}

impl StreamRecord for TransactionRecord {
    fn key(&self) -> &str {
        &self.transaction_id
    }
}
