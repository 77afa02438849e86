//! Synthetic transaction generator for the demo producer.

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::{TransactionRecord, TransactionStatus, TransactionType};

const TYPES: &[TransactionType] = &[
    TransactionType::Deposit,
    TransactionType::Withdrawal,
    TransactionType::Transfer,
    TransactionType::Payment,
];

const STATUSES: &[TransactionStatus] = &[
    TransactionStatus::Pending,
    TransactionStatus::Completed,
    TransactionStatus::Failed,
];

/// Produces random [`TransactionRecord`]s with ids that never repeat
/// within a run.
#[derive(Debug, Default)]
pub struct TransactionGenerator {
    generated: u64,
}

impl TransactionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records generated so far.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Builds the next record. The transaction id is a fresh v4 UUID, so it
    /// is suitable as a partitioning key.
    pub fn next_record(&mut self) -> TransactionRecord {
        let mut rng = rand::thread_rng();
        self.generated += 1;

        TransactionRecord {
            transaction_id: Uuid::new_v4().simple().to_string(),
            account_number: rng
                .gen_range(1_000_000_000_000_000u64..10_000_000_000_000_000u64)
                .to_string(),
            amount: round2(rng.gen_range(0.0..10_000.0)),
            currency: "USD".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            transaction_type: TYPES[rng.gen_range(0..TYPES.len())],
            status: STATUSES[rng.gen_range(0..STATUSES.len())],
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
