//! Environment-adaptive Kafka demo clients built on `rdkafka` and `tokio`.
//!
//! This crate drives a bounded producer/consumer exchange against either a
//! local broker (loopback or a containerized `kafka:` alias, plaintext,
//! topics auto-created) or a managed cloud broker (SASL_SSL, topics
//! pre-provisioned).
//!
//! # Flow
//!
//! 1. [`ClientSettings::from_env`] reads the environment and resolves an
//!    immutable [`ConnectionProfile`] once, shared by every connection.
//! 2. [`verify_topic`] confirms the topic exists before a session starts;
//!    for managed brokers a missing topic is fatal, local brokers create
//!    topics lazily.
//! 3. A [`ProducerSession`] or [`ConsumerSession`] runs one bounded loop:
//!    per-message faults are logged and skipped, connection faults end the
//!    run, and the connection is released exactly once.
//! 4. A [`ShutdownCoordinator`] turns SIGINT/SIGTERM into a single
//!    cancellation, no matter how many signals arrive.
//!
//! # Example Producer
//!
//! ```no_run
//! use kafka_client::{ClientSettings, ProducerSession, ShutdownCoordinator};
//! use kafka_records::TransactionGenerator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = ClientSettings::from_env("demo-producer", "demo-group")?;
//!
//!     let coordinator = ShutdownCoordinator::new();
//!     coordinator.listen();
//!
//!     let mut session = ProducerSession::connect(&settings.profile, coordinator.handle())?;
//!     let mut generator = TransactionGenerator::new();
//!     let report = session
//!         .run(&settings.topic, 10, || generator.next_record())
//!         .await?;
//!
//!     println!("delivered {} records", report.delivered);
//!     Ok(())
//! }
//! ```

mod admin;
mod config;
mod consumer;
mod error;
mod producer;
mod session;
mod shutdown;

pub use admin::verify_topic;
pub use config::{ClientSettings, ConnectionProfile, Credentials, SecurityMode};
pub use consumer::ConsumerSession;
pub use error::{classify_kafka, fault_scope_for, ClientError, FaultScope, Result};
pub use producer::{ProduceReport, ProducerSession};
pub use session::{DeliveryBudget, SessionPhase};
pub use shutdown::{ShutdownCoordinator, ShutdownHandle};

/// Re-export the StreamRecord trait for convenience
pub use kafka_records::StreamRecord;
