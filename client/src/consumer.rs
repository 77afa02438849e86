//! Bounded transaction consumer session with subscribe retry.

use std::time::Duration;

use rdkafka::consumer::{CommitMode, Consumer as RdConsumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use kafka_records::StreamRecord;

use crate::config::ConnectionProfile;
use crate::error::{classify_kafka, ClientError, FaultScope, Result};
use crate::session::{DeliveryBudget, SessionPhase};
use crate::shutdown::ShutdownHandle;

/// Bounded wait for a single poll. An expired poll is not an error.
const POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Bounded wait for the subscribe-time metadata probe.
const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Subscribe retry policy for local brokers, which may still be
/// auto-creating the topic when the consumer starts.
const SUBSCRIBE_ATTEMPTS: u32 = 5;
const SUBSCRIBE_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Consumer session owning one broker connection for one bounded run.
pub struct ConsumerSession {
    inner: StreamConsumer,
    is_local: bool,
    phase: SessionPhase,
    shutdown: ShutdownHandle,
}

impl ConsumerSession {
    /// Creates the consumer from the resolved profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be created.
    pub fn connect(
        profile: &ConnectionProfile,
        group_id: &str,
        shutdown: ShutdownHandle,
    ) -> Result<Self> {
        info!(brokers = %profile.bootstrap_servers(), group_id, "creating consumer");

        let inner: StreamConsumer = profile
            .client_config()
            .set("group.id", group_id)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .set("session.timeout.ms", "6000")
            .set("enable.partition.eof", "false")
            .create()?;

        Ok(Self {
            inner,
            is_local: profile.is_local,
            phase: SessionPhase::Connected,
            shutdown,
        })
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Subscribes to `topic`.
    ///
    /// Against a local broker the topic may not exist yet, so subscription
    /// is retried a bounded number of times with a fixed delay; exhausting
    /// the retries closes the session and fails the run. Against a managed
    /// broker the topic was verified up front, so there is exactly one
    /// attempt and any failure is final.
    ///
    /// # Errors
    ///
    /// Returns `SubscribeExhausted` when a local topic never became
    /// available, or the underlying error for a managed broker.
    pub async fn subscribe(&mut self, topic: &str) -> Result<()> {
        self.phase = SessionPhase::SubscribePending;
        let attempts = if self.is_local { SUBSCRIBE_ATTEMPTS } else { 1 };

        for attempt in 1..=attempts {
            // Cancellation here is a graceful exit, not a failure: the
            // session closes and the subsequent run loop ends immediately.
            if self.shutdown.is_cancelled() {
                info!("cancellation observed before subscription completed");
                self.close();
                return Ok(());
            }

            match self.try_subscribe(topic) {
                Ok(()) => {
                    info!(topic, "listening on topic");
                    return Ok(());
                }
                Err(err) if attempt < attempts => {
                    warn!(
                        %err,
                        "topic '{}' not ready, retrying in {:?} ({} attempts left)",
                        topic,
                        SUBSCRIBE_RETRY_DELAY,
                        attempts - attempt
                    );
                    sleep(SUBSCRIBE_RETRY_DELAY).await;
                }
                Err(err) => {
                    error!(%err, topic, "subscription failed");
                    self.close();
                    if self.is_local {
                        return Err(ClientError::SubscribeExhausted {
                            topic: topic.to_string(),
                            attempts,
                        });
                    }
                    return Err(err);
                }
            }
        }

        unreachable!("subscribe loop always returns on the last attempt")
    }

    /// One subscription attempt. rdkafka's subscribe call succeeds even
    /// for unknown topics, so on local brokers the attempt first probes
    /// broker metadata to catch a topic that has not been created yet.
    fn try_subscribe(&self, topic: &str) -> Result<()> {
        if self.is_local {
            let metadata = self
                .inner
                .client()
                .fetch_metadata(Some(topic), METADATA_TIMEOUT)?;
            let ready = metadata
                .topics()
                .iter()
                .any(|t| t.name() == topic && t.error().is_none());
            if !ready {
                return Err(ClientError::TopicNotReady(topic.to_string()));
            }
        }

        self.inner.subscribe(&[topic])?;
        Ok(())
    }

    /// Consumes until `limit` messages have been received or cancellation
    /// is observed, returning the number of messages processed.
    ///
    /// An empty poll continues the loop without counting. A malformed
    /// payload is logged with the raw bytes retained for diagnostics and
    /// still counts against the budget. If the topic holds fewer messages
    /// than the budget, the loop keeps polling until cancellation; the
    /// budget is a ceiling, not a guarantee. The connection is released
    /// exactly once on the way out.
    ///
    /// # Errors
    ///
    /// Returns an error only for connection-level faults.
    pub async fn run<T: StreamRecord>(&mut self, topic: &str, limit: u32) -> Result<u32> {
        // Closed is terminal; a session cancelled during subscription has
        // already released its connection.
        if self.phase == SessionPhase::Closed {
            return Ok(0);
        }
        self.phase = SessionPhase::Consuming;
        let mut budget = DeliveryBudget::new(limit);

        let outcome = loop {
            if budget.is_exhausted() {
                break Ok(());
            }
            if self.shutdown.is_cancelled() {
                info!("cancellation observed, stopping consumer");
                break Ok(());
            }

            match tokio::time::timeout(POLL_TIMEOUT, self.inner.recv()).await {
                Ok(Ok(message)) => {
                    let seq = budget.record();
                    self.handle_message::<T>(&message, seq, limit);

                    if let Err(err) = self.inner.commit_message(&message, CommitMode::Async) {
                        warn!(%err, "failed to commit offset");
                    }
                }
                Ok(Err(err)) => match classify_kafka(&err) {
                    FaultScope::Session => {
                        error!(%err, "connection fault, aborting consumer run");
                        break Err(ClientError::Connection(err.to_string()));
                    }
                    FaultScope::Message => {
                        warn!(%err, "transient receive error");
                        sleep(POLL_TIMEOUT).await;
                    }
                },
                // Empty poll: nothing arrived within the bound.
                Err(_) => continue,
            }
        };

        let processed = budget.processed();
        self.close();

        match outcome {
            Ok(()) => {
                info!("consumed {} messages from {}", processed, topic);
                Ok(processed)
            }
            Err(err) => Err(err),
        }
    }

    /// Validates one received message against the expected payload type.
    /// Deserialization failures are message-scoped: the raw payload is
    /// kept in the log for diagnostics and the message still counts.
    fn handle_message<T: StreamRecord>(
        &self,
        message: &BorrowedMessage<'_>,
        seq: u32,
        limit: u32,
    ) {
        let Some(payload) = message.payload() else {
            warn!("message {}/{} has an empty payload", seq, limit);
            return;
        };

        match serde_json::from_slice::<T>(payload) {
            Ok(record) => {
                debug!(key = record.key(), "payload validated");
                info!(
                    "consumed message {}/{}: {}",
                    seq,
                    limit,
                    String::from_utf8_lossy(payload)
                );
            }
            Err(err) => {
                error!(%err, "failed to deserialize message {}/{}", seq, limit);
                warn!(
                    raw = %String::from_utf8_lossy(payload),
                    "raw payload retained for diagnostics"
                );
            }
        }
    }

    /// Unsubscribes and releases the connection. Safe to call more than
    /// once; only the first call does anything.
    fn close(&mut self) {
        if self.phase == SessionPhase::Closed {
            return;
        }
        self.phase = SessionPhase::Closed;
        self.inner.unsubscribe();
        info!("consumer closed");
    }
}
