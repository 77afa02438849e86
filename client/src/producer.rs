//! Bounded transaction producer session.

use std::time::Duration;

use rdkafka::producer::{FutureProducer, FutureRecord, Producer as RdProducer};
use tracing::{debug, error, info, warn};

use kafka_records::StreamRecord;

use crate::config::ConnectionProfile;
use crate::error::{classify_kafka, ClientError, FaultScope, Result};
use crate::session::{DeliveryBudget, SessionPhase};
use crate::shutdown::ShutdownHandle;

/// Per-message delivery timeout.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounded wait for the final flush on close.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a completed producer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProduceReport {
    /// Records acknowledged by the broker.
    pub delivered: u32,
    /// Records that failed delivery and were skipped.
    pub failed: u32,
}

/// Producer session owning one broker connection for one bounded run.
pub struct ProducerSession {
    inner: FutureProducer,
    phase: SessionPhase,
    shutdown: ShutdownHandle,
}

impl ProducerSession {
    /// Creates the producer from the resolved profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be created.
    pub fn connect(profile: &ConnectionProfile, shutdown: ShutdownHandle) -> Result<Self> {
        info!(brokers = %profile.bootstrap_servers(), "creating producer");

        let inner: FutureProducer = profile
            .client_config()
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self {
            inner,
            phase: SessionPhase::Connected,
            shutdown,
        })
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Produces up to `count` records drawn from `next_record`, one
    /// submission per iteration with a fresh key each time.
    ///
    /// A message-scoped fault (serialization failure, broker reject) is
    /// logged and skipped without touching the rest of the budget; only a
    /// connection-level fault halts the run early. The connection is
    /// flushed and released exactly once on the way out, even after an
    /// early halt or cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error on a connection-level fault or when the final
    /// flush fails.
    pub async fn run<T, F>(
        &mut self,
        topic: &str,
        count: u32,
        mut next_record: F,
    ) -> Result<ProduceReport>
    where
        T: StreamRecord,
        F: FnMut() -> T,
    {
        // Closed is terminal.
        if self.phase == SessionPhase::Closed {
            return Ok(ProduceReport::default());
        }
        self.phase = SessionPhase::Producing;
        let mut budget = DeliveryBudget::new(count);
        let mut report = ProduceReport::default();

        let outcome = loop {
            if budget.is_exhausted() {
                break Ok(());
            }
            if self.shutdown.is_cancelled() {
                info!("cancellation observed, stopping producer");
                break Ok(());
            }

            let record = next_record();
            let seq = budget.record();

            match self.send_one(topic, &record).await {
                Ok(()) => {
                    report.delivered += 1;
                    info!("produced message {}/{}", seq, count);
                }
                Err(err) if err.scope() == FaultScope::Message => {
                    report.failed += 1;
                    warn!(%err, "message {}/{} failed delivery, continuing", seq, count);
                }
                Err(err) => {
                    error!(%err, "connection fault, aborting producer run");
                    break Err(err);
                }
            }
        };

        let closed = self.close();
        match outcome {
            Ok(()) => {
                closed?;
                info!(
                    "produced {} messages to {} ({} failed)",
                    report.delivered, topic, report.failed
                );
                Ok(report)
            }
            Err(err) => {
                if let Err(close_err) = closed {
                    warn!(%close_err, "close failed after connection fault");
                }
                Err(err)
            }
        }
    }

    /// Serializes and submits a single record, keyed by the record's key.
    async fn send_one<T: StreamRecord>(&self, topic: &str, record: &T) -> Result<()> {
        let payload = serde_json::to_vec(record)
            .map_err(|err| ClientError::Serialization(err.to_string()))?;
        let key = record.key();

        debug!(topic, key, bytes = payload.len(), "sending record");

        let future_record = FutureRecord::to(topic).payload(&payload).key(key);
        match self.inner.send(future_record, DELIVERY_TIMEOUT).await {
            Ok((partition, offset)) => {
                debug!(partition, offset, "record delivered");
                Ok(())
            }
            Err((err, _msg)) => match classify_kafka(&err) {
                FaultScope::Message => Err(ClientError::Delivery(err.to_string())),
                FaultScope::Session => Err(ClientError::Connection(err.to_string())),
            },
        }
    }

    /// Flushes pending messages and releases the connection. Safe to call
    /// more than once; only the first call does anything.
    fn close(&mut self) -> Result<()> {
        if self.phase == SessionPhase::Closed {
            return Ok(());
        }
        self.phase = SessionPhase::Closed;

        RdProducer::flush(&self.inner, FLUSH_TIMEOUT)
            .map_err(|err| ClientError::Shutdown(err.to_string()))?;
        info!("producer closed");
        Ok(())
    }
}
