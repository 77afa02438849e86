//! Error types for the demo clients.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// How a delivery loop should react to a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultScope {
    /// Confined to a single message: log it and keep going.
    Message,
    /// The connection or the run itself is unusable: tear the session down.
    Session,
}

/// Errors that can occur while running a demo client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The broker (or its administrative endpoint) could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The target topic does not exist on a managed broker.
    #[error("topic '{0}' not found")]
    TopicNotFound(String),

    /// A local broker has not created the topic yet; retried by the
    /// consumer's bounded subscribe loop.
    #[error("topic '{0}' is not ready yet")]
    TopicNotReady(String),

    /// Subscription retries were exhausted before the topic became available.
    #[error("topic '{topic}' still unavailable after {attempts} subscribe attempts")]
    SubscribeExhausted { topic: String, attempts: u32 },

    /// A record could not be serialized to JSON.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A payload could not be deserialized from JSON.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// The broker rejected a single message.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Error from the underlying rdkafka client.
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// Error raised while releasing a connection.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

impl ClientError {
    /// Classifies this fault for the delivery loop: per-message faults are
    /// logged and skipped, session faults abort the run.
    pub fn scope(&self) -> FaultScope {
        match self {
            Self::Serialization(_) | Self::Deserialization(_) | Self::Delivery(_) => {
                FaultScope::Message
            }
            Self::Kafka(err) => classify_kafka(err),
            _ => FaultScope::Session,
        }
    }
}

/// Classifies an rdkafka error by its underlying error code.
pub fn classify_kafka(err: &rdkafka::error::KafkaError) -> FaultScope {
    match err.rdkafka_error_code() {
        Some(code) => fault_scope_for(code),
        None => FaultScope::Session,
    }
}

/// Fault scope for a raw librdkafka error code. Everything that does not
/// indicate the broker is unreachable stays local to one message.
pub fn fault_scope_for(code: rdkafka::types::RDKafkaErrorCode) -> FaultScope {
    use rdkafka::types::RDKafkaErrorCode;

    match code {
        RDKafkaErrorCode::AllBrokersDown
        | RDKafkaErrorCode::BrokerTransportFailure
        | RDKafkaErrorCode::Authentication => FaultScope::Session,
        _ => FaultScope::Message,
    }
}
