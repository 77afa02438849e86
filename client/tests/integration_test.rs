//! Integration tests for the demo client library.
//!
//! Everything here runs without a broker: profile resolution and fault
//! classification are pure, the wire format is plain JSON, and the
//! session/shutdown paths under test never reach the network.

use kafka_client::{
    fault_scope_for, ClientError, ConnectionProfile, ConsumerSession, Credentials, DeliveryBudget,
    FaultScope, ProducerSession, SecurityMode, SessionPhase, ShutdownCoordinator, StreamRecord,
};
use kafka_records::{
    TransactionGenerator, TransactionRecord, TransactionStatus, TransactionType,
};
use rdkafka::types::RDKafkaErrorCode;

fn test_credentials() -> Option<Credentials> {
    Some(Credentials {
        username: "key".to_string(),
        password: "secret".to_string(),
    })
}

#[test]
fn profile_detects_local_markers() {
    for servers in [
        "localhost:9092",
        "127.0.0.1:9092",
        "kafka:29092",
        "remote.example.com:9092,kafka:29092",
    ] {
        let profile = ConnectionProfile::resolve(servers, test_credentials(), "test-client");
        assert!(profile.is_local, "{servers} should classify as local");
        assert_eq!(profile.security, SecurityMode::Plaintext);
        assert!(
            profile.credentials.is_none(),
            "local profiles must drop credentials"
        );
    }
}

#[test]
fn profile_treats_unknown_hosts_as_managed() {
    let profile = ConnectionProfile::resolve(
        "pkc-12345.us-west-2.aws.confluent.cloud:9092",
        test_credentials(),
        "test-client",
    );
    assert!(!profile.is_local);
    assert_eq!(profile.security, SecurityMode::SaslSsl);
    let creds = profile.credentials.expect("credentials kept for managed brokers");
    assert_eq!(creds.username, "key");
}

#[test]
fn profile_resolution_is_deterministic() {
    let a = ConnectionProfile::resolve("broker-a:9092,broker-b:9092", None, "client");
    let b = ConnectionProfile::resolve("broker-a:9092,broker-b:9092", None, "client");
    assert_eq!(a.brokers, b.brokers);
    assert_eq!(a.is_local, b.is_local);
    assert_eq!(a.security, b.security);
    assert_eq!(a.client_id, b.client_id);
}

#[test]
fn profile_splits_and_trims_broker_list() {
    let profile = ConnectionProfile::resolve("host-a:9092, host-b:9092 ,", None, "client");
    assert_eq!(profile.brokers, vec!["host-a:9092", "host-b:9092"]);
    assert_eq!(profile.bootstrap_servers(), "host-a:9092,host-b:9092");
}

#[tokio::test]
async fn verify_short_circuits_for_local_profiles() {
    // The broker address is unreachable; a true result proves no
    // administrative query was issued.
    let profile = ConnectionProfile::resolve("localhost:19092", None, "test-client");
    assert!(kafka_client::verify_topic(&profile, "transactions").await);
}

#[tokio::test]
async fn verify_short_circuits_for_empty_topic() {
    let profile = ConnectionProfile::resolve("localhost:19092", None, "test-client");
    assert!(kafka_client::verify_topic(&profile, "").await);
}

#[test]
fn budget_saturates_at_limit() {
    let mut budget = DeliveryBudget::new(3);
    assert!(!budget.is_exhausted());

    for expected in 1..=3 {
        assert_eq!(budget.record(), expected);
    }
    assert!(budget.is_exhausted());

    // Further records must not push the count past the limit.
    assert_eq!(budget.record(), 3);
    assert_eq!(budget.processed(), 3);
    assert_eq!(budget.limit(), 3);
}

#[test]
fn zero_budget_is_immediately_exhausted() {
    let budget = DeliveryBudget::new(0);
    assert!(budget.is_exhausted());
    assert_eq!(budget.processed(), 0);
}

#[test]
fn message_faults_do_not_abort_the_run() {
    for err in [
        ClientError::Serialization("bad record".into()),
        ClientError::Deserialization("bad payload".into()),
        ClientError::Delivery("rejected".into()),
    ] {
        assert_eq!(err.scope(), FaultScope::Message);
    }
}

#[test]
fn startup_and_connection_faults_are_fatal() {
    for err in [
        ClientError::Configuration("no topic".into()),
        ClientError::Connection("unreachable".into()),
        ClientError::TopicNotFound("transactions".into()),
        ClientError::SubscribeExhausted {
            topic: "transactions".into(),
            attempts: 5,
        },
        ClientError::Shutdown("flush failed".into()),
    ] {
        assert_eq!(err.scope(), FaultScope::Session);
    }
}

#[test]
fn kafka_codes_classify_by_reachability() {
    for code in [
        RDKafkaErrorCode::AllBrokersDown,
        RDKafkaErrorCode::BrokerTransportFailure,
        RDKafkaErrorCode::Authentication,
    ] {
        assert_eq!(fault_scope_for(code), FaultScope::Session);
    }

    for code in [
        RDKafkaErrorCode::MessageSizeTooLarge,
        RDKafkaErrorCode::InvalidMessage,
        RDKafkaErrorCode::MessageTimedOut,
        RDKafkaErrorCode::QueueFull,
    ] {
        assert_eq!(fault_scope_for(code), FaultScope::Message);
    }
}

#[test]
fn transaction_wire_format_is_pascal_case() {
    let record = TransactionRecord {
        transaction_id: "txn-1".to_string(),
        account_number: "4532015112830366".to_string(),
        amount: 99.95,
        currency: "USD".to_string(),
        timestamp: "2026-08-06T12:00:00Z".to_string(),
        transaction_type: TransactionType::Deposit,
        status: TransactionStatus::Completed,
    };

    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"TransactionId\":\"txn-1\""));
    assert!(json.contains("\"AccountNumber\":\"4532015112830366\""));
    assert!(json.contains("\"Amount\":99.95"));
    assert!(json.contains("\"Currency\":\"USD\""));
    assert!(json.contains("\"Timestamp\":\"2026-08-06T12:00:00Z\""));
    assert!(json.contains("\"TransactionType\":\"deposit\""));
    assert!(json.contains("\"Status\":\"completed\""));
}

#[test]
fn transaction_round_trips_from_other_clients() {
    // Shape emitted by the Go and .NET demo clients.
    let json = r#"{
        "TransactionId": "7f9c24e8b2de4f1a9e1c2d4b5a6f7081",
        "AccountNumber": "4532015112830366",
        "Amount": 2411.57,
        "Currency": "USD",
        "Timestamp": "2026-08-06T12:00:00Z",
        "TransactionType": "transfer",
        "Status": "pending"
    }"#;

    let record: TransactionRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.transaction_type, TransactionType::Transfer);
    assert_eq!(record.status, TransactionStatus::Pending);
    assert_eq!(record.key(), "7f9c24e8b2de4f1a9e1c2d4b5a6f7081");
}

#[test]
fn malformed_payload_is_a_deserialization_error() {
    assert!(serde_json::from_slice::<TransactionRecord>(b"not valid json").is_err());
    assert!(serde_json::from_slice::<TransactionRecord>(b"{}").is_err());
}

#[test]
fn generator_keys_are_unique() {
    let mut generator = TransactionGenerator::new();
    let mut seen = std::collections::HashSet::new();

    for _ in 0..100 {
        let record = generator.next_record();
        assert!(
            seen.insert(record.transaction_id.clone()),
            "duplicate transaction id"
        );
        assert_eq!(record.key(), record.transaction_id);
    }
    assert_eq!(generator.generated(), 100);
}

#[test]
fn generator_amounts_are_rounded_and_non_negative() {
    let mut generator = TransactionGenerator::new();
    for _ in 0..100 {
        let record = generator.next_record();
        assert!(record.amount >= 0.0);
        let cents = record.amount * 100.0;
        assert!((cents - cents.round()).abs() < 1e-6);
    }
}

#[tokio::test]
async fn overlapping_shutdown_requests_run_once() {
    let coordinator = ShutdownCoordinator::new();

    let a = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.request() })
    };
    let b = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.request() })
    };

    let initiated = [a.await.unwrap(), b.await.unwrap()];
    assert_eq!(
        initiated.iter().filter(|&&won| won).count(),
        1,
        "exactly one request may initiate shutdown"
    );
    assert!(coordinator.handle().is_cancelled());
}

#[test]
fn repeated_shutdown_requests_are_no_ops() {
    let coordinator = ShutdownCoordinator::new();
    assert!(coordinator.request());
    assert!(!coordinator.request());
    assert!(!coordinator.request());
}

#[tokio::test]
async fn producer_zero_budget_run_closes_once() {
    let profile = ConnectionProfile::resolve("localhost:19092", None, "test-producer");
    let coordinator = ShutdownCoordinator::new();
    let mut session = ProducerSession::connect(&profile, coordinator.handle()).unwrap();
    let mut generator = TransactionGenerator::new();

    let report = session
        .run("transactions", 0, || generator.next_record())
        .await
        .unwrap();
    assert_eq!(report.delivered, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(session.phase(), SessionPhase::Closed);

    // A second run on a closed session stays closed and produces nothing.
    let report = session
        .run("transactions", 5, || generator.next_record())
        .await
        .unwrap();
    assert_eq!(report.delivered, 0);
    assert_eq!(session.phase(), SessionPhase::Closed);
}

#[tokio::test]
async fn producer_observes_cancellation_before_first_send() {
    let profile = ConnectionProfile::resolve("localhost:19092", None, "test-producer");
    let coordinator = ShutdownCoordinator::new();
    let mut session = ProducerSession::connect(&profile, coordinator.handle()).unwrap();
    let mut generator = TransactionGenerator::new();

    coordinator.request();

    let report = session
        .run("transactions", 5, || generator.next_record())
        .await
        .unwrap();
    assert_eq!(report.delivered, 0);
    assert_eq!(generator.generated(), 0, "no record generated after cancellation");
    assert_eq!(session.phase(), SessionPhase::Closed);
}

#[tokio::test]
async fn consumer_observes_cancellation_before_first_poll() {
    let profile = ConnectionProfile::resolve("localhost:19092", None, "test-consumer");
    let coordinator = ShutdownCoordinator::new();
    let mut session =
        ConsumerSession::connect(&profile, "test-group", coordinator.handle()).unwrap();

    coordinator.request();

    let consumed = session.run::<TransactionRecord>("transactions", 5).await.unwrap();
    assert_eq!(consumed, 0);
    assert_eq!(session.phase(), SessionPhase::Closed);
}
