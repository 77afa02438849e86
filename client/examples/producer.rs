//! Demo producer: emits a fixed budget of synthetic transactions.
//!
//! To run this example:
//! ```bash
//! cargo run --example producer
//! ```
//!
//! Configuration comes from the environment: `CC_BOOTSTRAP_SERVER` and
//! `CC_TOPIC` are required; `CLIENT_ID`, `CC_API_KEY`, and `CC_API_SECRET`
//! apply to managed brokers. Exits non-zero on a fatal configuration or
//! connection error; a termination signal drains gracefully and exits zero.

use kafka_client::{verify_topic, ClientError, ClientSettings, ProducerSession, ShutdownCoordinator};
use kafka_records::TransactionGenerator;
use tracing::{error, info, Level};

/// Fixed message budget for one run.
const MESSAGE_COUNT: u32 = 10;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    if let Err(err) = run().await {
        error!(%err, "producer run failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("starting transaction producer");

    let settings = ClientSettings::from_env("rust-producer", "rust-producer-group")?;
    let profile = &settings.profile;

    if !verify_topic(profile, &settings.topic).await {
        if !profile.is_local {
            return Err(ClientError::TopicNotFound(settings.topic).into());
        }
        info!(
            "topic '{}' will be auto-created by the local broker",
            settings.topic
        );
    }

    let coordinator = ShutdownCoordinator::new();
    coordinator.listen();

    let mut session = ProducerSession::connect(profile, coordinator.handle())?;
    let mut generator = TransactionGenerator::new();

    info!("producing to topic '{}'", settings.topic);
    let report = session
        .run(&settings.topic, MESSAGE_COUNT, || generator.next_record())
        .await?;

    info!(
        "run complete: {} delivered, {} failed",
        report.delivered, report.failed
    );
    Ok(())
}
