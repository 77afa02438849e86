//! Demo consumer: reads a fixed budget of transactions and validates each
//! payload against the shared JSON schema.
//!
//! To run this example:
//! ```bash
//! cargo run --example consumer
//! ```
//!
//! Configuration comes from the environment: `CC_BOOTSTRAP_SERVER` and
//! `CC_TOPIC` are required; `GROUP_ID`, `CLIENT_ID`, `CC_API_KEY`, and
//! `CC_API_SECRET` are optional. Run the producer example first (or in
//! another terminal) to generate messages. Exits non-zero on a fatal
//! configuration or connection error; a termination signal drains
//! gracefully and exits zero.

use kafka_client::{verify_topic, ClientError, ClientSettings, ConsumerSession, ShutdownCoordinator};
use kafka_records::TransactionRecord;
use tracing::{error, info, Level};

/// Fixed message budget for one run.
const MESSAGE_LIMIT: u32 = 10;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    if let Err(err) = run().await {
        error!(%err, "consumer run failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("starting transaction consumer");

    let settings = ClientSettings::from_env("rust-consumer", "rust-consumer-group")?;
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

    let mut session = ConsumerSession::connect(profile, &settings.group_id, coordinator.handle())?;
    session.subscribe(&settings.topic).await?;

    let consumed = session
        .run::<TransactionRecord>(&settings.topic, MESSAGE_LIMIT)
        .await?;

    info!("run complete: {} messages consumed", consumed);
    Ok(())
}
