//! Pre-flight topic verification against the broker's metadata endpoint.

use std::time::Duration;

use rdkafka::admin::AdminClient;
use rdkafka::client::DefaultClientContext;
use tracing::{debug, warn};

use crate::config::ConnectionProfile;

/// Bounded wait for the metadata fetch.
const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Checks whether `topic` exists on the broker described by `profile`.
///
/// Never fails: any administrative connectivity problem is reported as
/// `false`, leaving the caller to decide whether a missing topic is fatal
/// (it is for managed brokers, where topics are pre-provisioned; local
/// brokers auto-create topics, so the check short-circuits to `true`
/// without contacting the broker at all). The administrative connection is
/// released before returning, whatever the outcome.
pub async fn verify_topic(profile: &ConnectionProfile, topic: &str) -> bool {
    if profile.is_local || topic.is_empty() {
        debug!(topic, "skipping topic verification for local broker");
        return true;
    }

    let admin: AdminClient<DefaultClientContext> = match profile.client_config().create() {
        Ok(admin) => admin,
        Err(err) => {
            warn!(%err, "failed to create admin client");
            return false;
        }
    };

    let topic = topic.to_string();
    // fetch_metadata blocks, so keep it off the async runtime. The admin
    // client is dropped inside the task, releasing the connection.
    let fetched = tokio::task::spawn_blocking(move || {
        match admin.inner().fetch_metadata(Some(&topic), METADATA_TIMEOUT) {
            Ok(metadata) => {
                let found = metadata
                    .topics()
                    .iter()
                    .any(|t| t.name() == topic && t.error().is_none());
                if !found {
                    warn!(topic = %topic, "topic not found in broker metadata");
                }
                found
            }
            Err(err) => {
                warn!(%err, "metadata fetch failed");
                false
            }
        }
    })
    .await;

    match fetched {
        Ok(found) => found,
        Err(err) => {
            warn!(%err, "metadata fetch task failed");
            false
        }
    }
}
