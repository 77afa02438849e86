//! Environment-derived connection configuration.

use std::env;

use rdkafka::ClientConfig;
use tracing::info;

use crate::error::{ClientError, Result};

/// Address substrings that mark a broker as local. `kafka:` covers the
/// containerized broker alias used by the compose setup.
const LOCAL_BROKER_MARKERS: &[&str] = &["localhost", "127.0.0.1", "kafka:"];

/// Security mode selected for a broker connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityMode {
    Plaintext,
    SaslSsl,
}

/// SASL credentials for managed brokers.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Immutable connection profile derived once from the broker address list.
///
/// The same profile value is passed to the producer, consumer, and admin
/// paths so all three agree on the target environment.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    /// Broker addresses in the order they were configured.
    pub brokers: Vec<String>,
    pub is_local: bool,
    pub security: SecurityMode,
    /// Present only for managed brokers. Absence is not validated here;
    /// it surfaces later as a connection failure.
    pub credentials: Option<Credentials>,
    pub client_id: String,
}

impl ConnectionProfile {
    /// Classifies the broker list and derives the security profile.
    ///
    /// Pure and deterministic: the same inputs always yield the same
    /// profile. Local brokers get plaintext access and no credentials;
    /// anything else is treated as a managed broker behind SASL_SSL.
    pub fn resolve(
        bootstrap_servers: &str,
        credentials: Option<Credentials>,
        client_id: impl Into<String>,
    ) -> Self {
        let brokers: Vec<String> = bootstrap_servers
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let is_local = brokers
            .iter()
            .any(|broker| LOCAL_BROKER_MARKERS.iter().any(|m| broker.contains(m)));

        Self {
            is_local,
            security: if is_local {
                SecurityMode::Plaintext
            } else {
                SecurityMode::SaslSsl
            },
            credentials: if is_local { None } else { credentials },
            client_id: client_id.into(),
            brokers,
        }
    }

    /// Comma-separated broker list in rdkafka's `bootstrap.servers` form.
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }

    /// Base rdkafka configuration shared by the producer, consumer, and
    /// admin connections.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", self.bootstrap_servers())
            .set("client.id", &self.client_id);

        match self.security {
            SecurityMode::Plaintext => {
                config.set("security.protocol", "plaintext");
            }
            SecurityMode::SaslSsl => {
                config
                    .set("security.protocol", "sasl_ssl")
                    .set("sasl.mechanisms", "PLAIN");
                if let Some(creds) = &self.credentials {
                    config
                        .set("sasl.username", &creds.username)
                        .set("sasl.password", &creds.password);
                }
            }
        }

        config
    }
}

/// Settings read from the process environment.
///
/// * `CC_BOOTSTRAP_SERVER` — broker address list (required)
/// * `CC_TOPIC` — target topic (required)
/// * `CLIENT_ID` — client identifier (defaulted per binary)
/// * `GROUP_ID` — consumer group (defaulted per binary)
/// * `CC_API_KEY` / `CC_API_SECRET` — SASL credentials for managed brokers
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub topic: String,
    pub group_id: String,
    pub profile: ConnectionProfile,
}

impl ClientSettings {
    /// Reads settings from the environment and resolves the connection
    /// profile once.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the topic or broker list is
    /// missing. Credentials stay optional until a managed broker actually
    /// rejects the connection.
    pub fn from_env(default_client_id: &str, default_group_id: &str) -> Result<Self> {
        let topic = env::var("CC_TOPIC").unwrap_or_default();
        if topic.is_empty() {
            return Err(ClientError::Configuration("CC_TOPIC is not set".into()));
        }

        let bootstrap = env::var("CC_BOOTSTRAP_SERVER").unwrap_or_default();
        if bootstrap.is_empty() {
            return Err(ClientError::Configuration(
                "CC_BOOTSTRAP_SERVER is not set".into(),
            ));
        }

        let client_id =
            env::var("CLIENT_ID").unwrap_or_else(|_| default_client_id.to_string());
        let group_id = env::var("GROUP_ID").unwrap_or_else(|_| default_group_id.to_string());

        let credentials = match (env::var("CC_API_KEY"), env::var("CC_API_SECRET")) {
            (Ok(username), Ok(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        let profile = ConnectionProfile::resolve(&bootstrap, credentials, client_id);
        match profile.security {
            SecurityMode::Plaintext => {
                info!(brokers = %profile.bootstrap_servers(), "local broker detected, using PLAINTEXT");
            }
            SecurityMode::SaslSsl => {
                info!(brokers = %profile.bootstrap_servers(), "managed broker detected, using SASL_SSL");
            }
        }

        Ok(Self {
            topic,
            group_id,
            profile,
        })
    }
}
