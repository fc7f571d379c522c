use std::time::Duration;

use trogon_nats::{NatsConfig, NatsDefaults};
use trogon_std::env::{ReadEnv, read_parsed};

const DEFAULT_PORT: u16 = 8082;
const DEFAULT_NATS_URL: &str = "tls://connect.ngs.global";
const DEFAULT_NATS_CREDS: &str = "/var/openfaas/secrets/nts-tkn";

/// Configuration for the inbox relay.
///
/// Resolved from environment variables:
/// - `RELAY_PORT`: HTTP listening port (default: 8082)
/// - `RELAY_PUBLISH_TIMEOUT_SECS`: deadline for publish + flush (default: none)
/// - `NATS_URL`: broker endpoint(s) (default: `tls://connect.ngs.global`)
/// - `NATS_CREDS`: credentials bundle (default: `/var/openfaas/secrets/nts-tkn`)
/// - `NATS_REQUIRE_TLS`, `NATS_CONNECT_TIMEOUT_SECS` (see `trogon-nats`)
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub publish_timeout: Option<Duration>,
    pub nats: NatsConfig,
}

impl RelayConfig {
    pub fn from_env<E: ReadEnv>(env: &E) -> Self {
        let defaults = NatsDefaults {
            url: DEFAULT_NATS_URL,
            credentials: Some(DEFAULT_NATS_CREDS),
        };
        Self {
            port: read_parsed(env, "RELAY_PORT").unwrap_or(DEFAULT_PORT),
            publish_timeout: read_parsed(env, "RELAY_PUBLISH_TIMEOUT_SECS")
                .map(Duration::from_secs),
            nats: NatsConfig::from_env(env, &defaults),
        }
    }
}
