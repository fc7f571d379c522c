use std::path::PathBuf;
use std::time::Duration;
use trogon_std::env::{ReadEnv, read_parsed};

const ENV_NATS_URL: &str = "NATS_URL";
const ENV_NATS_CREDS: &str = "NATS_CREDS";
const ENV_NATS_REQUIRE_TLS: &str = "NATS_REQUIRE_TLS";
const ENV_NATS_CONNECT_TIMEOUT_SECS: &str = "NATS_CONNECT_TIMEOUT_SECS";

const TLS_SCHEME: &str = "tls://";

/// NATS authentication method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NatsAuth {
    /// Credentials bundle (JWT + NKey seed) read from disk at connect time.
    Credentials(PathBuf),
    None,
}

impl NatsAuth {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Credentials(_) => "credentials file",
            Self::None => "none",
        }
    }
}

/// Values used when the corresponding `NATS_*` variable is unset.
#[derive(Debug, Clone, Copy)]
pub struct NatsDefaults<'a> {
    pub url: &'a str,
    pub credentials: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct NatsConfig {
    pub servers: Vec<String>,
    pub auth: NatsAuth,
    pub require_tls: bool,
    /// `None` keeps the client library's own connect deadline.
    pub connect_timeout: Option<Duration>,
}

impl NatsConfig {
    pub fn new(servers: Vec<String>, auth: NatsAuth) -> Self {
        let require_tls = all_tls(&servers);
        Self {
            servers,
            auth,
            require_tls,
            connect_timeout: None,
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(vec![url.into()], NatsAuth::None)
    }

    /// Build config from environment variables.
    ///
    /// - `NATS_URL`: comma-separated server list (default: `defaults.url`)
    /// - `NATS_CREDS`: credentials file path (default: `defaults.credentials`);
    ///   an empty value disables credential auth
    /// - `NATS_REQUIRE_TLS`: `true`/`false` (default: `true` when every server uses `tls://`)
    /// - `NATS_CONNECT_TIMEOUT_SECS`: connect deadline in seconds (default: client default)
    pub fn from_env<E: ReadEnv>(env: &E, defaults: &NatsDefaults<'_>) -> Self {
        let servers = servers_from_env(env, defaults.url);
        let require_tls =
            require_tls_from_env(env).unwrap_or_else(|| all_tls(&servers));
        Self {
            auth: auth_from_env(env, defaults.credentials),
            require_tls,
            connect_timeout: read_parsed(env, ENV_NATS_CONNECT_TIMEOUT_SECS)
                .map(Duration::from_secs),
            servers,
        }
    }
}

fn all_tls(servers: &[String]) -> bool {
    !servers.is_empty() && servers.iter().all(|s| s.starts_with(TLS_SCHEME))
}

fn servers_from_env<E: ReadEnv>(env: &E, default_url: &str) -> Vec<String> {
    let raw = env
        .var(ENV_NATS_URL)
        .unwrap_or_else(|_| default_url.to_string());
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn auth_from_env<E: ReadEnv>(env: &E, default_creds: Option<&str>) -> NatsAuth {
    let creds = env
        .var(ENV_NATS_CREDS)
        .ok()
        .or_else(|| default_creds.map(str::to_string));
    match creds {
        Some(path) if !path.trim().is_empty() => NatsAuth::Credentials(PathBuf::from(path.trim())),
        _ => NatsAuth::None,
    }
}

fn require_tls_from_env<E: ReadEnv>(env: &E) -> Option<bool> {
    let raw = env.var(ENV_NATS_REQUIRE_TLS).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
