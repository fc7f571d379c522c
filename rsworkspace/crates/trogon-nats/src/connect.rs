use crate::auth::{NatsAuth, NatsConfig};
use crate::client::Connector;
use async_nats::{Client, ConnectOptions, Event};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub enum ConnectError {
    InvalidCredentials {
        path: PathBuf,
        error: std::io::Error,
    },
    ConnectionFailed {
        servers: Vec<String>,
        error: async_nats::ConnectError,
    },
}

impl std::fmt::Display for ConnectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials { path, error } => {
                write!(
                    f,
                    "Failed to load credentials file {}: {}",
                    path.display(),
                    error
                )
            }
            Self::ConnectionFailed { servers, error } => {
                write!(
                    f,
                    "Failed to connect to NATS servers {:?}: {}",
                    servers, error
                )
            }
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidCredentials { error, .. } => Some(error),
            Self::ConnectionFailed { error, .. } => Some(error),
        }
    }
}

async fn handle_event(event: Event) {
    match event {
        Event::Connected => debug!("NATS connected"),
        Event::Disconnected => warn!("NATS disconnected"),
        Event::ServerError(err) => warn!(error = %err, "NATS server error"),
        Event::ClientError(err) => warn!(error = %err, "NATS client error"),
        Event::SlowConsumer(sid) => warn!(sid, "NATS slow consumer detected"),
        Event::LameDuckMode => warn!("NATS server entering lame duck mode"),
        Event::Closed => debug!("NATS connection closed"),
        Event::Draining => debug!("NATS connection draining"),
    }
}

async fn base_options(auth: &NatsAuth) -> Result<ConnectOptions, ConnectError> {
    match auth {
        NatsAuth::Credentials(path) => {
            debug!(path = %path.display(), "Using credentials file");
            ConnectOptions::with_credentials_file(path.clone())
                .await
                .map_err(|error| {
                    warn!(error = %error, path = %path.display(), "Failed to load credentials file");
                    ConnectError::InvalidCredentials {
                        path: path.clone(),
                        error,
                    }
                })
        }
        NatsAuth::None => Ok(ConnectOptions::new()),
    }
}

/// Open a single NATS connection.
///
/// The initial connect is attempted once: a failure is returned to the caller
/// instead of being retried in the background.
#[instrument(name = "nats.connect", skip(config), fields(servers = ?config.servers, auth = %config.auth.description()))]
pub async fn connect(config: &NatsConfig) -> Result<Client, ConnectError> {
    let mut opts = base_options(&config.auth)
        .await?
        .require_tls(config.require_tls)
        .event_callback(|event| async move { handle_event(event).await });
    if let Some(timeout) = config.connect_timeout {
        opts = opts.connection_timeout(timeout);
    }

    match opts.connect(&config.servers).await {
        Ok(client) => {
            info!(
                servers = ?config.servers,
                tls = config.require_tls,
                "Connected to NATS"
            );
            Ok(client)
        }
        Err(e) => {
            warn!(
                error = %e,
                servers = ?config.servers,
                auth = %config.auth.description(),
                "Failed to connect to NATS"
            );
            Err(ConnectError::ConnectionFailed {
                servers: config.servers.clone(),
                error: e,
            })
        }
    }
}

/// [`Connector`] that dials a fresh connection from a fixed [`NatsConfig`].
#[derive(Debug, Clone)]
pub struct NatsConnector {
    config: Arc<NatsConfig>,
}

impl NatsConnector {
    pub fn new(config: NatsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Connector for NatsConnector {
    type Client = Client;
    type ConnectError = ConnectError;

    async fn connect(&self) -> Result<Client, ConnectError> {
        connect(&self.config).await
    }
}
