use trogon_inbox_relay::{RelayConfig, serve};
use trogon_nats::NatsConnector;
use trogon_std::env::SystemEnv;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env(&SystemEnv);
    tracing::info!(
        servers = ?config.nats.servers,
        auth = %config.nats.auth.description(),
        "Starting inbox relay"
    );

    let connector = NatsConnector::new(config.nats.clone());
    if let Err(e) = serve(config, connector).await {
        tracing::error!(error = %e, "Inbox relay exited with error");
        std::process::exit(1);
    }
}
