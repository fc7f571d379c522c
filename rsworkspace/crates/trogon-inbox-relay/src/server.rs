use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::relay::{RelayHandler, RelayRequest, RelayResponse};
use axum::{Router, body::Bytes, extract::State, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use trogon_nats::Connector;

const HEALTH_PATH: &str = "/_/health";

/// Builds the HTTP surface: the health route, and the relay on every other
/// path and method.
pub fn router<C: Connector>(handler: RelayHandler<C>) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .fallback(relay::<C>)
        .with_state(Arc::new(handler))
}

/// Starts the relay HTTP server and runs until it fails.
pub async fn serve<C: Connector>(config: RelayConfig, connector: C) -> std::io::Result<()> {
    let handler = RelayHandler::new(connector).with_publish_timeout(config.publish_timeout);
    let app = router(handler);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "Inbox relay listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> &'static str {
    "OK"
}

async fn relay<C: Connector>(
    State(handler): State<Arc<RelayHandler<C>>>,
    body: Bytes,
) -> Result<RelayResponse, RelayError> {
    handler.handle(RelayRequest::new(body)).await
}
