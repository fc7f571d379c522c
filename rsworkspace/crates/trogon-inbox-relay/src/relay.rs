use crate::envelope::{Envelope, extract_message};
use crate::error::RelayError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use std::time::Duration;
use tracing::{info, instrument, warn};
use trogon_nats::{CloseClient, Connector, FlushClient, PublishReplyClient};

/// Destination named in the success confirmation. Fixed text, not the runner.
const CONFIRMATION_TARGET: &str = "runner";

#[derive(Debug, Clone, Default)]
pub struct RelayRequest {
    pub body: Bytes,
}

impl RelayRequest {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RelayResponse {
    pub fn published(bytes: usize) -> Self {
        Self {
            status: StatusCode::OK,
            body: Bytes::from(format!(
                "Published {} bytes to: {:?}",
                bytes, CONFIRMATION_TARGET
            )),
        }
    }
}

impl From<&RelayError> for RelayResponse {
    fn from(err: &RelayError) -> Self {
        Self {
            status: err.status(),
            body: Bytes::from(err.body()),
        }
    }
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        (self.status, self.body).into_response()
    }
}

/// What a successful publish put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub subject: String,
    pub reply: String,
    pub bytes: usize,
}

/// Publishes `message` to `{runner}.response` with `inbox_id` as the reply
/// subject, then flushes so a rejected write surfaces here.
#[instrument(
    name = "relay.publish",
    skip_all,
    fields(subject = %envelope.subject(), reply = %envelope.inbox_id, bytes = message.len())
)]
pub async fn publish<N>(
    client: &N,
    envelope: &Envelope,
    message: Bytes,
) -> Result<Published, RelayError>
where
    N: PublishReplyClient + FlushClient,
{
    let subject = envelope.subject();
    let bytes = message.len();
    info!(bytes, inbox = %envelope.inbox_id, "Publishing to inbox");

    client
        .publish_with_reply(subject.clone(), envelope.inbox_id.clone(), message)
        .await
        .map_err(RelayError::publish)?;
    client.flush().await.map_err(RelayError::publish)?;

    Ok(Published {
        subject,
        reply: envelope.inbox_id.clone(),
        bytes,
    })
}

/// Relays one inbound request to NATS over a connection owned by that
/// request alone.
#[derive(Debug, Clone)]
pub struct RelayHandler<C> {
    connector: C,
    publish_timeout: Option<Duration>,
}

impl<C: Connector> RelayHandler<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            publish_timeout: None,
        }
    }

    /// Bounds publish plus flush. `None` waits for the client to resolve.
    pub fn with_publish_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.publish_timeout = timeout;
        self
    }

    #[instrument(name = "relay.handle", skip_all, fields(body_len = request.body.len()))]
    pub async fn handle(&self, request: RelayRequest) -> Result<RelayResponse, RelayError> {
        info!(body = %String::from_utf8_lossy(&request.body), "Received body");
        let message = extract_message(&request.body);

        let client = self.connector.connect().await.map_err(|e| {
            warn!(error = %e, "can not connect to nats");
            RelayError::connect(e)
        })?;

        // Nothing between connect and close may return early.
        let outcome = self.decode_and_publish(&client, &request.body, message).await;
        client.close().await;

        let published = outcome?;
        info!(
            subject = %published.subject,
            reply = %published.reply,
            bytes = published.bytes,
            "Published to NATS"
        );
        Ok(RelayResponse::published(published.bytes))
    }

    async fn decode_and_publish(
        &self,
        client: &C::Client,
        body: &[u8],
        message: Bytes,
    ) -> Result<Published, RelayError> {
        let envelope = Envelope::decode(body).map_err(|e| {
            warn!(error = %e, "Error unmarshalling request body");
            RelayError::Decode(e)
        })?;

        let publishing = publish(client, &envelope, message);
        let result = match self.publish_timeout {
            Some(timeout) => tokio::time::timeout(timeout, publishing)
                .await
                .map_err(RelayError::publish)
                .and_then(|inner| inner),
            None => publishing.await,
        };

        if let Err(e) = &result {
            warn!(error = %e, subject = %envelope.subject(), "Error publishing to nats");
        }
        result
    }
}
