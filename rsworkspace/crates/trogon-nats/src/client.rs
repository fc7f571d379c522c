use async_nats::Client as NatsAsyncClient;
use async_nats::client::{PublishError, PublishErrorKind};
use async_nats::subject::ToSubject;
use bytes::Bytes;
use std::error::Error;
use std::future::Future;
use tracing::warn;

/// Publish carrying a reply subject, the sending half of a request-reply
/// exchange. The responder answers on `reply` instead of on a fresh inbox.
pub trait PublishReplyClient: Send + Sync + 'static {
    type PublishError: Error + Send + Sync + 'static;

    fn publish_with_reply<S: ToSubject + Send, R: ToSubject + Send>(
        &self,
        subject: S,
        reply: R,
        payload: Bytes,
    ) -> impl Future<Output = Result<(), Self::PublishError>> + Send;
}

pub trait FlushClient: Send + Sync + 'static {
    type FlushError: Error + Send + Sync + 'static;

    fn flush(&self) -> impl Future<Output = Result<(), Self::FlushError>> + Send;
}

/// Releases a connection. Consumes the client so it cannot be used afterwards.
pub trait CloseClient: Send + Sync + 'static {
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Opens one dedicated connection per call.
pub trait Connector: Send + Sync + 'static {
    type Client: PublishReplyClient + FlushClient + CloseClient;
    type ConnectError: Error + Send + Sync + 'static;

    fn connect(&self) -> impl Future<Output = Result<Self::Client, Self::ConnectError>> + Send;
}

impl PublishReplyClient for NatsAsyncClient {
    type PublishError = PublishError;

    /// Checks the server's `max_payload` first, as `Client::publish` does and
    /// `Client::publish_with_reply` does not.
    async fn publish_with_reply<S: ToSubject + Send, R: ToSubject + Send>(
        &self,
        subject: S,
        reply: R,
        payload: Bytes,
    ) -> Result<(), Self::PublishError> {
        let max_payload = self.server_info().max_payload;
        if max_payload > 0 && payload.len() > max_payload {
            warn!(
                max_payload,
                payload_len = payload.len(),
                "Payload exceeds server max_payload"
            );
            return Err(PublishError::from(PublishErrorKind::MaxPayloadExceeded));
        }
        NatsAsyncClient::publish_with_reply(self, subject, reply, payload).await
    }
}

impl FlushClient for NatsAsyncClient {
    type FlushError = async_nats::client::FlushError;

    async fn flush(&self) -> Result<(), Self::FlushError> {
        NatsAsyncClient::flush(self).await
    }
}

impl CloseClient for NatsAsyncClient {
    async fn close(self) {
        if let Err(e) = NatsAsyncClient::flush(&self).await {
            warn!(error = %e, "Failed to flush NATS connection before close");
        }
        // The connection task shuts down once the last client handle is gone.
        drop(self);
    }
}
