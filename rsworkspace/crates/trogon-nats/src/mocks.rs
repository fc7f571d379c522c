//! In-memory doubles for the client traits. Enabled with the `test-support`
//! feature.

use crate::client::{CloseClient, Connector, FlushClient, PublishReplyClient};
use async_nats::subject::ToSubject;
use bytes::Bytes;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct MockError(pub String);

impl std::fmt::Display for MockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MockError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedMessage {
    pub subject: String,
    pub reply: String,
    pub payload: Bytes,
}

/// Records publishes and closes. Clones share state, so a test can keep one
/// handle while the code under test consumes another.
#[derive(Clone, Debug, Default)]
pub struct MockNatsClient {
    published: Arc<Mutex<Vec<PublishedMessage>>>,
    publish_failure: Arc<Mutex<Option<String>>>,
    flushes: Arc<Mutex<usize>>,
    closes: Arc<Mutex<usize>>,
}

impl MockNatsClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next publish returns `MockError(message)` and records nothing.
    pub fn fail_next_publish(&self, message: impl Into<String>) {
        *self.publish_failure.lock().unwrap() = Some(message.into());
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    pub fn flush_count(&self) -> usize {
        *self.flushes.lock().unwrap()
    }

    pub fn close_count(&self) -> usize {
        *self.closes.lock().unwrap()
    }
}

impl PublishReplyClient for MockNatsClient {
    type PublishError = MockError;

    async fn publish_with_reply<S: ToSubject + Send, R: ToSubject + Send>(
        &self,
        subject: S,
        reply: R,
        payload: Bytes,
    ) -> Result<(), MockError> {
        if let Some(message) = self.publish_failure.lock().unwrap().take() {
            return Err(MockError(message));
        }
        self.published.lock().unwrap().push(PublishedMessage {
            subject: subject.to_subject().to_string(),
            reply: reply.to_subject().to_string(),
            payload,
        });
        Ok(())
    }
}

impl FlushClient for MockNatsClient {
    type FlushError = MockError;

    async fn flush(&self) -> Result<(), MockError> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}

impl CloseClient for MockNatsClient {
    async fn close(self) {
        *self.closes.lock().unwrap() += 1;
    }
}

/// Hands out clones of one [`MockNatsClient`] and counts connection attempts.
#[derive(Clone, Debug, Default)]
pub struct MockConnector {
    client: MockNatsClient,
    connects: Arc<Mutex<usize>>,
    connect_failure: Arc<Mutex<Option<String>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self) -> &MockNatsClient {
        &self.client
    }

    /// The next connect returns `MockError(message)`.
    pub fn fail_next_connect(&self, message: impl Into<String>) {
        *self.connect_failure.lock().unwrap() = Some(message.into());
    }

    pub fn connect_count(&self) -> usize {
        *self.connects.lock().unwrap()
    }
}

impl Connector for MockConnector {
    type Client = MockNatsClient;
    type ConnectError = MockError;

    async fn connect(&self) -> Result<MockNatsClient, MockError> {
        *self.connects.lock().unwrap() += 1;
        if let Some(message) = self.connect_failure.lock().unwrap().take() {
            return Err(MockError(message));
        }
        Ok(self.client.clone())
    }
}
