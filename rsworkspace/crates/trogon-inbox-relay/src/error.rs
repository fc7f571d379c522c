use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::error::Error as StdError;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Response body for a body that is not a valid envelope. Kept fixed; the
/// decode detail goes to the log and the returned error only.
pub const DECODE_FAILURE_BODY: &str = "Error unmarshalling request body";

/// Terminal failures of one relay invocation.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("can not connect to nats: {0}")]
    Connect(#[source] BoxError),

    #[error("Error unmarshalling request body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("can not publish to NATS: {0}")]
    Publish(#[source] BoxError),
}

impl RelayError {
    pub fn connect(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::Connect(Box::new(error))
    }

    pub fn publish(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::Publish(Box::new(error))
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Text returned to the caller.
    pub fn body(&self) -> String {
        match self {
            Self::Decode(_) => DECODE_FAILURE_BODY.to_string(),
            Self::Connect(_) | Self::Publish(_) => self.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}
