use bytes::Bytes;
use serde::{Deserialize, Deserializer};

/// Payload published when the inbound body is empty.
pub const DEFAULT_MESSAGE: &str = "default message";

const RESPONSE_SUBJECT_SUFFIX: &str = "response";

/// Routing fields carried in the inbound JSON body.
///
/// Absent or `null` fields decode to empty values, as does a body of `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Envelope {
    /// Reply subject the waiting requester listens on.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub inbox_id: String,
    /// Never inspected; accepted in any shape.
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub runner: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Envelope {
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(serde_json::from_slice::<Option<Self>>(body)?.unwrap_or_default())
    }

    /// `{runner}.response`
    pub fn subject(&self) -> String {
        format!("{}.{}", self.runner, RESPONSE_SUBJECT_SUFFIX)
    }
}

/// The bytes to publish: the body without surrounding whitespace, or
/// [`DEFAULT_MESSAGE`] when the body is empty.
///
/// A body made only of whitespace is not empty and yields an empty payload.
pub fn extract_message(body: &[u8]) -> Bytes {
    if body.is_empty() {
        return Bytes::from_static(DEFAULT_MESSAGE.as_bytes());
    }
    let trimmed = match std::str::from_utf8(body) {
        Ok(text) => text.trim().as_bytes(),
        Err(_) => body.trim_ascii(),
    };
    Bytes::copy_from_slice(trimmed)
}
