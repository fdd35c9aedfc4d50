//! Mail source contract and message payload types.

pub mod body;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use body::extract_text;

/// Body of a message part. `data` is URL-safe base64.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartBody {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A message payload as returned by the mail API: a MIME part that may
/// carry its own body and/or a list of sub-parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub body: PartBody,
    #[serde(default)]
    pub parts: Option<Vec<MessagePayload>>,
}

impl MessagePayload {
    /// Single-part payload with already-encoded body data.
    pub fn single(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            body: PartBody {
                data: Some(data.into()),
                size: None,
            },
            parts: None,
        }
    }

    /// Multipart payload wrapping `parts`.
    pub fn multipart(parts: Vec<MessagePayload>) -> Self {
        Self {
            mime_type: "multipart/alternative".into(),
            body: PartBody::default(),
            parts: Some(parts),
        }
    }
}

/// Where messages come from.
///
/// `list` returns identifiers of messages received after `since` (epoch
/// seconds), or all messages when there is no checkpoint yet.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Stable identifier used in logs and errors (e.g. `gmail`).
    fn name(&self) -> &str;

    async fn list(&self, since: Option<i64>) -> Result<Vec<String>>;

    async fn get(&self, message_id: &str) -> Result<MessagePayload>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_api_shape() {
        let raw = r#"{
            "mimeType": "multipart/alternative",
            "body": {"size": 0},
            "parts": [
                {"mimeType": "text/plain", "body": {"data": "aGk", "size": 2}}
            ]
        }"#;
        let payload: MessagePayload = serde_json::from_str(raw).unwrap();

        assert_eq!(payload.mime_type, "multipart/alternative");
        assert!(payload.body.data.is_none());
        let parts = payload.parts.unwrap();
        assert_eq!(parts[0].mime_type, "text/plain");
        assert_eq!(parts[0].body.data.as_deref(), Some("aGk"));
    }
}
