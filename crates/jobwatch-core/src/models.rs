//! ML collaborators: load status and the HTTP inference client.
//!
//! Models are loaded once at startup. A model that fails to load stays
//! [`ModelStatus::Unavailable`] for the lifetime of the process and callers
//! take their non-ML fallback path.

use reqwest::Client;
use serde_json::{json, Value};

use crate::error::{CoreError, Result};

/// Outcome of loading a model collaborator.
#[derive(Debug)]
pub enum ModelStatus<T> {
    Ready(T),
    Unavailable { reason: String },
}

impl<T> ModelStatus<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        ModelStatus::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelStatus::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            ModelStatus::Ready(model) => Some(model),
            ModelStatus::Unavailable { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ModelStatus<U> {
        match self {
            ModelStatus::Ready(model) => ModelStatus::Ready(f(model)),
            ModelStatus::Unavailable { reason } => ModelStatus::Unavailable { reason },
        }
    }
}

/// Client for Hugging Face style inference endpoints:
/// `POST {endpoint}/{model}` with `{"inputs": ..., "parameters": ...}`.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: Client,
    endpoint: String,
    model: String,
    token: Option<String>,
}

impl InferenceClient {
    pub fn new(endpoint: &str, model: &str, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model)
    }

    /// Run one inference request and return the JSON response.
    pub async fn infer(&self, inputs: &str, parameters: Value) -> Result<Value> {
        let body = json!({
            "inputs": inputs,
            "parameters": parameters,
            "options": { "wait_for_model": true },
        });

        let mut request = self.http.post(self.url()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let value: Value = resp.json().await.map_err(|e| {
            CoreError::model(&self.model, format!("unreadable response ({status}): {e}"))
        })?;

        if let Some(err) = value.get("error") {
            return Err(CoreError::model(&self.model, err.to_string()));
        }
        if !status.is_success() {
            return Err(CoreError::model(&self.model, format!("HTTP {status}")));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_helpers() {
        let ready: ModelStatus<u8> = ModelStatus::Ready(1);
        assert!(ready.is_ready());
        assert_eq!(ready.as_ready(), Some(&1));

        let missing: ModelStatus<u8> = ModelStatus::unavailable("no token");
        assert!(!missing.is_ready());
        assert!(matches!(&missing, ModelStatus::Unavailable { reason } if reason == "no token"));
        assert!(missing.map(|v| v + 1).as_ready().is_none());
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let client = InferenceClient::new("http://localhost:8080/models/", "facebook/bart-large-cnn", None);
        assert_eq!(client.url(), "http://localhost:8080/models/facebook/bart-large-cnn");
    }

    #[test]
    fn empty_token_is_ignored() {
        let client = InferenceClient::new("http://x", "m", Some(String::new()));
        assert!(client.token.is_none());
    }
}
