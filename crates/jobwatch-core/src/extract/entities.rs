//! Named-entity recognition for company and location lists.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::{CoreError, Result};
use crate::models::{InferenceClient, ModelStatus};
use crate::storage::NerConfig;

const PROBE_TEXT: &str = "Acme Corp is hiring in Berlin.";

/// A recognised entity span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Entity label such as `ORG`, `GPE` or `LOC`.
    pub label: String,
    pub text: String,
}

impl Entity {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(&self, text: &str) -> Result<Vec<Entity>>;
}

/// Company (ORG) and location (GPE/LOC) mentions, deduplicated in order.
pub fn companies_and_locations(entities: &[Entity]) -> (Vec<String>, Vec<String>) {
    let mut companies: Vec<String> = Vec::new();
    let mut locations: Vec<String> = Vec::new();

    for entity in entities {
        let text = entity.text.trim();
        if text.is_empty() {
            continue;
        }
        let bucket = match entity.label.as_str() {
            "ORG" => &mut companies,
            "GPE" | "LOC" => &mut locations,
            _ => continue,
        };
        if !bucket.iter().any(|existing| existing == text) {
            bucket.push(text.to_string());
        }
    }

    (companies, locations)
}

#[derive(Debug, Deserialize)]
struct TokenClassification {
    #[serde(default)]
    entity_group: Option<String>,
    #[serde(default)]
    entity: Option<String>,
    word: String,
}

impl TokenClassification {
    fn into_entity(self) -> Option<Entity> {
        let raw = self.entity_group.or(self.entity)?;
        // Ungrouped output uses B-/I- prefixes.
        let label = raw
            .strip_prefix("B-")
            .or_else(|| raw.strip_prefix("I-"))
            .unwrap_or(&raw)
            .to_string();
        Some(Entity::new(label, self.word))
    }
}

/// Token-classification model behind an inference endpoint.
#[derive(Debug, Clone)]
pub struct HfEntityRecognizer {
    client: InferenceClient,
}

impl HfEntityRecognizer {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }

    /// Load the recognizer described by `config`, probing the endpoint once.
    pub async fn load(config: &NerConfig, token: Option<String>) -> ModelStatus<Self> {
        if !config.enabled {
            return ModelStatus::unavailable("disabled in config");
        }

        let recognizer = Self::new(InferenceClient::new(&config.endpoint, &config.model, token));
        match recognizer.recognize(PROBE_TEXT).await {
            Ok(_) => {
                tracing::info!(model = %config.model, "entity recognizer loaded");
                ModelStatus::Ready(recognizer)
            }
            Err(e) => {
                tracing::warn!(
                    model = %config.model,
                    "error loading entity recognizer: {e}. Company and location will be left empty."
                );
                ModelStatus::unavailable(e.to_string())
            }
        }
    }
}

#[async_trait]
impl EntityRecognizer for HfEntityRecognizer {
    fn name(&self) -> &str {
        self.client.model()
    }

    async fn recognize(&self, text: &str) -> Result<Vec<Entity>> {
        let value = self
            .client
            .infer(text, json!({ "aggregation_strategy": "simple" }))
            .await?;

        let spans: Vec<TokenClassification> = serde_json::from_value(value).map_err(|e| {
            CoreError::model(self.client.model(), format!("unexpected NER output: {e}"))
        })?;

        Ok(spans.into_iter().filter_map(TokenClassification::into_entity).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_dedups_entities() {
        let entities = vec![
            Entity::new("ORG", "Acme Corp"),
            Entity::new("PER", "Jane Doe"),
            Entity::new("GPE", "Pune"),
            Entity::new("ORG", "Acme Corp"),
            Entity::new("LOC", "Maharashtra"),
            Entity::new("ORG", "  "),
        ];

        let (companies, locations) = companies_and_locations(&entities);

        assert_eq!(companies, vec!["Acme Corp"]);
        assert_eq!(locations, vec!["Pune", "Maharashtra"]);
    }

    #[test]
    fn token_labels_are_normalised() {
        let grouped = TokenClassification {
            entity_group: Some("ORG".into()),
            entity: None,
            word: "Acme".into(),
        };
        let ungrouped = TokenClassification {
            entity_group: None,
            entity: Some("B-LOC".into()),
            word: "Berlin".into(),
        };
        let unlabeled = TokenClassification {
            entity_group: None,
            entity: None,
            word: "x".into(),
        };

        assert_eq!(grouped.into_entity(), Some(Entity::new("ORG", "Acme")));
        assert_eq!(ungrouped.into_entity(), Some(Entity::new("LOC", "Berlin")));
        assert_eq!(unlabeled.into_entity(), None);
    }

    #[tokio::test]
    async fn disabled_config_is_unavailable() {
        let config = NerConfig {
            enabled: false,
            ..NerConfig::default()
        };
        let status = HfEntityRecognizer::load(&config, None).await;
        assert!(!status.is_ready());
    }
}
