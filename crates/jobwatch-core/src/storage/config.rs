//! TOML-based application configuration.
//!
//! Stores:
//! - Poll loop cadence
//! - Classifier keywords
//! - Summarizer and entity-recognizer endpoints
//! - Notification popup settings
//! - Gmail account selection
//!
//! Configuration is stored at `~/.config/jobwatch/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{atomic_write, data_dir, CONFIG_FILE};
use crate::error::{ConfigError, Result};

/// Poll loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
    /// Run both tasks once right after start instead of waiting one interval.
    #[serde(default)]
    pub run_on_start: bool,
}

/// Keyword classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

/// Summarization model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_inference_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_summarizer_model")]
    pub model: String,
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default = "default_min_length")]
    pub min_length: u32,
    /// Characters kept by the truncation fallback.
    #[serde(default = "default_fallback_chars")]
    pub fallback_chars: usize,
}

/// Named-entity recognition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_inference_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_ner_model")]
    pub model: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u32,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

/// Gmail mail source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_gmail_api_base")]
    pub api_base: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/jobwatch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub ner: NerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub gmail: GmailConfig,
}

// Default functions
fn default_interval_minutes() -> u64 {
    10
}
fn default_tick_seconds() -> u64 {
    1
}
fn default_keywords() -> Vec<String> {
    crate::classify::DEFAULT_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}
fn default_true() -> bool {
    true
}
fn default_inference_endpoint() -> String {
    "https://api-inference.huggingface.co/models".into()
}
fn default_summarizer_model() -> String {
    "facebook/bart-large-cnn".into()
}
fn default_ner_model() -> String {
    "dslim/bert-base-NER".into()
}
fn default_max_length() -> u32 {
    150
}
fn default_min_length() -> u32 {
    50
}
fn default_fallback_chars() -> usize {
    200
}
fn default_app_name() -> String {
    "Job Email Filter".into()
}
fn default_timeout_seconds() -> u32 {
    10
}
fn default_max_message_length() -> usize {
    256
}
fn default_user_id() -> String {
    "me".into()
}
fn default_gmail_api_base() -> String {
    "https://gmail.googleapis.com/gmail/v1".into()
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            tick_seconds: default_tick_seconds(),
            run_on_start: false,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_inference_endpoint(),
            model: default_summarizer_model(),
            max_length: default_max_length(),
            min_length: default_min_length(),
            fallback_chars: default_fallback_chars(),
        }
    }
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_inference_endpoint(),
            model: default_ner_model(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_name: default_app_name(),
            timeout_seconds: default_timeout_seconds(),
            max_message_length: default_max_message_length(),
        }
    }
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            api_base: default_gmail_api_base(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value.parse::<u64>().map_err(|e| invalid(e.to_string()))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Array(_) => {
                        // Accept either a JSON array or a comma-separated list.
                        match serde_json::from_str::<serde_json::Value>(value) {
                            Ok(v @ serde_json::Value::Array(_)) => v,
                            _ => serde_json::Value::Array(
                                value
                                    .split(',')
                                    .map(str::trim)
                                    .filter(|s| !s.is_empty())
                                    .map(|s| serde_json::Value::String(s.to_string()))
                                    .collect(),
                            ),
                        }
                    }
                    serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config file location.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join(CONFIG_FILE))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        atomic_write(path, content.as_bytes())?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Returns error if key is unknown.
    ///
    /// Callers persist with [`Config::save`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("falling back to default config: {e}");
                Self::default()
            }
        }
    }
}
