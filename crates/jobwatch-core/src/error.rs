//! Core error types for jobwatch-core.
//!
//! This module defines the error hierarchy used across the library. Each
//! collaborator boundary (mail source, ML models, storage) gets its own
//! variant so callers can tell a network hiccup from a corrupt state file.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for jobwatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors (checkpoint, reminder list, notification log)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Mail source errors (listing or fetching messages)
    #[error("Mail source error for '{source_name}': {message}")]
    MailSource {
        source_name: String,
        message: String,
    },

    /// ML collaborator errors (summarizer, entity recognizer)
    #[error("Model error for '{model}': {message}")]
    Model { model: String, message: String },

    /// OAuth-related errors
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// OS keyring errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors raised by the flat-file stores.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to determine or create the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),

    /// A state file exists but could not be parsed
    #[error("Corrupt state file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Writing a snapshot failed
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// OAuth-specific errors.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// Authorization failed
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Token exchange failed
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Token refresh failed
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Not authenticated
    #[error("Not authenticated with {service}")]
    NotAuthenticated { service: String },

    /// Credentials not configured
    #[error("OAuth credentials not configured for {service}")]
    CredentialsNotConfigured { service: String },
}

impl CoreError {
    pub(crate) fn mail(source_name: &str, message: impl Into<String>) -> Self {
        CoreError::MailSource {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn model(model: &str, message: impl Into<String>) -> Self {
        CoreError::Model {
            model: model.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
