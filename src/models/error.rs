//! Error types for the Notification Hub

use thiserror::Error;

/// Reasons a resource's advertised links could not be trusted
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LinkValidationError {
    #[error("Failed to fetch link metadata from {url}: {reason}")]
    FetchError { url: String, reason: String },

    #[error("Missing link relation: {0}")]
    MissingRelation(String),

    #[error("Link relation {relation} points at {actual}, expected {expected}")]
    RelationMismatch {
        relation: String,
        expected: String,
        actual: String,
    },
}

impl LinkValidationError {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        LinkValidationError::FetchError {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Hub errors
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Invalid Content-Type: expected {expected}, got {actual:?}")]
    InvalidContentType {
        expected: String,
        actual: Option<String>,
    },

    #[error("Link validation failed: {0}")]
    LinkValidation(#[from] LinkValidationError),

    #[error("Challenge mismatch from {callback}")]
    ChallengeMismatch { callback: String },

    #[error("Verification of {callback} timed out")]
    VerificationTimeout { callback: String },

    #[error("Delivery to {callback} failed: {reason}")]
    DeliveryFailed { callback: String, reason: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HubError {
    pub fn malformed(message: impl Into<String>) -> Self {
        HubError::MalformedRequest(message.into())
    }

    pub fn challenge_mismatch(callback: impl Into<String>) -> Self {
        HubError::ChallengeMismatch {
            callback: callback.into(),
        }
    }

    pub fn delivery_failed(callback: impl Into<String>, reason: impl ToString) -> Self {
        HubError::DeliveryFailed {
            callback: callback.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        HubError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for HubError {
    fn from(err: config::ConfigError) -> Self {
        HubError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        HubError::NetworkError(err.to_string())
    }
}

/// Result type for hub operations
pub type HubResult<T> = Result<T, HubError>;
