//! Error types for subscription construction.

use thiserror::Error;

/// Main error type for building subscriptions.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Topic path is empty")]
    EmptyTopic,

    #[error("Invalid topic '{topic}': {reason}")]
    InvalidTopic { topic: String, reason: String },

    #[error("Invalid subscription config: {0}")]
    InvalidConfig(String),
}

impl SubscriptionError {
    pub(crate) fn invalid_topic(topic: &str, reason: impl Into<String>) -> Self {
        SubscriptionError::InvalidTopic {
            topic: topic.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for SubscriptionError {
    fn from(e: serde_json::Error) -> Self {
        SubscriptionError::InvalidConfig(e.to_string())
    }
}

/// Result type for subscription operations.
pub type Result<T> = std::result::Result<T, SubscriptionError>;
