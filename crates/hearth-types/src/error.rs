//! Error types for the hearth pipeline.
//!
//! Provides [`HearthError`] as the top-level error type. It is
//! non-exhaustive to allow future extension without breaking downstream.
//!
//! Most pipeline failures never reach this type: degenerate input falls
//! back to a valid classification, routing failures are reported inside
//! the action result list and backend outages are replaced by an apology.
//! What remains are lookups against unknown conversations and
//! configuration / serialization problems.

use thiserror::Error;

/// Top-level error type for the hearth pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HearthError {
    /// A lookup referenced a conversation that was never created (or
    /// has since been cleared).
    #[error("unknown conversation: {conversation_id}")]
    UnknownConversation {
        /// The conversation identifier that was requested.
        conversation_id: String,
    },

    /// Configuration is malformed or semantically invalid.
    #[error("invalid config: {reason}")]
    ConfigInvalid {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl HearthError {
    /// Shorthand for [`HearthError::UnknownConversation`].
    pub fn unknown_conversation(conversation_id: impl Into<String>) -> Self {
        Self::UnknownConversation {
            conversation_id: conversation_id.into(),
        }
    }

    /// Whether this error is the not-found condition callers usually map
    /// to a 404-style response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownConversation { .. })
    }
}

/// A convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, HearthError>;
