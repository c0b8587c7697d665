//! Centralized error types for docuwire.

use thiserror::Error;

/// All errors produced by the docuwire library.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// Reading an attachment's content stream (or writing the JSON envelope)
    /// failed while marshaling. Identifies the failing stream.
    #[error("failed to serialize attachment content from {stream}: {source}")]
    Serialization {
        stream: String,
        source: std::io::Error,
    },

    /// The JSON input was malformed or contradictory (bad base64, missing
    /// required field, conflicting stub/follows/data flags).
    #[error("invalid attachment field '{field}': {reason}")]
    Deserialization { field: &'static str, reason: String },

    /// The backend source failed while fetching the next attachment record.
    /// Any backend-supplied status classification is preserved unchanged.
    #[error("attachment retrieval failed: {source}")]
    Retrieval {
        status: Option<u16>,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The input was not valid JSON at all.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, AttachmentError>`.
pub type Result<T> = std::result::Result<T, AttachmentError>;

impl AttachmentError {
    /// Create a `Serialization` variant from a stream description and an
    /// `io::Error`.
    pub fn serialization(stream: impl Into<String>, source: std::io::Error) -> Self {
        Self::Serialization {
            stream: stream.into(),
            source,
        }
    }

    /// Create a `Deserialization` variant naming the offending field.
    pub fn deserialization(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Deserialization {
            field,
            reason: reason.into(),
        }
    }

    /// The backend-supplied status classification, if this is a retrieval
    /// failure that carried one (e.g. an upstream HTTP status).
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Retrieval { status, .. } => *status,
            _ => None,
        }
    }
}
