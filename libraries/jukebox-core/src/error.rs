/// Core error types for Jukebox
use thiserror::Error;

use crate::types::QueueId;

/// Result type alias using `JukeboxError`
pub type Result<T> = std::result::Result<T, JukeboxError>;

/// Boxed underlying cause carried by write failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for Jukebox
#[derive(Error, Debug)]
pub enum JukeboxError {
    /// Requested entity is absent
    #[error("{entity} not found: {id}")]
    RecordNotFound { entity: String, id: String },

    /// A write failed
    #[error("{entity} could not be saved: {source}")]
    RecordNotSaved {
        entity: String,
        #[source]
        source: BoxError,
    },

    /// A delete failed
    #[error("{entity} could not be deleted: {source}")]
    RecordDeleteFailed {
        entity: String,
        #[source]
        source: BoxError,
    },

    /// No track queued and no replenishment candidate exists
    #[error("Queue {0} is empty")]
    QueueEmpty(QueueId),

    /// Metadata source failure (HTTP error, timeout, bad payload)
    #[error("Source error ({backend}): {message}")]
    Source { backend: String, message: String },

    /// Unknown or unregistered backend
    #[error("Invalid backend: {0}")]
    InvalidBackend(String),

    /// Third-party account must be linked first
    #[error("Third-party authentication required: {0}")]
    ThirdPartyAuthRequired(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Database errors on read paths
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl JukeboxError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::RecordNotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a write failure, keeping the cause
    pub fn not_saved(entity: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::RecordNotSaved {
            entity: entity.into(),
            source: source.into(),
        }
    }

    /// Create a delete failure, keeping the cause
    pub fn delete_failed(entity: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::RecordDeleteFailed {
            entity: entity.into(),
            source: source.into(),
        }
    }

    /// Create a metadata source error
    pub fn source(backend: impl ToString, message: impl Into<String>) -> Self {
        Self::Source {
            backend: backend.to_string(),
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error reports a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for JukeboxError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn not_saved_keeps_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = JukeboxError::not_saved("Track", cause);

        assert_eq!(err.to_string(), "Track could not be saved: disk full");
        assert_eq!(err.source().unwrap().to_string(), "disk full");
    }

    #[test]
    fn not_found_formats_entity_and_id() {
        let err = JukeboxError::not_found("Queue", 42);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Queue not found: 42");
    }
}
