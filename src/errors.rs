//! Relation Data Error Hierarchy
//!
//! Defines the error types surfaced by the relation data protocol,
//! categorized by the layer that produced them.

use config::ConfigError;

use crate::RelationId;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Relation configuration validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Backend access and persistence failures
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Protocol level failures (unknown events, unsupported fields, alias pool)
    #[error(transparent)]
    Relation(#[from] RelationError),

    /// Unrecoverable failures requiring the caller to stop processing
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Serialization failures for persisted relation records
    #[error(transparent)]
    BincodeError(#[from] bincode::Error),

    /// Baseline snapshot could not be encoded
    #[error("Baseline encode failed: {0}")]
    BaselineEncode(#[from] serde_json::Error),

    /// Embedded database errors
    #[error("Embedded database error: {0}")]
    DbError(String),

    /// The runtime does not know this relation instance
    #[error("Relation {relation_id} not found")]
    RelationNotFound { relation_id: RelationId },

    /// Stored bytes are not valid UTF-8
    #[error("Data corruption detected at {location}")]
    DataCorruption { location: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    /// Listener registration for an event that was never declared
    #[error("Event {0} is not declared by this relation")]
    UnknownEvent(String),

    /// Write-side setter for a key outside the adapter schema
    #[error("Field {field} is not part of the {protocol} schema")]
    UnsupportedField {
        protocol: &'static str,
        field: String,
    },

    /// Every alias of the pool is claimed by another relation instance
    #[error("No free alias left for relation {relation_id} of {relation_name}")]
    AliasPoolExhausted {
        relation_name: String,
        relation_id: RelationId,
    },
}

impl From<sled::Error> for StorageError {
    fn from(e: sled::Error) -> Self {
        StorageError::DbError(e.to_string())
    }
}

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        Error::Storage(e.into())
    }
}
