//! Error types for the indexer pipeline.

use thiserror::Error;

use crate::lifecycle::JobState;
use typesense_indexer_repository::SearchError;

/// Errors raised while reading item rows from the relational store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The database could not be reached or the query failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A row could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl ExtractError {
    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }
}

impl From<sqlx::Error> for ExtractError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::DecodeError(err.to_string())
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

/// Errors raised by index lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// Creating the collection failed.
    #[error("Failed to create index {index_name}: {source}")]
    CreateFailed {
        index_name: String,
        source: SearchError,
    },

    /// Deleting the collection failed for a reason other than absence.
    #[error("Failed to delete index {index_name}: {source}")]
    DeleteFailed {
        index_name: String,
        source: SearchError,
    },

    /// A reindex job stopped before reaching `Done`.
    #[error("Reindex of {index_name} aborted while {state}: {reason}")]
    JobAborted {
        index_name: String,
        state: JobState,
        reason: String,
    },
}

/// Errors raised when reading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent or blank.
    #[error("Missing required setting: {0}")]
    Missing(String),

    /// A setting is present but cannot be used.
    #[error("Invalid setting {key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    /// Create a missing setting error.
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing(key.into())
    }

    /// Create an invalid setting error.
    pub fn invalid(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: msg.into(),
        }
    }
}

/// Errors raised when submitting a job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The dispatcher cannot accept jobs.
    #[error("Job dispatcher unavailable: {0}")]
    Unavailable(String),

    /// The job arguments are unusable.
    #[error("Invalid job: {0}")]
    InvalidJob(String),
}

/// Errors that can occur in the indexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error from the relational source.
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),

    /// Error from the search engine.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Error from an index lifecycle operation.
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Job dispatch error.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}
