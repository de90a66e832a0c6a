//! # Typesense Indexer
//!
//! Entry point and wiring for the Typesense item indexer.
//!
//! This crate reads configuration from the environment, connects the
//! engine client and the item database, and exposes the index jobs and the
//! search endpoint to the command line.

pub mod config;
pub mod logging;

pub use config::Dependencies;

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] typesense_indexer_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] typesense_indexer_repository::SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<typesense_indexer_pipeline::ConfigError> for IndexingError {
    fn from(err: typesense_indexer_pipeline::ConfigError) -> Self {
        Self::PipelineError(err.into())
    }
}

impl From<typesense_indexer_pipeline::LifecycleError> for IndexingError {
    fn from(err: typesense_indexer_pipeline::LifecycleError) -> Self {
        Self::PipelineError(err.into())
    }
}

impl From<typesense_indexer_pipeline::ExtractError> for IndexingError {
    fn from(err: typesense_indexer_pipeline::ExtractError) -> Self {
        Self::PipelineError(err.into())
    }
}
