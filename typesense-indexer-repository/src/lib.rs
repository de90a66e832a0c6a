//! # Typesense Indexer Repository
//!
//! This crate provides the trait for talking to the remote search engine
//! as a collection-oriented document store, together with errors, result
//! types and a concrete implementation for Typesense.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod types;
pub mod typesense;

pub use config::TypesenseConfig;
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use types::{ImportAction, ImportResult, ImportSummary};
pub use typesense::TypesenseClient;
