//! Typesense implementation of the search engine client.
//!
//! This module provides a concrete implementation of `SearchEngineClient`
//! over the Typesense HTTP API.

mod client;
mod documents;
mod queries;

pub use client::TypesenseClient;
pub use documents::{encode_import_body, parse_document, parse_import_response};
pub use queries::search_params;
