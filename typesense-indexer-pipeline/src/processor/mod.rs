//! Processor module for the indexer pipeline.
//!
//! Transforms flattened property/value rows into search documents.

mod document_mapper;

pub use document_mapper::{DocumentMapper, PropertyValue};
