//! # Typesense Indexer Shared
//!
//! Data types shared by the repository and pipeline crates: indexed
//! properties, collection schemas, documents, search requests and hits,
//! and result display templates.

pub mod document;
pub mod format;
pub mod property;
pub mod schema;
pub mod search;

pub use document::Document;
pub use format::{FormatToken, ResultFormat};
pub use property::{indexed_field_names, normalize_field_name, IndexedProperty, PropertyError};
pub use schema::{
    CollectionSchema, FieldType, SchemaBuilder, SchemaField, ALTERNATIVE_TITLE_FIELD,
    RESOURCE_ID_FIELD, TITLE_FIELD,
};
pub use search::{Highlight, InfixMode, SearchHit, SearchRequest, SearchResponse};
