//! Error types for the search engine repository.

mod search_error;

pub use search_error::SearchError;
