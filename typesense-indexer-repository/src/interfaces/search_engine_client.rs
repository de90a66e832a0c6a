//! Search engine client trait definition.
//!
//! This module defines the abstract interface for the remote search engine,
//! seen as a collection-oriented document store.

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::{ImportAction, ImportResult};
use typesense_indexer_shared::{CollectionSchema, Document, SearchRequest, SearchResponse};

/// Abstract interface for search engine operations.
///
/// This trait defines all the operations the indexer needs from the engine.
/// Implementations can be swapped (Typesense, mock, etc.) enabling easy
/// testing.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so that a reindex job, the
/// incremental sync handler and search requests can share one client.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>`. Deciding whether an error is
/// fatal is left to the caller.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Create a collection from a schema.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The collection was created
    /// * `Err(SearchError::Conflict)` - A collection with that name exists
    /// * `Err(SearchError)` - Any other failure
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), SearchError>;

    /// Delete a collection and all its documents.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The collection was deleted
    /// * `Err(SearchError::NotFound)` - No such collection
    /// * `Err(SearchError)` - Any other failure
    async fn delete_collection(&self, name: &str) -> Result<(), SearchError>;

    /// Retrieve a collection's schema.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(schema))` - The collection exists
    /// * `Ok(None)` - No such collection
    /// * `Err(SearchError)` - The engine could not be asked
    async fn retrieve_collection(&self, name: &str)
        -> Result<Option<CollectionSchema>, SearchError>;

    /// Create or replace a single document, keyed by its resource id.
    async fn upsert_document(&self, collection: &str, document: &Document)
        -> Result<(), SearchError>;

    /// Delete every document matching a filter expression.
    ///
    /// # Returns
    ///
    /// * `Ok(n)` - Number of documents deleted (zero if none matched)
    /// * `Err(SearchError)` - If the deletion fails
    async fn delete_documents(&self, collection: &str, filter_by: &str)
        -> Result<u64, SearchError>;

    /// Import documents in bulk.
    ///
    /// # Returns
    ///
    /// * `Ok(results)` - One result per submitted document, in order. Individual
    ///   documents may have failed.
    /// * `Err(SearchError)` - The whole request failed
    async fn import_documents(
        &self,
        collection: &str,
        documents: &[Document],
        action: ImportAction,
    ) -> Result<Vec<ImportResult>, SearchError>;

    /// Execute a search request against a collection.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let response = client.search("items", &request).await?;
    /// println!("Found {} results", response.found);
    /// ```
    async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError>;

    /// Check if the engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the engine is healthy
    /// * `Ok(false)` - If the engine reports itself unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
