//! Shared fakes for the scenario tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use typesense_indexer_pipeline::{ExtractError, RawItemRow, RowSource};
use typesense_indexer_repository::{ImportAction, ImportResult, SearchEngineClient, SearchError};
use typesense_indexer_shared::{CollectionSchema, Document, SearchRequest, SearchResponse};

/// Search engine fake recording every request it receives.
#[derive(Default)]
pub struct RecordingEngine {
    pub collections: Mutex<Vec<CollectionSchema>>,
    pub imports: Mutex<Vec<Vec<Document>>>,
    pub upserts: Mutex<Vec<Document>>,
    pub deletes: Mutex<Vec<String>>,
    pub searches: Mutex<Vec<SearchRequest>>,
    pub search_response: Option<SearchResponse>,
    /// Every n-th imported document is rejected (0 disables).
    pub reject_every: usize,
    pub import_calls: AtomicUsize,
}

#[async_trait]
impl SearchEngineClient for RecordingEngine {
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), SearchError> {
        self.collections.lock().await.push(schema.clone());
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), SearchError> {
        let mut collections = self.collections.lock().await;
        let before = collections.len();
        collections.retain(|c| c.name != name);
        if collections.len() == before {
            return Err(SearchError::not_found(name));
        }
        Ok(())
    }

    async fn retrieve_collection(
        &self,
        name: &str,
    ) -> Result<Option<CollectionSchema>, SearchError> {
        Ok(self
            .collections
            .lock()
            .await
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn upsert_document(
        &self,
        _collection: &str,
        document: &Document,
    ) -> Result<(), SearchError> {
        self.upserts.lock().await.push(document.clone());
        Ok(())
    }

    async fn delete_documents(&self, _collection: &str, filter_by: &str) -> Result<u64, SearchError> {
        self.deletes.lock().await.push(filter_by.to_string());
        Ok(0)
    }

    async fn import_documents(
        &self,
        _collection: &str,
        documents: &[Document],
        _action: ImportAction,
    ) -> Result<Vec<ImportResult>, SearchError> {
        self.import_calls.fetch_add(1, Ordering::SeqCst);
        self.imports.lock().await.push(documents.to_vec());
        Ok((0..documents.len())
            .map(|i| ImportResult {
                success: self.reject_every == 0 || (i + 1) % self.reject_every != 0,
                ..Default::default()
            })
            .collect())
    }

    async fn search(
        &self,
        _collection: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        self.searches.lock().await.push(request.clone());
        Ok(self.search_response.clone().unwrap_or_else(SearchResponse::empty))
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(true)
    }
}

/// Item store holding `total` public items.
pub struct ItemStore {
    pub total: usize,
}

#[async_trait]
impl RowSource for ItemStore {
    async fn fetch_rows(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawItemRow>, ExtractError> {
        let end = (offset + limit).min(self.total);
        Ok((offset..end)
            .map(|i| {
                let title = format!("Item {}", i + 1);
                let creator = format!("Creator {}", i + 1);
                RawItemRow::from_pairs(
                    i as i64 + 1,
                    [
                        ("dcterms:title", title.as_str()),
                        ("dcterms:creator", creator.as_str()),
                        ("foaf:name", "ignored"),
                    ],
                )
            })
            .collect())
    }
}

pub fn engine() -> Arc<RecordingEngine> {
    Arc::new(RecordingEngine::default())
}
