//! In-memory search engine client used by unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use typesense_indexer_repository::{ImportAction, ImportResult, SearchEngineClient, SearchError};
use typesense_indexer_shared::{CollectionSchema, Document, SearchRequest, SearchResponse};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateCollection(String),
    DeleteCollection(String),
    RetrieveCollection(String),
    Upsert { collection: String, resource_id: String },
    DeleteDocuments { collection: String, filter_by: String },
    Import { collection: String, count: usize },
    Search { collection: String, query: String },
}

#[derive(Default)]
pub(crate) struct MockClient {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub existing: Mutex<Option<CollectionSchema>>,
    pub fail_retrieve: Option<SearchError>,
    pub fail_create: Option<SearchError>,
    pub fail_delete: Option<SearchError>,
    pub fail_upsert: Option<SearchError>,
    pub fail_search: Option<SearchError>,
    /// Zero-based import call that fails.
    pub fail_import_at: Option<usize>,
    /// Documents the engine rejects on import.
    pub reject_ids: HashSet<String>,
    pub search_response: Option<SearchResponse>,
    pub imports: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(self, name: &str) -> Self {
        Self {
            existing: Mutex::new(Some(CollectionSchema {
                name: name.to_string(),
                fields: Vec::new(),
                token_separators: Vec::new(),
            })),
            ..self
        }
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl SearchEngineClient for MockClient {
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), SearchError> {
        self.record(Call::CreateCollection(schema.name.clone())).await;
        if let Some(err) = &self.fail_create {
            return Err(err.clone());
        }
        *self.existing.lock().await = Some(schema.clone());
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), SearchError> {
        self.record(Call::DeleteCollection(name.to_string())).await;
        if let Some(err) = &self.fail_delete {
            return Err(err.clone());
        }
        let mut existing = self.existing.lock().await;
        match existing.as_ref() {
            Some(schema) if schema.name == name => {
                *existing = None;
                Ok(())
            }
            _ => Err(SearchError::not_found(format!("No collection {}", name))),
        }
    }

    async fn retrieve_collection(
        &self,
        name: &str,
    ) -> Result<Option<CollectionSchema>, SearchError> {
        self.record(Call::RetrieveCollection(name.to_string())).await;
        if let Some(err) = &self.fail_retrieve {
            return Err(err.clone());
        }
        Ok(self
            .existing
            .lock()
            .await
            .clone()
            .filter(|schema| schema.name == name))
    }

    async fn upsert_document(
        &self,
        collection: &str,
        document: &Document,
    ) -> Result<(), SearchError> {
        self.record(Call::Upsert {
            collection: collection.to_string(),
            resource_id: document.resource_id.clone(),
        })
        .await;
        match &self.fail_upsert {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn delete_documents(&self, collection: &str, filter_by: &str) -> Result<u64, SearchError> {
        self.record(Call::DeleteDocuments {
            collection: collection.to_string(),
            filter_by: filter_by.to_string(),
        })
        .await;
        Ok(1)
    }

    async fn import_documents(
        &self,
        collection: &str,
        documents: &[Document],
        _action: ImportAction,
    ) -> Result<Vec<ImportResult>, SearchError> {
        self.record(Call::Import {
            collection: collection.to_string(),
            count: documents.len(),
        })
        .await;
        let index = self.imports.fetch_add(1, Ordering::SeqCst);
        if self.fail_import_at == Some(index) {
            return Err(SearchError::api(503, "Not Ready or Lagging"));
        }
        Ok(documents
            .iter()
            .map(|doc| {
                if self.reject_ids.contains(&doc.resource_id) {
                    ImportResult {
                        success: false,
                        error: Some("A document with this id already exists.".to_string()),
                        document: None,
                    }
                } else {
                    ImportResult {
                        success: true,
                        ..Default::default()
                    }
                }
            })
            .collect())
    }

    async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        self.record(Call::Search {
            collection: collection.to_string(),
            query: request.query_text.clone(),
        })
        .await;
        if let Some(err) = &self.fail_search {
            return Err(err.clone());
        }
        Ok(self.search_response.clone().unwrap_or_else(SearchResponse::empty))
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(true)
    }
}

/// Row source holding `total` items with ids `1..=total`, each with a title.
pub(crate) struct VecRowSource {
    pub total: usize,
}

#[async_trait]
impl crate::extractor::RowSource for VecRowSource {
    async fn fetch_rows(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<crate::extractor::RawItemRow>, crate::errors::ExtractError> {
        let end = (offset + limit).min(self.total);
        Ok((offset..end)
            .map(|i| {
                let title = format!("Item {}", i + 1);
                let subject = format!("Subject {}", i + 1);
                crate::extractor::RawItemRow::from_pairs(
                    i as i64 + 1,
                    [("dcterms:title", title.as_str()), ("dcterms:subject", subject.as_str())],
                )
            })
            .collect())
    }
}
