//! Index lifecycle management.
//!
//! Creates and deletes collections, and rebuilds a collection from scratch
//! by streaming item batches from the relational store into a bulk import.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};

use crate::errors::LifecycleError;
use crate::extractor::BatchExtractor;
use crate::processor::DocumentMapper;
use typesense_indexer_repository::{ImportAction, ImportSummary, SearchEngineClient, SearchError};
use typesense_indexer_shared::{IndexedProperty, SchemaBuilder};

/// State of a reindex job.
///
/// `Pending → CheckingExisting → (Deleting) → Creating → Importing* → Done | Aborted`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    CheckingExisting,
    Deleting,
    Creating,
    /// Importing the zero-based batch.
    Importing { batch: usize },
    Done,
    Aborted,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Aborted)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::CheckingExisting => write!(f, "checking existing"),
            JobState::Deleting => write!(f, "deleting"),
            JobState::Creating => write!(f, "creating"),
            JobState::Importing { batch } => write!(f, "importing batch {}", batch),
            JobState::Done => write!(f, "done"),
            JobState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// There was no collection to delete.
    Absent,
}

/// Summary of a completed reindex.
#[derive(Debug, Clone, PartialEq)]
pub struct ReindexReport {
    pub index_name: String,
    pub state: JobState,
    /// Number of import requests issued.
    pub batches: usize,
    /// Number of documents submitted.
    pub submitted: usize,
    /// Number of documents the engine accepted.
    pub succeeded: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Orchestrates collection creation, deletion and full rebuilds.
///
/// No step is retried. A failed create or import aborts the rebuild and
/// leaves whatever was already written in place; operators re-trigger.
pub struct IndexLifecycleManager {
    client: Arc<dyn SearchEngineClient>,
    schema_builder: SchemaBuilder,
}

impl IndexLifecycleManager {
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self {
            client,
            schema_builder: SchemaBuilder::new(),
        }
    }

    /// Use a custom schema builder (infix fields, token separators).
    pub fn with_schema_builder(mut self, schema_builder: SchemaBuilder) -> Self {
        self.schema_builder = schema_builder;
        self
    }

    /// Create a collection for the given properties.
    ///
    /// # Arguments
    ///
    /// * `index_name` - Name of the collection to create
    /// * `properties` - Ordered list of indexed properties
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The collection was created
    /// * `Err(LifecycleError::CreateFailed)` - The engine rejected the request
    #[instrument(skip(self, properties), fields(index_name = %index_name))]
    pub async fn create_index(
        &self,
        index_name: &str,
        properties: &[IndexedProperty],
    ) -> Result<(), LifecycleError> {
        let schema = self.schema_builder.build(index_name, properties);

        match self.client.create_collection(&schema).await {
            Ok(()) => {
                info!(fields = schema.fields.len(), "Created index");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error creating index");
                Err(LifecycleError::CreateFailed {
                    index_name: index_name.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Delete a collection, tolerating its absence.
    ///
    /// The collection is looked up first. If it cannot be retrieved the
    /// failure is logged and the delete is still attempted.
    ///
    /// # Returns
    ///
    /// * `Ok(DeleteOutcome::Deleted)` - The collection was deleted
    /// * `Ok(DeleteOutcome::Absent)` - There was nothing to delete
    /// * `Err(LifecycleError::DeleteFailed)` - The engine rejected the delete
    #[instrument(skip(self), fields(index_name = %index_name))]
    pub async fn delete_index(&self, index_name: &str) -> Result<DeleteOutcome, LifecycleError> {
        match self.client.retrieve_collection(index_name).await {
            Ok(None) => {
                info!("Index does not exist, nothing to delete");
                return Ok(DeleteOutcome::Absent);
            }
            Ok(Some(_)) => {}
            Err(e) => warn!(error = %e, "Could not retrieve index before delete"),
        }

        match self.client.delete_collection(index_name).await {
            Ok(()) => {
                info!("Deleted index");
                Ok(DeleteOutcome::Deleted)
            }
            Err(SearchError::NotFound(_)) => Ok(DeleteOutcome::Absent),
            Err(e) => {
                error!(error = %e, "Error deleting index");
                Err(LifecycleError::DeleteFailed {
                    index_name: index_name.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Rebuild a collection from the relational store.
    ///
    /// Drops the existing collection of that name (delete failures are
    /// logged and ignored), creates a fresh one, then imports every batch
    /// from `extractor` with `action=create`, counting per-document
    /// successes. A create, extraction or import failure aborts the job.
    ///
    /// # Arguments
    ///
    /// * `index_name` - Name of the collection to rebuild
    /// * `properties` - Ordered list of indexed properties
    /// * `extractor` - Batch source, typically starting at offset 0
    ///
    /// # Returns
    ///
    /// * `Ok(ReindexReport)` - The job reached `Done`
    /// * `Err(LifecycleError::JobAborted)` - The job stopped early
    #[instrument(skip(self, properties, extractor), fields(index_name = %index_name))]
    pub async fn recreate_index(
        &self,
        index_name: &str,
        properties: &[IndexedProperty],
        mut extractor: BatchExtractor,
    ) -> Result<ReindexReport, LifecycleError> {
        let started = Instant::now();
        let mut report = ReindexReport {
            index_name: index_name.to_string(),
            state: JobState::Pending,
            batches: 0,
            submitted: 0,
            succeeded: 0,
            failed: 0,
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        };

        info!(batch_size = extractor.batch_size(), "Started indexing items");

        report.state = JobState::CheckingExisting;
        let existing = match self.client.retrieve_collection(index_name).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!(error = %e, "Could not retrieve index, treating it as absent");
                None
            }
        };

        if existing.is_some_and(|schema| schema.name == index_name) {
            report.state = JobState::Deleting;
            if let Err(e) = self.client.delete_collection(index_name).await {
                error!(error = %e, "Error deleting index, continuing");
            }
        }

        report.state = JobState::Creating;
        let schema = self.schema_builder.build(index_name, properties);
        if let Err(e) = self.client.create_collection(&schema).await {
            error!(error = %e, "Error creating index");
            return Err(self.abort(report, e.to_string()));
        }

        let mapper = DocumentMapper::new(properties);
        loop {
            report.state = JobState::Importing {
                batch: report.batches,
            };

            let batch = match extractor.next_batch().await {
                Ok(Some(batch)) => batch,
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "Error reading items");
                    return Err(self.abort(report, e.to_string()));
                }
            };

            let documents = mapper.map_batch(&batch);
            if documents.is_empty() {
                continue;
            }

            let results = match self
                .client
                .import_documents(index_name, &documents, ImportAction::Create)
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    error!(error = %e, offset = batch.offset, "Error importing documents");
                    return Err(self.abort(report, e.to_string()));
                }
            };

            let summary = ImportSummary::from_results(results);
            for message in summary.errors().take(5) {
                warn!(error = %message, "Document rejected");
            }
            info!(
                batch = report.batches,
                offset = batch.offset,
                submitted = documents.len(),
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Imported batch"
            );

            report.batches += 1;
            report.submitted += documents.len();
            report.succeeded += summary.succeeded;
            report.failed += summary.failed;
        }

        report.state = JobState::Done;
        report.elapsed = started.elapsed();
        info!(
            count = report.succeeded,
            batches = report.batches,
            elapsed_secs = report.elapsed.as_secs(),
            "Finished indexing"
        );
        Ok(report)
    }

    fn abort(&self, report: ReindexReport, reason: String) -> LifecycleError {
        error!(
            state = %report.state,
            count = report.succeeded,
            batches = report.batches,
            "Indexing aborted"
        );
        LifecycleError::JobAborted {
            index_name: report.index_name,
            state: report.state,
            reason,
        }
    }
}
