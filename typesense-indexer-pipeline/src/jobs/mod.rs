//! Index jobs, their execution and submission.
//!
//! Jobs are submitted fire-and-forget: the submitter gets a job id back and
//! learns the outcome from the logs.

mod admin;
mod dispatcher;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{DispatchError, LifecycleError};
use crate::extractor::{BatchExtractor, RowSource, BATCH_SIZE};
use crate::lifecycle::{DeleteOutcome, IndexLifecycleManager, ReindexReport};
use typesense_indexer_shared::IndexedProperty;

pub use admin::{AdminMessage, IndexAdmin};
pub use dispatcher::TokioJobDispatcher;

/// A background index job and its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "PascalCase")]
pub enum IndexJob {
    CreateIndex {
        index_name: String,
        index_fields: Vec<IndexedProperty>,
    },
    DeleteIndex {
        index_name: String,
    },
    RecreateIndex {
        index_name: String,
        index_fields: Vec<IndexedProperty>,
    },
}

impl IndexJob {
    pub fn index_name(&self) -> &str {
        match self {
            IndexJob::CreateIndex { index_name, .. }
            | IndexJob::DeleteIndex { index_name }
            | IndexJob::RecreateIndex { index_name, .. } => index_name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            IndexJob::CreateIndex { .. } => "CreateIndex",
            IndexJob::DeleteIndex { .. } => "DeleteIndex",
            IndexJob::RecreateIndex { .. } => "RecreateIndex",
        }
    }

    /// Reject jobs that cannot run.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.index_name().trim().is_empty() {
            return Err(DispatchError::InvalidJob(format!(
                "{} requires an index name",
                self.kind()
            )));
        }
        Ok(())
    }
}

/// Identifier handed back on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Fire-and-forget job submission.
pub trait JobDispatcher: Send + Sync {
    /// Queue a job for background execution.
    ///
    /// # Returns
    ///
    /// * `Ok(JobId)` - The job was accepted
    /// * `Err(DispatchError)` - The job was rejected or cannot be queued
    fn submit(&self, job: IndexJob) -> Result<JobId, DispatchError>;
}

/// What a finished job did.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Created,
    Deleted(DeleteOutcome),
    Recreated(ReindexReport),
}

/// Runs jobs against the lifecycle manager.
pub struct JobRunner {
    manager: Arc<IndexLifecycleManager>,
    source: Arc<dyn RowSource>,
    batch_size: usize,
}

impl JobRunner {
    pub fn new(manager: Arc<IndexLifecycleManager>, source: Arc<dyn RowSource>) -> Self {
        Self {
            manager,
            source,
            batch_size: BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Run a job to completion.
    #[instrument(skip(self, job), fields(job = job.kind(), index_name = %job.index_name()))]
    pub async fn run(&self, job: &IndexJob) -> Result<JobOutcome, LifecycleError> {
        info!("Running job");
        match job {
            IndexJob::CreateIndex {
                index_name,
                index_fields,
            } => {
                self.manager.create_index(index_name, index_fields).await?;
                Ok(JobOutcome::Created)
            }
            IndexJob::DeleteIndex { index_name } => {
                let outcome = self.manager.delete_index(index_name).await?;
                Ok(JobOutcome::Deleted(outcome))
            }
            IndexJob::RecreateIndex {
                index_name,
                index_fields,
            } => {
                let extractor =
                    BatchExtractor::new(self.source.clone()).with_batch_size(self.batch_size);
                let report = self
                    .manager
                    .recreate_index(index_name, index_fields, extractor)
                    .await?;
                Ok(JobOutcome::Recreated(report))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, MockClient, VecRowSource};

    fn runner(client: Arc<MockClient>, total: usize) -> JobRunner {
        let manager = Arc::new(IndexLifecycleManager::new(client));
        JobRunner::new(manager, Arc::new(VecRowSource { total })).with_batch_size(10)
    }

    #[test]
    fn test_job_serialization() {
        let job = IndexJob::RecreateIndex {
            index_name: "items".to_string(),
            index_fields: IndexedProperty::parse_list("dcterms:title").unwrap(),
        };

        let value = serde_json::to_value(&job).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "job": "RecreateIndex",
                "index_name": "items",
                "index_fields": ["dcterms:title"]
            })
        );
        assert_eq!(serde_json::from_value::<IndexJob>(value).unwrap(), job);
    }

    #[test]
    fn test_validate() {
        let job = IndexJob::DeleteIndex {
            index_name: " ".to_string(),
        };
        assert!(matches!(job.validate(), Err(DispatchError::InvalidJob(_))));
    }

    #[tokio::test]
    async fn test_run_recreate() {
        let client = Arc::new(MockClient::new());
        let job = IndexJob::RecreateIndex {
            index_name: "items".to_string(),
            index_fields: IndexedProperty::parse_list("dcterms:title").unwrap(),
        };

        let outcome = runner(client, 15).run(&job).await.unwrap();

        match outcome {
            JobOutcome::Recreated(report) => assert_eq!(report.succeeded, 15),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_delete_absent() {
        let client = Arc::new(MockClient::new());
        let job = IndexJob::DeleteIndex {
            index_name: "items".to_string(),
        };

        let outcome = runner(client.clone(), 0).run(&job).await.unwrap();

        assert_eq!(outcome, JobOutcome::Deleted(DeleteOutcome::Absent));
        assert_eq!(client.calls().await, vec![Call::RetrieveCollection("items".into())]);
    }
}
