//! Administrative index operations behind the `/search-index` routes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use super::{IndexJob, JobDispatcher, JobId};
use crate::errors::PipelineError;
use crate::settings::{SearchSettings, SettingsStore};

/// Response body of an administrative request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminMessage {
    pub message: String,
}

impl AdminMessage {
    fn submitted(job: &IndexJob, id: JobId) -> Self {
        Self {
            message: format!("{} job {} submitted for {}", job.kind(), id, job.index_name()),
        }
    }

    fn error(err: impl std::fmt::Display) -> Self {
        Self {
            message: format!("error {}", err),
        }
    }

    pub fn is_error(&self) -> bool {
        self.message.starts_with("error")
    }
}

/// Submits index jobs for the current settings.
pub struct IndexAdmin {
    store: Arc<dyn SettingsStore>,
    dispatcher: Arc<dyn JobDispatcher>,
}

impl IndexAdmin {
    pub fn new(store: Arc<dyn SettingsStore>, dispatcher: Arc<dyn JobDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Queue a `CreateIndex` job for the current index.
    pub fn create_index(&self) -> AdminMessage {
        self.submit_for_current(|settings| IndexJob::CreateIndex {
            index_name: settings.index_name.clone(),
            index_fields: settings.properties.clone(),
        })
    }

    /// Queue a `DeleteIndex` job for the current index.
    pub fn drop_index(&self) -> AdminMessage {
        self.submit_for_current(|settings| IndexJob::DeleteIndex {
            index_name: settings.index_name.clone(),
        })
    }

    /// Queue a `RecreateIndex` job for the current index
    /// (`POST /search-index`).
    pub fn trigger_reindex(&self) -> AdminMessage {
        self.submit_for_current(|settings| IndexJob::RecreateIndex {
            index_name: settings.index_name.clone(),
            index_fields: settings.properties.clone(),
        })
    }

    fn submit_for_current<F>(&self, build: F) -> AdminMessage
    where
        F: FnOnce(&SearchSettings) -> IndexJob,
    {
        let settings = match SearchSettings::from_store(self.store.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                error!(error = %e, "Cannot read settings");
                return AdminMessage::error(e);
            }
        };

        let job = build(&settings);
        match self.dispatcher.submit(job.clone()) {
            Ok(id) => AdminMessage::submitted(&job, id),
            Err(e) => {
                error!(error = %e, index_name = %job.index_name(), "Cannot submit job");
                AdminMessage::error(e)
            }
        }
    }

    /// Persist new settings.
    ///
    /// When the active index is renamed, the old collection is dropped and
    /// the new one rebuilt: `DeleteIndex{old}` is submitted, then
    /// `RecreateIndex{new}`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<JobId>)` - Ids of the submitted jobs, empty if no rename
    /// * `Err(PipelineError)` - The new settings are incomplete or a job was rejected
    #[instrument(skip(self, settings), fields(index_name = %settings.index_name))]
    pub fn apply_settings(&self, settings: &SearchSettings) -> Result<Vec<JobId>, PipelineError> {
        settings.validate()?;
        let previous = SearchSettings::from_store(self.store.as_ref())?;

        settings.save(self.store.as_ref());
        info!("Settings saved");

        let old_name = previous.index_name.trim();
        if old_name.is_empty() || old_name == settings.index_name.trim() {
            return Ok(Vec::new());
        }

        info!(old_index = %old_name, "Index renamed");
        let delete = self.dispatcher.submit(IndexJob::DeleteIndex {
            index_name: old_name.to_string(),
        })?;
        let recreate = self.dispatcher.submit(IndexJob::RecreateIndex {
            index_name: settings.index_name.clone(),
            index_fields: settings.properties.clone(),
        })?;
        Ok(vec![delete, recreate])
    }
}
