//! Dependency initialization and wiring for the indexer.

use std::env;
use std::sync::Arc;

use tracing::info;

use crate::IndexingError;
use typesense_indexer_pipeline::{
    IncrementalSyncHandler, IndexLifecycleManager, JobRunner, MySqlRowSource, SearchService,
    SearchSettings,
};
use typesense_indexer_repository::{SearchEngineClient, TypesenseClient};

/// Environment variable holding the Omeka S database URL.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Settings read from the environment.
    pub settings: SearchSettings,
    /// The engine client shared by every component.
    pub client: Arc<dyn SearchEngineClient>,
    /// Collection create/delete/rebuild operations.
    pub lifecycle: Arc<IndexLifecycleManager>,
    /// The search endpoint.
    pub search: SearchService,
    database_url: Option<String>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TYPESENSE_URL`: Typesense node URL (required)
    /// - `TYPESENSE_API_KEY`: Typesense API key (required)
    /// - `TYPESENSE_SEARCH_INDEX`: Name of the current collection (required)
    /// - `TYPESENSE_INDEX_PROPERTIES`: Indexed properties, highest weight first
    /// - `TYPESENSE_RESULT_FORMAT`: Display template, e.g. `{dcterms:title}`
    /// - `TYPESENSE_HIGHLIGHT`: Use engine highlights (`1`/`0`)
    /// - `DATABASE_URL`: Omeka S MySQL database, needed to rebuild the index
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails
    pub async fn new() -> Result<Self, IndexingError> {
        let settings = SearchSettings::from_env()?;
        Self::from_settings(settings, env::var(DATABASE_URL_VAR).ok()).await
    }

    /// Initialize dependencies from explicit settings.
    pub async fn from_settings(
        settings: SearchSettings,
        database_url: Option<String>,
    ) -> Result<Self, IndexingError> {
        let client_config = settings.client_config()?;

        info!(
            endpoint = %client_config.endpoint,
            index_name = %settings.index_name,
            properties = settings.properties.len(),
            "Initializing dependencies"
        );

        let client = TypesenseClient::new(client_config)
            .map_err(|e| IndexingError::config(format!("Failed to create Typesense client: {}", e)))?;

        // Verify Typesense is reachable
        let healthy = client
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("Typesense health check failed: {}", e)))?;

        if !healthy {
            return Err(IndexingError::config("Typesense node is unhealthy"));
        }

        info!("Typesense connection verified");

        let client: Arc<dyn SearchEngineClient> = Arc::new(client);
        let lifecycle = Arc::new(IndexLifecycleManager::new(client.clone()));
        let search = SearchService::new(&settings, client.clone())?;

        Ok(Self {
            settings,
            client,
            lifecycle,
            search,
            database_url: database_url.filter(|url| !url.trim().is_empty()),
        })
    }

    /// Job runner reading items from the Omeka S database.
    ///
    /// # Returns
    ///
    /// * `Ok(JobRunner)` - A runner with a lazily connected item source
    /// * `Err(IndexingError)` - If `DATABASE_URL` is not set or invalid
    pub fn job_runner(&self) -> Result<JobRunner, IndexingError> {
        let database_url = self
            .database_url
            .as_deref()
            .ok_or_else(|| IndexingError::config(format!("{} is not set", DATABASE_URL_VAR)))?;

        let source = MySqlRowSource::connect(database_url)?;
        Ok(JobRunner::new(self.lifecycle.clone(), Arc::new(source))
            .with_batch_size(self.settings.batch_size))
    }

    /// Incremental sync handler for the current collection.
    pub fn sync_handler(&self) -> IncrementalSyncHandler {
        IncrementalSyncHandler::new(
            self.client.clone(),
            self.settings.index_name.clone(),
            &self.settings.properties,
        )
        .with_retract_private(self.settings.retract_private)
    }
}
