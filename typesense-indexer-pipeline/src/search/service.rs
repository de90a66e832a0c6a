//! The search endpoint behind `GET /search?query=<q>`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use super::formatter::{DisplayResult, ResultFormatter};
use super::links::{ItemLinkBuilder, LinkBuilder};
use super::planner::QueryPlanner;
use crate::errors::ConfigError;
use crate::settings::SearchSettings;
use typesense_indexer_repository::SearchEngineClient;
use typesense_indexer_shared::ResultFormat;

/// Response body of a search: formatted results plus the raw engine payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPayload {
    pub results: Vec<DisplayResult>,
    /// Raw engine response, omitted when no search was sent.
    #[serde(skip_serializing_if = "Value::is_null")]
    pub typesense: Value,
}

impl SearchPayload {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            typesense: Value::Null,
        }
    }
}

/// Plans a query, runs it against the current collection and formats the hits.
///
/// Engine failures degrade to an empty payload; they are logged, never
/// returned.
pub struct SearchService {
    client: Arc<dyn SearchEngineClient>,
    index_name: String,
    planner: QueryPlanner,
    formatter: ResultFormatter,
}

impl SearchService {
    /// Build the service from settings.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchService)` - A ready service
    /// * `Err(ConfigError::Missing)` - Endpoint, API key or index name is not set
    pub fn new(
        settings: &SearchSettings,
        client: Arc<dyn SearchEngineClient>,
    ) -> Result<Self, ConfigError> {
        Self::with_link_builder(settings, client, Arc::new(ItemLinkBuilder::default()))
    }

    /// Build the service with a custom link builder.
    pub fn with_link_builder(
        settings: &SearchSettings,
        client: Arc<dyn SearchEngineClient>,
        links: Arc<dyn LinkBuilder>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        let planner = QueryPlanner::new(&settings.properties).with_per_page(settings.per_page);
        let formatter = ResultFormatter::new(
            ResultFormat::parse(settings.result_format.as_str()),
            settings.highlight,
            links,
        );

        Ok(Self {
            client,
            index_name: settings.index_name.clone(),
            planner,
            formatter,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Search for `query` and format the hits.
    #[instrument(skip(self), fields(index_name = %self.index_name))]
    pub async fn search(&self, query: &str) -> SearchPayload {
        let Some(request) = self.planner.plan(query) else {
            debug!("Query not planned, returning no results");
            return SearchPayload::empty();
        };

        match self.client.search(&self.index_name, &request).await {
            Ok(response) => SearchPayload {
                results: self.formatter.format(&response.hits),
                typesense: response.raw,
            },
            Err(e) => {
                error!(error = %e, "Search failed");
                SearchPayload::empty()
            }
        }
    }
}
