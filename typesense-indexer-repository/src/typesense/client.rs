//! Typesense client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! over the Typesense HTTP API using `reqwest`.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::TypesenseConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::types::{ImportAction, ImportResult};
use crate::typesense::documents::{
    document_body, encode_import_body, parse_import_response, parse_search_response,
};
use crate::typesense::queries::search_params;
use typesense_indexer_shared::{CollectionSchema, Document, SearchRequest, SearchResponse};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

/// Typesense client implementation.
///
/// Every request is bounded by the configured request timeout, so a hung
/// node surfaces as `SearchError::Timeout` instead of blocking the caller.
///
/// # Example
///
/// ```ignore
/// let config = TypesenseConfig::new("http://localhost:8108", "xyz")?;
/// let client = TypesenseClient::new(config)?;
///
/// let schema = SchemaBuilder::new().build("items", &properties);
/// client.create_collection(&schema).await?;
/// ```
pub struct TypesenseClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl TypesenseClient {
    /// Create a new client for the configured node.
    ///
    /// # Returns
    ///
    /// * `Ok(TypesenseClient)` - A new client instance
    /// * `Err(SearchError)` - If the HTTP client cannot be built
    pub fn new(config: TypesenseConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(
            endpoint = %config.endpoint,
            timeout_secs = config.request_timeout.as_secs(),
            "Created Typesense client"
        );

        Ok(Self {
            http,
            base_url: config.endpoint,
            api_key: config.api_key,
        })
    }

    /// Build a URL from path segments, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SearchError::connection(format!("Invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and map non-success statuses to errors.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<RequestBody>,
    ) -> Result<Response, SearchError> {
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(API_KEY_HEADER, &self.api_key);

        request = match body {
            Some(RequestBody::Json(value)) => request.json(&value),
            Some(RequestBody::Text(text)) => request.header(CONTENT_TYPE, "text/plain").body(text),
            None => request,
        };

        let response = request.send().await.map_err(SearchError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        debug!(method = %method, url = %url, status = %status, message = %message, "Request failed");

        Err(match status {
            StatusCode::NOT_FOUND => SearchError::not_found(message),
            StatusCode::CONFLICT => SearchError::Conflict(message),
            _ => SearchError::api(status.as_u16(), message),
        })
    }

    async fn send_json(
        &self,
        method: Method,
        url: Url,
        body: Option<RequestBody>,
    ) -> Result<Value, SearchError> {
        let response = self.send(method, url, body).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }
}

enum RequestBody {
    Json(Value),
    Text(String),
}

/// Extract the `message` of a Typesense error body, or the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl SearchEngineClient for TypesenseClient {
    #[instrument(skip(self, schema), fields(collection = %schema.name))]
    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), SearchError> {
        let url = self.url(&["collections"])?;
        let body = serde_json::to_value(schema)?;
        self.send(Method::POST, url, Some(RequestBody::Json(body)))
            .await?;
        info!(fields = schema.fields.len(), "Collection created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, name: &str) -> Result<(), SearchError> {
        let url = self.url(&["collections", name])?;
        self.send(Method::DELETE, url, None).await?;
        info!("Collection deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn retrieve_collection(
        &self,
        name: &str,
    ) -> Result<Option<CollectionSchema>, SearchError> {
        let url = self.url(&["collections", name])?;
        match self.send_json(Method::GET, url, None).await {
            Ok(value) => {
                let schema = serde_json::from_value::<CollectionSchema>(value)
                    .map_err(|e| SearchError::parse(e.to_string()))?;
                Ok(Some(schema))
            }
            Err(SearchError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn upsert_document(
        &self,
        collection: &str,
        document: &Document,
    ) -> Result<(), SearchError> {
        let mut url = self.url(&["collections", collection, "documents"])?;
        url.query_pairs_mut()
            .append_pair("action", ImportAction::Upsert.as_str());

        let body = document_body(document)?;
        self.send(Method::POST, url, Some(RequestBody::Json(body)))
            .await?;

        debug!(collection = %collection, resource_id = %document.resource_id, "Document upserted");
        Ok(())
    }

    async fn delete_documents(&self, collection: &str, filter_by: &str) -> Result<u64, SearchError> {
        let mut url = self.url(&["collections", collection, "documents"])?;
        url.query_pairs_mut().append_pair("filter_by", filter_by);

        let value = self.send_json(Method::DELETE, url, None).await?;
        let deleted = value
            .get("num_deleted")
            .and_then(|n| n.as_u64())
            .unwrap_or(0);

        debug!(collection = %collection, filter_by = %filter_by, deleted, "Documents deleted");
        Ok(deleted)
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn import_documents(
        &self,
        collection: &str,
        documents: &[Document],
        action: ImportAction,
    ) -> Result<Vec<ImportResult>, SearchError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.url(&["collections", collection, "documents", "import"])?;
        url.query_pairs_mut().append_pair("action", action.as_str());

        let body = encode_import_body(documents)?;
        let response = self
            .send(Method::POST, url, Some(RequestBody::Text(body)))
            .await?;
        let text = response.text().await.map_err(SearchError::from)?;

        let results = parse_import_response(&text)?;
        if results.len() != documents.len() {
            error!(
                submitted = documents.len(),
                returned = results.len(),
                "Import result count mismatch"
            );
        }
        Ok(results)
    }

    async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        if !request.is_consistent() {
            return Err(SearchError::invalid_query(
                "query_by, query_by_weights and infix lengths differ",
            ));
        }

        let mut url = self.url(&["collections", collection, "documents", "search"])?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in search_params(request) {
                pairs.append_pair(key, &value);
            }
        }

        let raw = self.send_json(Method::GET, url, None).await?;
        let response = parse_search_response(raw)?;

        debug!(
            collection = %collection,
            query = %request.query_text,
            found = response.found,
            hits = response.hits.len(),
            "Search completed"
        );
        Ok(response)
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let url = self.url(&["health"])?;
        let value = self.send_json(Method::GET, url, None).await?;
        Ok(value.get("ok").and_then(|ok| ok.as_bool()).unwrap_or(false))
    }
}
