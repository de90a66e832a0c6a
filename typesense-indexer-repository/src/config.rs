//! Configuration types for the Typesense client.

use std::time::Duration;

use url::Url;

use crate::errors::SearchError;

/// Default deadline for a single request to the engine.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default deadline for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for a Typesense node.
#[derive(Debug, Clone)]
pub struct TypesenseConfig {
    /// Base URL of the node, e.g. `http://localhost:8108`.
    pub endpoint: Url,
    /// API key sent with every request.
    pub api_key: String,
    /// Deadline for each request, including reading the response body.
    pub request_timeout: Duration,
    /// Deadline for establishing the TCP/TLS connection.
    pub connect_timeout: Duration,
}

impl TypesenseConfig {
    /// Create a config with default timeouts.
    pub fn new(endpoint: &str, api_key: impl Into<String>) -> Result<Self, SearchError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SearchError::connection(format!("Invalid endpoint {}: {}", endpoint, e)))?;
        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    /// Override the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the connect deadline.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
