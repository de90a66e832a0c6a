//! Search settings and the key/value store they live in.
//!
//! The host owns the settings store; the indexer only reads and writes
//! individual keys. `SearchSettings` is the explicit configuration passed
//! into every component constructor.

use std::collections::HashMap;
use std::env;
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::errors::ConfigError;
use crate::extractor::BATCH_SIZE;
use crate::search::DEFAULT_PER_PAGE;
use typesense_indexer_repository::TypesenseConfig;
use typesense_indexer_shared::IndexedProperty;

pub use typesense_indexer_repository::config::DEFAULT_REQUEST_TIMEOUT;

/// Key/value settings storage owned by the host.
///
/// Each call is atomic on its own; nothing is transactional across calls.
pub trait SettingsStore: Send + Sync {
    /// Read a value, `None` if the key was never set.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&self, key: &str, value: &str);
}

/// A `SettingsStore` kept in process memory.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with the given pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl SettingsStore for InMemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
    }
}

/// Key names in the host settings store.
pub mod keys {
    pub const URL: &str = "typesense_url";
    pub const API_KEY: &str = "typesense_api_key";
    pub const INDEX_NAME: &str = "typesense_search_index";
    pub const INDEX_PROPERTIES: &str = "typesense_index_properties";
    pub const RESULT_FORMAT: &str = "typesense_search_result_format";
    pub const HIGHLIGHT: &str = "typesense_search_highlight";
    pub const PER_PAGE: &str = "typesense_search_per_page";
    pub const RETRACT_PRIVATE: &str = "typesense_retract_private";
}

/// Environment variable names.
pub mod env_vars {
    pub const URL: &str = "TYPESENSE_URL";
    pub const API_KEY: &str = "TYPESENSE_API_KEY";
    pub const INDEX_NAME: &str = "TYPESENSE_SEARCH_INDEX";
    pub const INDEX_PROPERTIES: &str = "TYPESENSE_INDEX_PROPERTIES";
    pub const RESULT_FORMAT: &str = "TYPESENSE_RESULT_FORMAT";
    pub const HIGHLIGHT: &str = "TYPESENSE_HIGHLIGHT";
    pub const PER_PAGE: &str = "TYPESENSE_PER_PAGE";
    pub const RETRACT_PRIVATE: &str = "TYPESENSE_RETRACT_PRIVATE";
    pub const BATCH_SIZE: &str = "TYPESENSE_BATCH_SIZE";
    pub const REQUEST_TIMEOUT_SECS: &str = "TYPESENSE_REQUEST_TIMEOUT_SECS";
}

/// Configuration of the indexer and the search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Engine base URL, e.g. `http://localhost:8108`.
    pub endpoint: String,
    pub api_key: String,
    /// Name of the current collection.
    pub index_name: String,
    /// Indexed properties, highest query weight first.
    pub properties: Vec<IndexedProperty>,
    /// Display template with `{vocabulary:local_name}` tokens.
    pub result_format: String,
    /// Use engine highlight snippets instead of the template.
    pub highlight: bool,
    pub per_page: u32,
    pub batch_size: usize,
    pub request_timeout: Duration,
    /// Delete the document of an item that becomes private.
    pub retract_private: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            index_name: String::new(),
            properties: Vec::new(),
            result_format: String::new(),
            highlight: false,
            per_page: DEFAULT_PER_PAGE,
            batch_size: BATCH_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retract_private: false,
        }
    }
}

impl SearchSettings {
    /// Read settings from the host store. Absent keys keep their defaults;
    /// call `validate` before serving searches.
    pub fn from_store(store: &dyn SettingsStore) -> Result<Self, ConfigError> {
        let lookup = |key: &str| store.get(key);
        let mut settings = Self::default();

        settings.endpoint = lookup(keys::URL).unwrap_or_default();
        settings.api_key = lookup(keys::API_KEY).unwrap_or_default();
        settings.index_name = lookup(keys::INDEX_NAME).unwrap_or_default();
        settings.result_format = lookup(keys::RESULT_FORMAT).unwrap_or_default();
        if let Some(list) = lookup(keys::INDEX_PROPERTIES) {
            settings.properties = parse_properties(keys::INDEX_PROPERTIES, &list)?;
        }
        if let Some(flag) = lookup(keys::HIGHLIGHT) {
            settings.highlight = parse_flag(keys::HIGHLIGHT, &flag)?;
        }
        if let Some(per_page) = lookup(keys::PER_PAGE) {
            settings.per_page = parse_number(keys::PER_PAGE, &per_page)?;
        }
        if let Some(flag) = lookup(keys::RETRACT_PRIVATE) {
            settings.retract_private = parse_flag(keys::RETRACT_PRIVATE, &flag)?;
        }

        debug!(index_name = %settings.index_name, "Loaded settings from store");
        Ok(settings)
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an environment-style lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        settings.endpoint = lookup(env_vars::URL).unwrap_or_default();
        settings.api_key = lookup(env_vars::API_KEY).unwrap_or_default();
        settings.index_name = lookup(env_vars::INDEX_NAME).unwrap_or_default();
        settings.result_format = lookup(env_vars::RESULT_FORMAT).unwrap_or_default();
        if let Some(list) = lookup(env_vars::INDEX_PROPERTIES) {
            settings.properties = parse_properties(env_vars::INDEX_PROPERTIES, &list)?;
        }
        if let Some(flag) = lookup(env_vars::HIGHLIGHT) {
            settings.highlight = parse_flag(env_vars::HIGHLIGHT, &flag)?;
        }
        if let Some(per_page) = lookup(env_vars::PER_PAGE) {
            settings.per_page = parse_number(env_vars::PER_PAGE, &per_page)?;
        }
        if let Some(flag) = lookup(env_vars::RETRACT_PRIVATE) {
            settings.retract_private = parse_flag(env_vars::RETRACT_PRIVATE, &flag)?;
        }
        if let Some(size) = lookup(env_vars::BATCH_SIZE) {
            settings.batch_size = parse_number(env_vars::BATCH_SIZE, &size)?;
        }
        if let Some(secs) = lookup(env_vars::REQUEST_TIMEOUT_SECS) {
            settings.request_timeout =
                Duration::from_secs(parse_number(env_vars::REQUEST_TIMEOUT_SECS, &secs)?);
        }

        Ok(settings)
    }

    /// Check that the engine can be addressed: endpoint, API key and index
    /// name must be set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (keys::URL, &self.endpoint),
            (keys::API_KEY, &self.api_key),
            (keys::INDEX_NAME, &self.index_name),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::missing(key));
            }
        }
        Ok(())
    }

    /// Write the store-backed settings back to the host store.
    pub fn save(&self, store: &dyn SettingsStore) {
        let properties: Vec<&str> = self.properties.iter().map(|p| p.term()).collect();

        store.set(keys::URL, &self.endpoint);
        store.set(keys::API_KEY, &self.api_key);
        store.set(keys::INDEX_NAME, &self.index_name);
        store.set(keys::INDEX_PROPERTIES, &properties.join(","));
        store.set(keys::RESULT_FORMAT, &self.result_format);
        store.set(keys::HIGHLIGHT, if self.highlight { "1" } else { "0" });
        store.set(keys::PER_PAGE, &self.per_page.to_string());
        store.set(keys::RETRACT_PRIVATE, if self.retract_private { "1" } else { "0" });
    }

    /// Connection settings for the Typesense client.
    pub fn client_config(&self) -> Result<TypesenseConfig, ConfigError> {
        self.validate()?;
        let config = TypesenseConfig::new(self.endpoint.trim(), self.api_key.clone())
            .map_err(|e| ConfigError::invalid(keys::URL, e.to_string()))?;
        Ok(config.with_request_timeout(self.request_timeout))
    }
}

fn parse_properties(key: &str, list: &str) -> Result<Vec<IndexedProperty>, ConfigError> {
    IndexedProperty::parse_list(list).map_err(|e| ConfigError::invalid(key, e.to_string()))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(key, format!("not a flag: {}", other))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::invalid(key, format!("{}: {}", value, e)))
}
