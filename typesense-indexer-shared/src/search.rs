//! Search request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;

/// Infix matching mode for a queried field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfixMode {
    Off,
    Always,
    /// Use infix matching only when exact and prefix matching find nothing.
    Fallback,
}

impl InfixMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfixMode::Off => "off",
            InfixMode::Always => "always",
            InfixMode::Fallback => "fallback",
        }
    }
}

/// A weighted multi-field search request.
///
/// `query_by`, `query_by_weights` and `infix` are parallel sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query_text: String,
    pub query_by: Vec<String>,
    pub query_by_weights: Vec<u32>,
    pub page: u32,
    pub per_page: u32,
    pub infix: Vec<InfixMode>,
    pub highlight_fields: Vec<String>,
}

impl SearchRequest {
    /// Whether the parallel sequences line up.
    pub fn is_consistent(&self) -> bool {
        self.query_by.len() == self.query_by_weights.len()
            && (self.infix.is_empty() || self.infix.len() == self.query_by.len())
    }
}

/// A highlight fragment returned by the engine for one field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Highlight {
    pub field: String,
    /// Snippet of a single-valued match.
    #[serde(default)]
    pub snippet: Option<String>,
    /// Snippets of a multi-valued (array) field match.
    #[serde(default)]
    pub snippets: Vec<String>,
}

impl Highlight {
    /// The display text of this highlight: the snippet, or else the first
    /// entry of the snippet list.
    pub fn text(&self) -> Option<&str> {
        self.snippet
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.snippets.first().map(|s| s.as_str()))
            .filter(|s| !s.is_empty())
    }
}

/// One raw hit: the matched document (if the engine returned one) and its
/// highlight fragments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchHit {
    pub document: Option<Document>,
    pub highlights: Vec<Highlight>,
}

/// Parsed engine response plus the raw payload it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub found: u64,
    pub hits: Vec<SearchHit>,
    pub raw: Value,
}

impl SearchResponse {
    /// A response with no hits and a null raw payload.
    pub fn empty() -> Self {
        Self {
            found: 0,
            hits: Vec::new(),
            raw: Value::Null,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
