//! Request and response types for document import operations.

use serde::{Deserialize, Serialize};

/// How imported documents are written when an identifier already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportAction {
    /// Fail the document if it already exists.
    Create,
    /// Create or replace.
    Upsert,
    /// Replace fields of an existing document.
    Update,
    /// Create, or merge fields into an existing document.
    Emplace,
}

impl ImportAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportAction::Create => "create",
            ImportAction::Upsert => "upsert",
            ImportAction::Update => "update",
            ImportAction::Emplace => "emplace",
        }
    }
}

/// Outcome of importing a single document.
///
/// The engine answers a bulk import with one result per submitted document,
/// in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportResult {
    /// Whether the document was written.
    pub success: bool,
    /// Error message if the document was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The rejected document as echoed back by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// Summary of an import batch containing aggregate statistics and individual results.
///
/// A bulk import can partially fail; callers decide what to do with the
/// rejected documents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Total number of documents in the batch.
    pub total: usize,
    /// Number of documents written.
    pub succeeded: usize,
    /// Number of documents rejected.
    pub failed: usize,
    /// Individual results for each document.
    pub results: Vec<ImportResult>,
}

impl ImportSummary {
    /// Aggregate per-document results.
    pub fn from_results(results: Vec<ImportResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Error messages of the rejected documents.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .filter_map(|r| r.error.as_deref())
    }
}
