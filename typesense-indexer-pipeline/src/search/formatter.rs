//! Conversion of raw hits into display results.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::links::LinkBuilder;
use typesense_indexer_shared::{Document, ResultFormat, SearchHit, TITLE_FIELD};

/// Engine highlight markup and its caller-facing replacement.
pub const HIGHLIGHT_TAGS: [(&str, &str); 2] = [("<mark>", "<b>"), ("</mark>", "</b>")];

/// One formatted result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayResult {
    pub url: String,
    pub text: String,
}

/// Formats hits either from engine highlights or from a bracket-token
/// template.
///
/// Missing documents and missing fields produce empty text, never an error.
#[derive(Clone)]
pub struct ResultFormatter {
    format: ResultFormat,
    highlight: bool,
    links: Arc<dyn LinkBuilder>,
}

impl ResultFormatter {
    pub fn new(format: ResultFormat, highlight: bool, links: Arc<dyn LinkBuilder>) -> Self {
        Self {
            format,
            highlight,
            links,
        }
    }

    /// Format hits in order, one result per hit.
    pub fn format(&self, hits: &[SearchHit]) -> Vec<DisplayResult> {
        let results: Vec<DisplayResult> = hits.iter().map(|hit| self.format_hit(hit)).collect();
        debug!(count = results.len(), highlight = self.highlight, "Formatted hits");
        results
    }

    pub fn format_hit(&self, hit: &SearchHit) -> DisplayResult {
        let Some(document) = hit.document.as_ref() else {
            return DisplayResult::default();
        };

        let highlighted = if self.highlight {
            hit.highlights.first().and_then(|h| h.text())
        } else {
            None
        };

        let text = match highlighted {
            Some(snippet) => snippet.to_string(),
            None => self.render(document),
        };

        DisplayResult {
            url: self.links.item_url(&document.resource_id),
            text: replace_highlight_tags(&text),
        }
    }

    fn render(&self, document: &Document) -> String {
        if self.format.has_tokens() {
            self.format.render(|field| document.first_value(field))
        } else {
            document.first_value(TITLE_FIELD).unwrap_or_default().to_string()
        }
    }
}

fn replace_highlight_tags(text: &str) -> String {
    HIGHLIGHT_TAGS
        .iter()
        .fold(text.to_string(), |text, (from, to)| text.replace(from, to))
}
