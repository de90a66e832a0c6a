//! Result display templates.
//!
//! A template such as `"{dcterms:title} ({dcterms:issued})"` contains
//! bracket tokens naming properties. Each token maps to a field name by
//! replacing `:` with `_`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::property::normalize_field_name;

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("token pattern is valid"));

/// A bracket token parsed from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatToken {
    /// Token text as written, e.g. `dcterms:title`.
    pub term: String,
    /// Normalized field name, e.g. `dcterms_title`.
    pub field: String,
}

/// A parsed display template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultFormat {
    template: String,
    tokens: Vec<FormatToken>,
}

impl ResultFormat {
    /// Parse a template, extracting its bracket tokens in order of appearance.
    pub fn parse(template: impl Into<String>) -> Self {
        let template = template.into();
        let tokens = TOKEN_REGEX
            .captures_iter(&template)
            .map(|caps| {
                let term = caps[1].trim().to_string();
                FormatToken {
                    field: normalize_field_name(&term),
                    term,
                }
            })
            .collect();
        Self { template, tokens }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn tokens(&self) -> &[FormatToken] {
        &self.tokens
    }

    /// Whether the template contains at least one token.
    pub fn has_tokens(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Substitute every token with the value returned by `lookup` for its
    /// field name, or with an empty string when `lookup` returns `None`.
    pub fn render<'a, F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        TOKEN_REGEX
            .replace_all(&self.template, |caps: &Captures| {
                let field = normalize_field_name(caps[1].trim());
                lookup(&field).unwrap_or_default().to_string()
            })
            .into_owned()
    }
}
