//! Indexed property identifiers.
//!
//! A property is a vocabulary-qualified term such as `dcterms:title`. The
//! search engine does not accept `:` in field names, so every property maps
//! to a field name with the separator replaced by `_`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::RESOURCE_ID_FIELD;

/// Separator between vocabulary prefix and local name in a term.
pub const TERM_SEPARATOR: char = ':';

/// Separator used in engine field names.
pub const FIELD_SEPARATOR: char = '_';

/// Errors raised when parsing a property identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The identifier was empty or only whitespace.
    #[error("Property identifier is empty")]
    Empty,

    /// The identifier contains characters that cannot appear in a term.
    #[error("Invalid property identifier: {0}")]
    Invalid(String),
}

/// A qualified attribute identifier, e.g. `dcterms:title`.
///
/// The order of a configured list of properties matters: earlier properties
/// get a higher query weight and come first in the collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndexedProperty(String);

impl IndexedProperty {
    /// Create a property from a term, validating it.
    pub fn new(term: impl Into<String>) -> Result<Self, PropertyError> {
        let term = term.into().trim().to_string();
        if term.is_empty() {
            return Err(PropertyError::Empty);
        }
        if term
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | ',' | '|'))
        {
            return Err(PropertyError::Invalid(term));
        }
        Ok(Self(term))
    }

    /// The term as configured, e.g. `dcterms:title`.
    pub fn term(&self) -> &str {
        &self.0
    }

    /// Vocabulary prefix, if the term is qualified.
    pub fn prefix(&self) -> Option<&str> {
        self.0.split_once(TERM_SEPARATOR).map(|(prefix, _)| prefix)
    }

    /// Local name within the vocabulary.
    pub fn local_name(&self) -> &str {
        self.0
            .split_once(TERM_SEPARATOR)
            .map(|(_, local)| local)
            .unwrap_or(&self.0)
    }

    /// The engine field name for this property, e.g. `dcterms_title`.
    pub fn field_name(&self) -> String {
        normalize_field_name(&self.0)
    }

    /// Parse a comma or whitespace separated list of terms, skipping blanks.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, PropertyError> {
        list.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(Self::new)
            .collect()
    }
}

impl FromStr for IndexedProperty {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for IndexedProperty {
    type Error = PropertyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IndexedProperty> for String {
    fn from(property: IndexedProperty) -> Self {
        property.0
    }
}

impl fmt::Display for IndexedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a term (or an already normalized field name) to a field name.
pub fn normalize_field_name(term: &str) -> String {
    term.trim().replace(TERM_SEPARATOR, &FIELD_SEPARATOR.to_string())
}

/// Field names for an ordered property list.
///
/// Keeps configured order, drops duplicates after normalization (first
/// occurrence wins) and never yields the reserved `resource_id` field.
pub fn indexed_field_names(properties: &[IndexedProperty]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(properties.len());
    for property in properties {
        let name = property.field_name();
        if name == RESOURCE_ID_FIELD || names.contains(&name) {
            continue;
        }
        names.push(name);
    }
    names
}
