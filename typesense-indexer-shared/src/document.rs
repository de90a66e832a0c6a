//! Search documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One searchable record, keyed by a stable resource identifier.
///
/// A document built for a schema always carries every configured field,
/// empty fields included, so that the engine sees a uniform shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub resource_id: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Vec<String>>,
}

impl Document {
    /// Create a document with no fields.
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Create a document with one empty sequence per field name.
    pub fn with_fields<I, S>(resource_id: impl Into<String>, field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = field_names
            .into_iter()
            .map(|name| (name.into(), Vec::new()))
            .collect();
        Self {
            resource_id: resource_id.into(),
            fields,
        }
    }

    /// Append a value to a known field. Returns `false` if the field is not
    /// part of this document.
    pub fn push_value(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(field) {
            Some(values) => {
                values.push(value.into());
                true
            }
            None => false,
        }
    }

    /// All values of a field.
    pub fn values(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(|v| v.as_slice())
    }

    /// First value of a field, if present and non-empty.
    pub fn first_value(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|values| values.first())
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Field names other than `resource_id`.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }
}
