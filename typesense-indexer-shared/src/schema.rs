//! Collection schema derived from the configured property list.

use serde::{Deserialize, Serialize};

use crate::property::{indexed_field_names, IndexedProperty};

/// Field holding the stable external identifier of an item.
pub const RESOURCE_ID_FIELD: &str = "resource_id";

/// Primary title field, used for highlighting and as the display fallback.
pub const TITLE_FIELD: &str = "dcterms_title";

/// Alternative title field.
pub const ALTERNATIVE_TITLE_FIELD: &str = "dcterms_alternative";

/// Token separators applied to every collection.
pub const DEFAULT_TOKEN_SEPARATORS: &[&str] = &["-"];

/// Engine field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "string[]")]
    StringArray,
    /// Any type this crate never creates but may read back from the engine.
    #[serde(other)]
    Other,
}

fn default_true() -> bool {
    true
}

/// A single field of a collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default = "default_true")]
    pub index: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub infix: bool,
}

impl SchemaField {
    /// The fixed `resource_id` field: string, indexed, optional.
    pub fn resource_id() -> Self {
        Self {
            name: RESOURCE_ID_FIELD.to_string(),
            field_type: FieldType::String,
            index: true,
            optional: true,
            infix: false,
        }
    }

    /// A multi-valued string field for an indexed property.
    pub fn string_array(name: impl Into<String>, infix: bool) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::StringArray,
            index: true,
            optional: false,
            infix,
        }
    }
}

/// A named collection definition as sent to (and read back from) the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub fields: Vec<SchemaField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub token_separators: Vec<String>,
}

impl CollectionSchema {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in schema order, including `resource_id`.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Derives a collection schema from an ordered property list.
///
/// Every property becomes one `string[]` field named after the normalized
/// term, in configured order, after the fixed `resource_id` field. Fields
/// listed as infix fields (by default the title and the alternative title)
/// are marked infix-searchable independently of each other.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    infix_fields: Vec<String>,
    token_separators: Vec<String>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self {
            infix_fields: vec![TITLE_FIELD.to_string(), ALTERNATIVE_TITLE_FIELD.to_string()],
            token_separators: DEFAULT_TOKEN_SEPARATORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of infix-searchable fields. An empty set disables infix.
    pub fn with_infix_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.infix_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the token separators sent with the collection.
    pub fn with_token_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.token_separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a field name is infix-searchable under this builder.
    pub fn is_infix(&self, field_name: &str) -> bool {
        self.infix_fields.iter().any(|f| f == field_name)
    }

    /// Schema fields for the given properties, `resource_id` first.
    pub fn fields(&self, properties: &[IndexedProperty]) -> Vec<SchemaField> {
        let mut fields = Vec::with_capacity(properties.len() + 1);
        fields.push(SchemaField::resource_id());
        for name in indexed_field_names(properties) {
            let infix = self.is_infix(&name);
            fields.push(SchemaField::string_array(name, infix));
        }
        fields
    }

    /// Full collection definition under the given name.
    pub fn build(&self, name: &str, properties: &[IndexedProperty]) -> CollectionSchema {
        CollectionSchema {
            name: name.to_string(),
            fields: self.fields(properties),
            token_separators: self.token_separators.clone(),
        }
    }
}
