//! Document mapper implementation.
//!
//! Converts one item's flattened property/value pairs into a `Document`
//! carrying exactly the configured fields.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::extractor::{ItemBatch, RawItemRow};
use typesense_indexer_shared::{
    indexed_field_names, normalize_field_name, Document, IndexedProperty,
};

/// One property value of an item, e.g. `("dcterms:title", "Moby Dick")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub property: String,
    pub value: String,
}

impl PropertyValue {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Mapper from property/value pairs to documents.
///
/// Values of properties that are not configured are dropped silently. Every
/// configured field is present in the output, empty or not.
#[derive(Debug, Clone)]
pub struct DocumentMapper {
    field_names: Vec<String>,
    known: HashSet<String>,
}

impl DocumentMapper {
    /// Create a mapper for the configured properties, in order.
    pub fn new(properties: &[IndexedProperty]) -> Self {
        let field_names = indexed_field_names(properties);
        let known = field_names.iter().cloned().collect();
        Self { field_names, known }
    }

    /// Field names of the produced documents, excluding `resource_id`.
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Map pairs of `(property term, value)` into a document.
    pub fn map<'a, I>(&self, resource_id: impl Into<String>, pairs: I) -> Document
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut document = Document::with_fields(resource_id, self.field_names.iter().cloned());

        for (property, value) in pairs {
            let field = normalize_field_name(property);
            if self.known.contains(&field) {
                document.push_value(&field, value);
            }
        }

        document
    }

    /// Map an item's property values.
    pub fn map_values(&self, resource_id: impl Into<String>, values: &[PropertyValue]) -> Document {
        self.map(
            resource_id,
            values
                .iter()
                .map(|pv| (pv.property.as_str(), pv.value.as_str())),
        )
    }

    /// Map an extracted row.
    pub fn map_row(&self, row: &RawItemRow) -> Document {
        self.map(row.resource_id.to_string(), row.pairs())
    }

    /// Map every row of a batch, preserving row order.
    #[instrument(skip(self, batch), fields(offset = batch.offset, count = batch.len()))]
    pub fn map_batch(&self, batch: &ItemBatch) -> Vec<Document> {
        let documents: Vec<Document> = batch.rows.iter().map(|row| self.map_row(row)).collect();
        debug!(document_count = documents.len(), "Mapped item batch");
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties(terms: &[&str]) -> Vec<IndexedProperty> {
        terms
            .iter()
            .map(|t| IndexedProperty::new(*t).unwrap())
            .collect()
    }

    #[test]
    fn test_map_keeps_configured_fields_only() {
        let mapper = DocumentMapper::new(&properties(&["dcterms:title", "dcterms:creator"]));

        let doc = mapper.map(
            "42",
            vec![
                ("dcterms:title", "Moby Dick"),
                ("dcterms:subject", "Whales"),
                ("dcterms:creator", "Melville"),
            ],
        );

        assert_eq!(doc.resource_id, "42");
        assert_eq!(
            doc.field_names().collect::<Vec<_>>(),
            vec!["dcterms_creator", "dcterms_title"]
        );
        assert_eq!(doc.first_value("dcterms_title"), Some("Moby Dick"));
        assert!(doc.values("dcterms_subject").is_none());
    }

    #[test]
    fn test_map_includes_empty_fields() {
        let mapper = DocumentMapper::new(&properties(&["dcterms:title", "dcterms:abstract"]));

        let doc = mapper.map("1", vec![("dcterms:title", "Foo")]);

        assert_eq!(doc.values("dcterms_abstract"), Some(&[][..]));
    }

    #[test]
    fn test_map_preserves_value_order() {
        let mapper = DocumentMapper::new(&properties(&["dcterms:subject"]));

        let doc = mapper.map(
            "1",
            vec![("dcterms:subject", "Whales"), ("dcterms:subject", "Sea")],
        );

        assert_eq!(
            doc.values("dcterms_subject").unwrap(),
            &["Whales".to_string(), "Sea".to_string()]
        );
    }

    #[test]
    fn test_map_accepts_normalized_terms() {
        let mapper = DocumentMapper::new(&properties(&["dcterms:title"]));
        let doc = mapper.map("1", vec![("dcterms_title", "Foo")]);
        assert_eq!(doc.first_value("dcterms_title"), Some("Foo"));
    }

    #[test]
    fn test_map_without_properties() {
        let mapper = DocumentMapper::new(&[]);
        let doc = mapper.map("1", vec![("dcterms:title", "Foo")]);
        assert_eq!(doc.field_names().count(), 0);
    }

    #[test]
    fn test_map_row() {
        let mapper = DocumentMapper::new(&properties(&["dcterms:title", "dcterms:creator"]));
        let row = RawItemRow::from_pairs(7, [("dcterms:title", "Foo"), ("dcterms:creator", "Bar")]);

        let doc = mapper.map_row(&row);

        assert_eq!(doc.resource_id, "7");
        assert_eq!(doc.first_value("dcterms_creator"), Some("Bar"));
    }

    #[test]
    fn test_map_values() {
        let mapper = DocumentMapper::new(&properties(&["dcterms:title"]));
        let doc = mapper.map_values("3", &[PropertyValue::new("dcterms:title", "Foo")]);
        assert_eq!(doc.first_value("dcterms_title"), Some("Foo"));
    }

    #[test]
    fn test_map_batch() {
        let mapper = DocumentMapper::new(&properties(&["dcterms:title"]));
        let batch = ItemBatch {
            offset: 0,
            rows: vec![
                RawItemRow::from_pairs(1, [("dcterms:title", "One")]),
                RawItemRow::from_pairs(2, [("dcterms:title", "Two")]),
            ],
        };

        let docs = mapper.map_batch(&batch);

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].resource_id, "2");
    }
}
