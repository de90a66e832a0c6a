//! Weighted multi-field query planning.

use tracing::warn;

use typesense_indexer_shared::{
    indexed_field_names, IndexedProperty, InfixMode, SchemaBuilder, SearchRequest, TITLE_FIELD,
};

/// Results per page of the default search profile.
pub const DEFAULT_PER_PAGE: u32 = 15;

/// A query that would browse the whole collection. It is never sent.
pub const WILDCARD_QUERY: &str = "*";

/// Builds search requests from the configured properties.
///
/// The i-th of `n` configured fields is weighted `n - i`, so earlier
/// properties rank higher. Fields marked infix-searchable by the schema
/// builder are queried with `infix=fallback`, the others with `off`.
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    query_by: Vec<String>,
    infix: Vec<InfixMode>,
    per_page: u32,
    highlight_fields: Vec<String>,
}

impl QueryPlanner {
    pub fn new(properties: &[IndexedProperty]) -> Self {
        Self::with_schema_builder(properties, &SchemaBuilder::default())
    }

    /// Plan against the infix fields of a custom schema builder.
    pub fn with_schema_builder(properties: &[IndexedProperty], schema_builder: &SchemaBuilder) -> Self {
        let query_by = indexed_field_names(properties);
        let infix = query_by
            .iter()
            .map(|field| {
                if schema_builder.is_infix(field) {
                    InfixMode::Fallback
                } else {
                    InfixMode::Off
                }
            })
            .collect();
        // Typesense rejects highlight fields missing from the schema.
        let highlight_fields = query_by
            .iter()
            .filter(|field| field.as_str() == TITLE_FIELD)
            .cloned()
            .collect();

        Self {
            query_by,
            infix,
            per_page: DEFAULT_PER_PAGE,
            highlight_fields,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn query_by(&self) -> &[String] {
        &self.query_by
    }

    /// Weights parallel to `query_by`, descending from the field count to 1.
    pub fn weights(&self) -> Vec<u32> {
        let count = self.query_by.len();
        (0..count).map(|i| (count - i) as u32).collect()
    }

    /// Build the request for a raw query string.
    ///
    /// Returns `None` for the wildcard query, and when no field is
    /// configured to search in.
    pub fn plan(&self, query: &str) -> Option<SearchRequest> {
        let query = query.trim();
        if query == WILDCARD_QUERY {
            return None;
        }
        if self.query_by.is_empty() {
            warn!("No indexed properties configured, nothing to search");
            return None;
        }

        Some(SearchRequest {
            query_text: query.to_string(),
            query_by: self.query_by.clone(),
            query_by_weights: self.weights(),
            page: 1,
            per_page: self.per_page,
            infix: self.infix.clone(),
            highlight_fields: self.highlight_fields.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(list: &str) -> QueryPlanner {
        QueryPlanner::new(&IndexedProperty::parse_list(list).unwrap())
    }

    #[test]
    fn test_weights_descend_in_configured_order() {
        let planner = planner("dcterms:title dcterms:alternative dcterms:creator dcterms:subject");

        let request = planner.plan("whale").unwrap();

        assert_eq!(
            request.query_by,
            vec!["dcterms_title", "dcterms_alternative", "dcterms_creator", "dcterms_subject"]
        );
        assert_eq!(request.query_by_weights, vec![4, 3, 2, 1]);
        assert!(request.is_consistent());
    }

    #[test]
    fn test_default_profile() {
        let request = planner("dcterms:title,dcterms:creator").plan("moby").unwrap();

        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, DEFAULT_PER_PAGE);
        assert_eq!(request.infix, vec![InfixMode::Fallback, InfixMode::Off]);
        assert_eq!(request.highlight_fields, vec![TITLE_FIELD]);
    }

    #[test]
    fn test_title_highlighted_only_when_indexed() {
        let request = planner("dcterms:creator,dcterms:subject").plan("melville").unwrap();

        assert!(request.highlight_fields.is_empty());
        assert!(request.is_consistent());
    }

    #[test]
    fn test_wildcard_is_not_planned() {
        let planner = planner("dcterms:title");
        assert!(planner.plan("*").is_none());
        assert!(planner.plan("  *  ").is_none());
        assert!(planner.plan("*a").is_some());
    }

    #[test]
    fn test_no_fields() {
        assert!(QueryPlanner::new(&[]).plan("moby").is_none());
    }

    #[test]
    fn test_custom_infix_fields_and_per_page() {
        let properties = IndexedProperty::parse_list("dcterms:title,dcterms:creator").unwrap();
        let builder = SchemaBuilder::new().with_infix_fields(Vec::<String>::new());

        let request = QueryPlanner::with_schema_builder(&properties, &builder)
            .with_per_page(50)
            .plan("moby")
            .unwrap();

        assert_eq!(request.infix, vec![InfixMode::Off, InfixMode::Off]);
        assert_eq!(request.per_page, 50);
    }
}
