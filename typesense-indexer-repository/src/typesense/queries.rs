//! Typesense search parameter builders.

use typesense_indexer_shared::SearchRequest;

/// Build the query-string parameters for a search request.
///
/// Parallel sequences are rendered as comma separated lists, which is how
/// Typesense expects `query_by`, `query_by_weights` and per-field `infix`.
pub fn search_params(request: &SearchRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("q", request.query_text.clone()),
        ("query_by", request.query_by.join(",")),
    ];

    if !request.query_by_weights.is_empty() {
        let weights: Vec<String> = request
            .query_by_weights
            .iter()
            .map(|w| w.to_string())
            .collect();
        params.push(("query_by_weights", weights.join(",")));
    }

    params.push(("page", request.page.to_string()));
    params.push(("per_page", request.per_page.to_string()));

    if !request.infix.is_empty() {
        let modes: Vec<&str> = request.infix.iter().map(|m| m.as_str()).collect();
        params.push(("infix", modes.join(",")));
    }

    if !request.highlight_fields.is_empty() {
        let fields = request.highlight_fields.join(",");
        params.push(("highlight_fields", fields.clone()));
        params.push(("highlight_full_fields", fields));
    }

    params
}
