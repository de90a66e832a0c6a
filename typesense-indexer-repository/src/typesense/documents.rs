//! Conversion between documents and the Typesense wire format.

use serde_json::{Map, Value};

use crate::errors::SearchError;
use crate::types::ImportResult;
use typesense_indexer_shared::{Document, Highlight, SearchHit, SearchResponse, RESOURCE_ID_FIELD};

/// Field Typesense uses as the document key.
const ENGINE_ID_FIELD: &str = "id";

/// Serialize a document for the engine, adding the engine `id` key so that
/// writes are keyed by the resource id.
pub(crate) fn document_body(document: &Document) -> Result<Value, SearchError> {
    let mut value = serde_json::to_value(document)?;
    if let Value::Object(ref mut map) = value {
        map.insert(
            ENGINE_ID_FIELD.to_string(),
            Value::String(document.resource_id.clone()),
        );
    }
    Ok(value)
}

/// Encode documents as the JSON-lines body of an import request.
pub fn encode_import_body(documents: &[Document]) -> Result<String, SearchError> {
    let mut lines = Vec::with_capacity(documents.len());
    for document in documents {
        lines.push(serde_json::to_string(&document_body(document)?)?);
    }
    Ok(lines.join("\n"))
}

/// Parse the JSON-lines body of an import response, one result per line.
pub fn parse_import_response(body: &str) -> Result<Vec<ImportResult>, SearchError> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str::<ImportResult>(line)
                .map_err(|e| SearchError::parse(format!("Invalid import result {:?}: {}", line, e)))
        })
        .collect()
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Build a document from a hit's `document` object.
///
/// The resource id is read from `resource_id`, falling back to the engine
/// `id`. Array fields become value sequences, scalar fields become a single
/// value, anything else is skipped. Returns `None` if the value is not an
/// object or carries no identifier.
pub fn parse_document(value: &Value) -> Option<Document> {
    let map = value.as_object()?;
    let resource_id = map
        .get(RESOURCE_ID_FIELD)
        .and_then(value_as_string)
        .or_else(|| map.get(ENGINE_ID_FIELD).and_then(value_as_string))?;

    let mut document = Document::new(resource_id);
    for (key, value) in map {
        if key == RESOURCE_ID_FIELD || key == ENGINE_ID_FIELD {
            continue;
        }
        let values = match value {
            Value::Array(items) => items.iter().filter_map(value_as_string).collect(),
            other => match value_as_string(other) {
                Some(s) => vec![s],
                None => continue,
            },
        };
        document.fields.insert(key.clone(), values);
    }
    Some(document)
}

fn parse_hit(hit: &Map<String, Value>) -> SearchHit {
    let document = hit.get("document").and_then(parse_document);
    let highlights = hit
        .get("highlights")
        .and_then(|h| h.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<Highlight>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    SearchHit {
        document,
        highlights,
    }
}

/// Parse a search response body, keeping the raw payload.
pub(crate) fn parse_search_response(raw: Value) -> Result<SearchResponse, SearchError> {
    let body = raw
        .as_object()
        .ok_or_else(|| SearchError::parse("Search response is not an object"))?;
    let found = body.get("found").and_then(|f| f.as_u64()).unwrap_or(0);
    let hits = body
        .get("hits")
        .and_then(|h| h.as_array())
        .map(|hits| hits.iter().filter_map(|h| h.as_object()).map(parse_hit).collect())
        .unwrap_or_default();

    Ok(SearchResponse { found, hits, raw })
}
