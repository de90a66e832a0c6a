//! HTTP-level tests of the Typesense client against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use typesense_indexer_repository::{
    ImportAction, SearchEngineClient, SearchError, TypesenseClient, TypesenseConfig,
};
use typesense_indexer_shared::{Document, IndexedProperty, InfixMode, SchemaBuilder, SearchRequest};

const API_KEY: &str = "test-key";

fn client_for(server: &MockServer) -> TypesenseClient {
    let config = TypesenseConfig::new(&server.uri(), API_KEY)
        .unwrap()
        .with_request_timeout(Duration::from_millis(500));
    TypesenseClient::new(config).unwrap()
}

fn title_doc(id: &str, title: &str) -> Document {
    let mut doc = Document::with_fields(id, ["dcterms_title"]);
    doc.push_value("dcterms_title", title);
    doc
}

#[tokio::test]
async fn test_create_collection_posts_schema() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections"))
        .and(header("X-TYPESENSE-API-KEY", API_KEY))
        .and(body_string_contains("\"token_separators\":[\"-\"]"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "name": "items" })))
        .expect(1)
        .mount(&server)
        .await;

    let properties = vec![IndexedProperty::new("dcterms:title").unwrap()];
    let schema = SchemaBuilder::new().build("items", &properties);

    client_for(&server).create_collection(&schema).await.unwrap();
}

#[tokio::test]
async fn test_create_collection_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(json!({ "message": "A collection with name `items` already exists." })),
        )
        .mount(&server)
        .await;

    let schema = SchemaBuilder::new().build("items", &[]);
    let result = client_for(&server).create_collection(&schema).await;

    assert!(matches!(result, Err(SearchError::Conflict(msg)) if msg.contains("already exists")));
}

#[tokio::test]
async fn test_retrieve_missing_collection_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/items"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let result = client_for(&server).retrieve_collection("items").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_retrieve_existing_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "items",
            "num_documents": 3,
            "fields": [
                { "name": "resource_id", "type": "string", "index": true, "optional": true },
                { "name": "dcterms_title", "type": "string[]", "infix": true }
            ]
        })))
        .mount(&server)
        .await;

    let schema = client_for(&server)
        .retrieve_collection("items")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(schema.name, "items");
    assert_eq!(schema.field_names(), vec!["resource_id", "dcterms_title"]);
}

#[tokio::test]
async fn test_delete_collection_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/collections/items"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let result = client_for(&server).delete_collection("items").await;
    assert!(matches!(result, Err(SearchError::NotFound(_))));
}

#[tokio::test]
async fn test_upsert_document_sends_engine_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/items/documents"))
        .and(query_param("action", "upsert"))
        .and(body_string_contains("\"id\":\"42\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "42" })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .upsert_document("items", &title_doc("42", "Foo"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_documents_by_filter() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/collections/items/documents"))
        .and(query_param("filter_by", "resource_id:42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "num_deleted": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let deleted = client_for(&server)
        .delete_documents("items", "resource_id:42")
        .await
        .unwrap();
    assert_eq!(deleted, 1);
}

#[tokio::test]
async fn test_import_documents_parses_per_document_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collections/items/documents/import"))
        .and(query_param("action", "create"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "{\"success\":true}\n{\"success\":false,\"error\":\"A document with id 2 already exists.\"}",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let docs = vec![title_doc("1", "One"), title_doc("2", "Two")];
    let results = client_for(&server)
        .import_documents("items", &docs, ImportAction::Create)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].success);
    assert!(!results[1].success);
}

#[tokio::test]
async fn test_import_empty_batch_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let results = client_for(&server)
        .import_documents("items", &[], ImportAction::Create)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_search_sends_weighted_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/items/documents/search"))
        .and(query_param("q", "moby dick"))
        .and(query_param("query_by", "dcterms_title,dcterms_creator"))
        .and(query_param("query_by_weights", "2,1"))
        .and(query_param("infix", "fallback,off"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "found": 1,
            "hits": [{
                "document": { "id": "7", "resource_id": "7", "dcterms_title": ["Moby Dick"] },
                "highlights": [{ "field": "dcterms_title", "snippets": ["<mark>Moby</mark> Dick"] }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = SearchRequest {
        query_text: "moby dick".to_string(),
        query_by: vec!["dcterms_title".to_string(), "dcterms_creator".to_string()],
        query_by_weights: vec![2, 1],
        page: 1,
        per_page: 15,
        infix: vec![InfixMode::Fallback, InfixMode::Off],
        highlight_fields: vec!["dcterms_title".to_string()],
    };

    let response = client_for(&server).search("items", &request).await.unwrap();

    assert_eq!(response.found, 1);
    let hit = &response.hits[0];
    assert_eq!(hit.document.as_ref().unwrap().first_value("dcterms_title"), Some("Moby Dick"));
    assert_eq!(hit.highlights[0].text(), Some("<mark>Moby</mark> Dick"));
    assert_eq!(response.raw["found"], 1);
}

#[tokio::test]
async fn test_search_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/items/documents/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let request = SearchRequest {
        query_text: "x".to_string(),
        query_by: vec!["dcterms_title".to_string()],
        query_by_weights: vec![1],
        page: 1,
        per_page: 15,
        infix: vec![],
        highlight_fields: vec![],
    };
    let result = client_for(&server).search("items", &request).await;

    match result {
        Err(err) => assert!(err.is_unavailable()),
        Ok(_) => panic!("expected an error"),
    }
}

#[tokio::test]
async fn test_request_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).health_check().await;
    assert!(matches!(result, Err(SearchError::Timeout(_))));
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    assert!(client_for(&server).health_check().await.unwrap());
}
