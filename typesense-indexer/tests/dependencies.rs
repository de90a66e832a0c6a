//! Start-up wiring against a mock Typesense node.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use typesense_indexer::{Dependencies, IndexingError};
use typesense_indexer_pipeline::SearchSettings;
use typesense_indexer_shared::IndexedProperty;

fn settings(endpoint: &str) -> SearchSettings {
    SearchSettings {
        endpoint: endpoint.to_string(),
        api_key: "xyz".to_string(),
        index_name: "items".to_string(),
        properties: IndexedProperty::parse_list("dcterms:title").unwrap(),
        ..SearchSettings::default()
    }
}

async fn node(ok: bool) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": ok })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_wiring_with_healthy_node() {
    let server = node(true).await;

    let dependencies = Dependencies::from_settings(settings(&server.uri()), None)
        .await
        .unwrap();

    assert_eq!(dependencies.search.index_name(), "items");
    assert_eq!(dependencies.sync_handler().collection(), "items");
}

#[tokio::test]
async fn test_unhealthy_node_is_rejected() {
    let server = node(false).await;

    let result = Dependencies::from_settings(settings(&server.uri()), None).await;

    assert!(matches!(result, Err(IndexingError::ConfigError(_))));
}

#[tokio::test]
async fn test_missing_settings_are_rejected() {
    let mut settings = settings("http://localhost:8108");
    settings.api_key.clear();

    let result = Dependencies::from_settings(settings, None).await;

    assert!(matches!(result, Err(IndexingError::PipelineError(_))));
}

#[tokio::test]
async fn test_job_runner_requires_database_url() {
    let server = node(true).await;
    let dependencies = Dependencies::from_settings(settings(&server.uri()), Some(" ".to_string()))
        .await
        .unwrap();

    assert!(matches!(
        dependencies.job_runner(),
        Err(IndexingError::ConfigError(_))
    ));
}
