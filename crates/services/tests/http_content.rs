use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::QuestionSetKey;
use services::config::parse_base_url;
use services::{ContentCache, ContentError, ContentFailure, HttpContentSource};
use storage::content::ContentSource;
use storage::repository::StorageError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &str = r#"{
    "category": "rust",
    "questions": [
        { "id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": 0, "explanation": "" }
    ]
}"#;

async fn source_for(server: &MockServer) -> HttpContentSource {
    let base = parse_base_url(&format!("{}/static", server.uri())).unwrap();
    HttpContentSource::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn cache_fetches_once_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/static/quizzes/rust.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
        .expect(1)
        .mount(&server)
        .await;

    let cache = ContentCache::new(Arc::new(source_for(&server).await));
    let key = QuestionSetKey::category("rust");

    let first = cache.load(&key).await.unwrap();
    let second = cache.load(&key).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn missing_document_is_not_found() {
    let server = MockServer::start().await;
    let source = source_for(&server).await;

    let err = source.fetch("quizzes/absent.json").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn server_error_is_content_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/static/quizzes/rust.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let cache = ContentCache::new(Arc::new(source_for(&server).await));
    let err = cache
        .load(&QuestionSetKey::category("rust"))
        .await
        .unwrap_err();

    let ContentError::Unavailable { key, cause } = err else {
        panic!("unexpected error kind");
    };
    assert_eq!(key, "rust");
    assert!(matches!(
        cause,
        ContentFailure::Transport(StorageError::Connection(_))
    ));
}
