use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use review_sentiment_api::api::{create_router, AppState};
use review_sentiment_api::classifier::Lexicon;
use review_sentiment_api::storage::ReviewStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn spawn_app() -> (Router, TempDir) {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = ReviewStore::new(tmp_dir.path().join("reviews.db"));
    store.ensure_schema().expect("Failed to create schema");

    let app = create_router(AppState::new(store, Lexicon::default()));
    (app, tmp_dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    };
    (status, body)
}

async fn submit(app: &Router, payload: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/reviews")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    send(app, request).await
}

async fn list(app: &Router, query: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/reviews{}", query))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

// ========== Submission ==========

#[tokio::test]
async fn test_submit_positive_review() {
    let (app, _tmp) = spawn_app();
    let (status, body) = submit(&app, json!({"text": "я люблю этот продукт"})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sentiment"], "positive");
    assert_eq!(body["text"], "я люблю этот продукт");
    assert!(body["id"].as_i64().unwrap() > 0);
    assert!(body["created_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_submit_negative_review() {
    let (app, _tmp) = spawn_app();
    let (status, body) = submit(&app, json!({"text": "все было плохо"})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sentiment"], "negative");
}

#[tokio::test]
async fn test_submit_neutral_review() {
    let (app, _tmp) = spawn_app();
    let (status, body) = submit(&app, json!({"text": "сойдет"})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sentiment"], "neutral");
}

#[tokio::test]
async fn test_submit_empty_text_rejected() {
    let (app, _tmp) = spawn_app();
    let (status, body) = submit(&app, json!({"text": ""})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Добавьте отзыв");

    let (_, reviews) = list(&app, "").await;
    assert_eq!(reviews, json!([]));
}

#[tokio::test]
async fn test_submit_whitespace_or_missing_text_rejected() {
    let (app, _tmp) = spawn_app();

    let (status, _) = submit(&app, json!({"text": "  \n "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = submit(&app, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = submit(&app, json!({"text": 42})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_malformed_json_rejected() {
    let (app, _tmp) = spawn_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/reviews")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"text\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("400"));
}

#[tokio::test]
async fn test_submit_both_keywords_is_positive() {
    let (app, _tmp) = spawn_app();
    let (_, body) = submit(&app, json!({"text": "доставка плохо, но товар хороший"})).await;
    assert_eq!(body["sentiment"], "positive");
}

// ========== Listing ==========

#[tokio::test]
async fn test_list_empty_store() {
    let (app, _tmp) = spawn_app();
    let (status, body) = list(&app, "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_list_unknown_sentiment_rejected() {
    let (app, _tmp) = spawn_app();
    let (status, body) = list(&app, "?sentiment=unknown").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "В запросе передан невалидный тип отзыва");
}

#[tokio::test]
async fn test_round_trip() {
    let (app, _tmp) = spawn_app();
    let (_, created) = submit(&app, json!({"text": "хорошая вещь"})).await;

    let (status, body) = list(&app, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([created]));
}

#[tokio::test]
async fn test_list_filter_returns_exact_subset() {
    let (app, _tmp) = spawn_app();
    let texts = [
        "люблю",
        "плохо",
        "нормально",
        "хорошо сделано",
        "ненавижу очереди",
        "так себе",
    ];
    let mut created = Vec::new();
    for text in texts {
        let (_, body) = submit(&app, json!({ "text": text })).await;
        created.push(body);
    }

    for label in ["positive", "negative", "neutral"] {
        let expected: Vec<Value> = created
            .iter()
            .filter(|r| r["sentiment"] == label)
            .cloned()
            .collect();
        let (status, body) = list(&app, &format!("?sentiment={}", label)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Array(expected));
    }

    let (_, all) = list(&app, "").await;
    assert_eq!(all, Value::Array(created));
}

#[tokio::test]
async fn test_list_empty_filter_means_all() {
    let (app, _tmp) = spawn_app();
    submit(&app, json!({"text": "люблю"})).await;
    submit(&app, json!({"text": "сойдет"})).await;

    let (status, body) = list(&app, "?sentiment=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

// ========== Health & failures ==========

#[tokio::test]
async fn test_health_reports_review_count() {
    let (app, _tmp) = spawn_app();
    submit(&app, json!({"text": "люблю"})).await;

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["total_reviews"], 1);
}

#[tokio::test]
async fn test_storage_failure_returns_500() {
    let tmp_dir = TempDir::new().unwrap();
    // No schema: every query fails
    let store = ReviewStore::new(tmp_dir.path().join("missing.db"));
    let app = create_router(AppState::new(store, Lexicon::default()));

    let (status, body) = submit(&app, json!({"text": "люблю"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].is_string());

    let (status, _) = list(&app, "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // Validation still runs before storage is touched
    let (status, _) = list(&app, "?sentiment=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
