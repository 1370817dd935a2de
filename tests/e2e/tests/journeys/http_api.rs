//! HTTP API journey
//!
//! Drives the full router, middleware included, one request at a time.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, header};
use chrono::Duration;
use lexicon_e2e_tests::harness::TestDatabaseManager;
use lexicon_server::ServerConfig;
use lexicon_server::api::{build_router, state::AppState};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    db: TestDatabaseManager,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(&ServerConfig::default())
    }

    fn with_config(config: &ServerConfig) -> Self {
        let db = TestDatabaseManager::new_temp();
        let state = AppState::new(Arc::clone(&db.storage))
            .with_clock(db.clock.clone())
            .with_review_batch(5);
        let router = build_router(state, config);
        Self { router, db }
    }

    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (u16, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (u16, Value) {
        let (status, body) = self.request(method, uri, body).await;
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap()
        };
        (status, value)
    }
}

#[tokio::test]
async fn test_word_crud_over_http() {
    let app = TestApp::new();

    let (status, created) = app
        .json(
            "POST",
            "/api/words",
            Some(json!({"word": "pithy", "definition": "concise and forceful", "example": "A pithy remark."})),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(created["status"], "new");
    assert_eq!(created["memoryStage"], 0);
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .json("POST", "/api/words", Some(json!({"word": "pithy", "definition": "again"})))
        .await;
    assert_eq!(status, 409);
    assert!(body["error"].as_str().unwrap().contains("pithy"));

    let (status, body) = app
        .json("POST", "/api/words", Some(json!({"word": "  ", "definition": "blank"})))
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    let (status, _) = app
        .json("POST", "/api/words", Some(json!({"definition": "no word field"})))
        .await;
    assert_eq!(status, 400);

    let (status, fetched) = app.json("GET", &format!("/api/words/{}", id), None).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["word"], "pithy");

    let (status, updated) = app
        .json(
            "PUT",
            &format!("/api/words/{}", id),
            Some(json!({"word": "pithy", "definition": "brief but meaningful"})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(updated["definition"], "brief but meaningful");
    assert_eq!(updated["example"], Value::Null);

    let (status, list) = app.json("GET", "/api/words", None).await;
    assert_eq!(status, 200);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, body) = app.request("DELETE", &format!("/api/words/{}", id), None).await;
    assert_eq!(status, 204);
    assert!(body.is_empty());

    let (status, body) = app.json("GET", &format!("/api/words/{}", id), None).await;
    assert_eq!(status, 404);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_requests_get_json_errors() {
    let app = TestApp::new();

    for (method, uri) in [
        ("GET", "/api/words/abc"),
        ("DELETE", "/api/words/abc"),
        ("GET", "/api/words/review?limit=x"),
    ] {
        let (status, body) = app.json(method, uri, None).await;
        assert_eq!(status, 400, "{} {}", method, uri);
        assert!(body["error"].is_string(), "{} {}: {}", method, uri, body);
    }

    let (status, body) = app
        .json("PUT", "/api/words/abc", Some(json!({"word": "a", "definition": "b"})))
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    let (status, body) = app
        .json("POST", "/api/words/abc/review", Some(json!({"isCorrect": true})))
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    let (status, body) = app
        .json(
            "POST",
            "/api/words/import",
            Some(json!([{"word": "a", "definition": "b", "status": "mastered"}])),
        )
        .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("status"));
    assert!(app.db.is_empty());
}

#[tokio::test]
async fn test_review_session_over_http() {
    let app = TestApp::new();

    let (status, report) = app
        .json(
            "POST",
            "/api/words/import",
            Some(json!([
                {"word": "astute", "definition": "shrewd"},
                {"word": "benign", "definition": "gentle"},
                {"word": "cogent", "definition": "convincing"},
            ])),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(report, json!({"imported": 3, "skipped": 0}));

    let (_, queue) = app.json("GET", "/api/words/review", None).await;
    assert_eq!(queue.as_array().unwrap().len(), 0);

    app.db.clock.advance(Duration::days(1));
    let (status, queue) = app.json("GET", "/api/words/review", None).await;
    assert_eq!(status, 200);
    let queue = queue.as_array().unwrap().clone();
    assert_eq!(queue.len(), 3);

    let first = queue[0]["id"].as_i64().unwrap();
    let (status, outcome) = app
        .json("POST", &format!("/api/words/{}/review", first), Some(json!({"isCorrect": true})))
        .await;
    assert_eq!(status, 200);
    assert_eq!(outcome["memoryStage"], 1);
    assert_eq!(outcome["reviewCount"], 1);
    assert_eq!(outcome["status"], "review");
    assert!(outcome["nextReviewAt"].is_string());

    let (status, _) = app
        .json("POST", &format!("/api/words/{}/review", first), Some(json!({"isCorrect": "yes"})))
        .await;
    assert_eq!(status, 400);

    let (status, _) = app
        .json("POST", "/api/words/9999/review", Some(json!({"isCorrect": false})))
        .await;
    assert_eq!(status, 404);

    let (_, queue) = app.json("GET", "/api/words/review?limit=1", None).await;
    assert_eq!(queue.as_array().unwrap().len(), 1);

    let (status, stats) = app.json("GET", "/api/stats", None).await;
    assert_eq!(status, 200);
    assert_eq!(stats["totalWords"], 3);
    assert_eq!(stats["dueForReview"], 2);
    assert_eq!(stats["review"], 1);
    assert_eq!(stats["new"], 2);

    let (status, body) = app.json("DELETE", "/api/words", None).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"success": true, "deletedCount": 3}));
}

#[tokio::test]
async fn test_health_and_web_ui() {
    let app = TestApp::new();

    let (status, health) = app.json("GET", "/health", None).await;
    assert_eq!(status, 200);
    assert_eq!(health["status"], "ok");
    assert!(health["timestamp"].is_string());

    let (status, page) = app.request("GET", "/", None).await;
    assert_eq!(status, 200);
    assert!(page.contains("<title>Lexicon</title>"));

    let (status, script) = app.request("GET", "/app.js", None).await;
    assert_eq!(status, 200);
    assert!(script.contains("/api/words/review"));

    let (status, body) = app.json("GET", "/api/unknown", None).await;
    assert_eq!(status, 404);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_api_only_mode_has_no_ui() {
    let config = ServerConfig {
        static_enabled: false,
        ..ServerConfig::default()
    };
    let app = TestApp::with_config(&config);

    let (status, _) = app.request("GET", "/", None).await;
    assert_eq!(status, 404);
    let (status, _) = app.request("GET", "/health", None).await;
    assert_eq!(status, 200);
}
