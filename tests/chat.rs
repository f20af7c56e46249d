//! Chat endpoint integration tests

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use avatar_gateway::api::{self, ApiState};
use avatar_gateway::lipsync::LipSyncConfig;
use avatar_gateway::{ChatPipeline, DbPool, ExchangeRepo};

mod common;
use common::{CallLog, FakeModel, FakePublisher, FakeStore, FakeSynthesizer, setup_test_db};

/// Build a test router over fake collaborators
fn build_app(fail_publish: bool) -> (axum::Router, Arc<CallLog>, DbPool) {
    let db = setup_test_db();
    let log = Arc::new(CallLog::default());

    let pipeline = ChatPipeline::new(
        Arc::new(FakeModel {
            log: log.clone(),
            reply: "Hello there!".to_string(),
        }),
        Arc::new(FakeSynthesizer { log: log.clone() }),
        Arc::new(FakeStore { log: log.clone() }),
        Arc::new(FakePublisher {
            log: log.clone(),
            fail: fail_publish,
        }),
        ExchangeRepo::new(db.clone()),
        LipSyncConfig::default(),
    );

    let state = Arc::new(ApiState {
        pipeline: Arc::new(pipeline),
        db: db.clone(),
    });

    (api::router(state), log, db)
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn missing_message_is_client_error_without_collaborator_calls() {
    let (app, log, _db) = build_app(false);

    let response = app.oneshot(chat_request("{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "bad_request");

    assert_eq!(log.total(), 0, "no collaborator should have been invoked");
}

#[tokio::test]
async fn blank_message_is_client_error_without_collaborator_calls() {
    let (app, log, _db) = build_app(false);

    let response = app
        .oneshot(chat_request(r#"{"message": "   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(log.total(), 0);
}

#[tokio::test]
async fn chat_round_trip_persists_exchange_and_pushes() {
    let (app, log, db) = build_app(false);

    let response = app
        .oneshot(chat_request(r#"{"message": "hi avatar"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["reply"], "Hello there!");

    let audio_url = json["audio_url"].as_str().unwrap();
    assert!(audio_url.starts_with("https://cdn.test/reply_"));
    assert!(audio_url.ends_with(".wav"));

    // Half a second of fixture audio at a 25 ms hop
    assert_eq!(json["events"], 20);

    assert_eq!(log.model.load(Ordering::SeqCst), 1);
    assert_eq!(log.tts.load(Ordering::SeqCst), 1);
    assert_eq!(log.store.load(Ordering::SeqCst), 1);
    assert_eq!(log.publish.load(Ordering::SeqCst), 1);

    let repo = ExchangeRepo::new(db);
    let rows = repo.list_recent(10).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_input, "hi avatar");
    assert_eq!(rows[0].reply, "Hello there!");
    assert!(rows[0].audio_key.starts_with("reply_"));
}

#[tokio::test]
async fn publish_failure_is_server_error_but_side_effects_remain() {
    let (app, log, db) = build_app(true);

    let response = app
        .oneshot(chat_request(r#"{"message": "hi avatar"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "upstream_failed");

    // The upload and the exchange record happened before the publish failed
    // and are deliberately left in place
    assert_eq!(log.store.load(Ordering::SeqCst), 1);
    let repo = ExchangeRepo::new(db);
    assert_eq!(repo.list_recent(10).unwrap().len(), 1);
}

#[tokio::test]
async fn health_endpoint() {
    let (app, _log, _db) = build_app(false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn ready_endpoint_checks_database() {
    let (app, _log, _db) = build_app(false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}
