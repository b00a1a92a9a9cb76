// tests/http_api.rs

mod test_helpers;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use pulsecheck::server::create_router;
use test_helpers::{ScriptedGenerator, test_app_state};

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_raw(app: &Router, path: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, bytes.to_vec())
}

async fn open_session(app: &Router) -> String {
    let (status, body) = post(app, "/api/session", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn status_reports_ok() {
    let state = test_app_state(Arc::new(ScriptedGenerator::new(&[]))).await;
    let app = create_router(state);

    let (status, _, bytes) = get_raw(&app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn index_serves_the_page() {
    let state = test_app_state(Arc::new(ScriptedGenerator::new(&[]))).await;
    let app = create_router(state);

    let (status, _, bytes) = get_raw(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(bytes).unwrap();
    assert!(page.contains("Employee Satisfaction Chatbot"));
}

#[tokio::test]
async fn full_flow_persists_an_analysis() {
    let generator = Arc::new(ScriptedGenerator::new(&[
        "AI: Thanks for sharing how you feel.",
        r#"{"name_of_employee": "Sam", "satisfaction": "Good"}"#,
    ]));
    let state = test_app_state(generator).await;
    let app = create_router(state);

    let session_id = open_session(&app).await;

    let (status, body) = post(
        &app,
        "/api/name",
        json!({"session_id": session_id, "name": "Sam"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["returning"], false);
    assert!(body["greeting"].as_str().unwrap().contains("Nice to meet you, Sam"));

    let (status, body) = post(
        &app,
        "/api/chat",
        json!({"session_id": session_id, "message": "I really enjoy my work here"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Thanks for sharing how you feel.");
    assert_eq!(body["transcript"].as_array().unwrap().len(), 2);

    let (status, body) = post(&app, "/api/analyze", json!({"session_id": session_id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], true);
    assert_eq!(body["analysis"]["satisfaction"], "Good");

    let (status, _, bytes) = get_raw(&app, "/api/analyses").await;
    assert_eq!(status, StatusCode::OK);
    let data: Value = serde_json::from_slice(&bytes).unwrap();
    let rows = data["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name_of_employee"], "Sam");
    assert_eq!(rows[0]["satisfaction"], "Good");
    assert_eq!(data["counts"]["Good"], 1);
}

#[tokio::test]
async fn empty_name_is_rejected_without_a_state_change() {
    let state = test_app_state(Arc::new(ScriptedGenerator::new(&[]))).await;
    let app = create_router(state);
    let session_id = open_session(&app).await;

    let (status, body) = post(
        &app,
        "/api/name",
        json!({"session_id": session_id, "name": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter your name.");

    // still awaiting a name, so chatting is refused
    let (status, _) = post(
        &app,
        "/api/chat",
        json!({"session_id": session_id, "message": "hello"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let state = test_app_state(Arc::new(ScriptedGenerator::new(&[]))).await;
    let app = create_router(state);
    let session_id = open_session(&app).await;
    post(
        &app,
        "/api/name",
        json!({"session_id": session_id, "name": "Sam"}),
    )
    .await;

    let (status, body) = post(
        &app,
        "/api/chat",
        json!({"session_id": session_id, "message": ""}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please enter a message.");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let state = test_app_state(Arc::new(ScriptedGenerator::new(&[]))).await;
    let app = create_router(state);

    let (status, _) = post(
        &app,
        "/api/name",
        json!({"session_id": "bogus", "name": "Sam"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analyze_with_no_conversation_is_rejected() {
    let state = test_app_state(Arc::new(ScriptedGenerator::new(&[]))).await;
    let app = create_router(state);
    let session_id = open_session(&app).await;
    post(
        &app,
        "/api/name",
        json!({"session_id": session_id, "name": "Sam"}),
    )
    .await;

    let (status, body) = post(&app, "/api/analyze", json!({"session_id": session_id})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No conversation data available to analyze!");
}

#[tokio::test]
async fn malformed_classifier_output_is_surfaced_and_not_persisted() {
    let generator = Arc::new(ScriptedGenerator::new(&[
        "Happy to listen.",
        "The employee seems happy overall.",
    ]));
    let state = test_app_state(generator).await;
    let app = create_router(state);
    let session_id = open_session(&app).await;

    post(
        &app,
        "/api/name",
        json!({"session_id": session_id, "name": "Sam"}),
    )
    .await;
    post(
        &app,
        "/api/chat",
        json!({"session_id": session_id, "message": "All good"}),
    )
    .await;

    let (status, body) = post(&app, "/api/analyze", json!({"session_id": session_id})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["raw_response"], "The employee seems happy overall.");

    let (_, _, bytes) = get_raw(&app, "/api/analyses").await;
    let data: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(data["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn pdf_of_an_empty_table_is_refused() {
    let state = test_app_state(Arc::new(ScriptedGenerator::new(&[]))).await;
    let app = create_router(state);

    let (status, _, bytes) = get_raw(&app, "/api/report.pdf").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("no analysis data"));
}

#[tokio::test]
async fn pdf_download_carries_the_stored_rows() {
    let state = test_app_state(Arc::new(ScriptedGenerator::new(&[]))).await;
    state.analyses.insert("Sam", "Good").await.unwrap();
    let app = create_router(state);

    let (status, content_type, bytes) = get_raw(&app, "/api/report.pdf").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/pdf"));
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn clear_resets_the_state_machine() {
    let generator = Arc::new(ScriptedGenerator::new(&["Noted."]));
    let state = test_app_state(generator).await;
    let app = create_router(state);
    let session_id = open_session(&app).await;

    post(
        &app,
        "/api/name",
        json!({"session_id": session_id, "name": "Sam"}),
    )
    .await;
    post(
        &app,
        "/api/chat",
        json!({"session_id": session_id, "message": "hi"}),
    )
    .await;

    let (status, body) = post(&app, "/api/clear", json!({"session_id": session_id})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "awaiting_name");

    // back to the start: chatting requires a name again
    let (status, _) = post(
        &app,
        "/api/chat",
        json!({"session_id": session_id, "message": "hello again"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn returning_employee_gets_the_welcome_back_greeting() {
    let state = test_app_state(Arc::new(ScriptedGenerator::new(&[]))).await;
    state.analyses.insert("Sam", "Average").await.unwrap();
    let app = create_router(state);
    let session_id = open_session(&app).await;

    let (status, body) = post(
        &app,
        "/api/name",
        json!({"session_id": session_id, "name": "Sam"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["returning"], true);
    assert!(body["greeting"].as_str().unwrap().starts_with("Welcome back, Sam"));
}
