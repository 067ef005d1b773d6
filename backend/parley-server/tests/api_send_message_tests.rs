//! Integration tests for the streaming message endpoint
mod common;

use crate::common::{CODING_MODEL, GENERAL_MODEL, TestApp, upstream_frames};

use parley_relay::error::{PROCESSING_ERROR_MESSAGE, RATE_LIMITED_MESSAGE};

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use googletest::assert_that;
use googletest::prelude::eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

const EMAIL: &str = "ana@example.com";
const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

fn message_request(body: serde_json::Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/send-message")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn mount_reply(app: &TestApp, fragments: &[&str]) {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(upstream_frames(fragments), "text/event-stream"),
        )
        .mount(&app.upstream)
        .await;
}

async fn expect_no_upstream_call(app: &TestApp) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.upstream)
        .await;
}

#[tokio::test]
async fn given_valid_session_when_message_sent_then_fragments_stream_and_finish() {
    // Given
    let app = TestApp::new().await;
    mount_reply(&app, &["Hi", " there"]).await;
    let token = app.session_token(EMAIL).await;

    // When
    let (status, headers, body) = app
        .send(message_request(
            json!({"message": "hello", "conversationHistory": [], "sessionToken": token}),
            None,
        ))
        .await;

    // Then
    assert_that!(status, eq(StatusCode::OK));
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
    assert_that!(
        body,
        eq("data: {\"content\":\"Hi\"}\n\ndata: {\"content\":\" there\"}\n\ndata: {\"finish\":true}\n\n")
    );
}

#[tokio::test]
async fn given_missing_token_when_message_sent_then_401_and_upstream_untouched() {
    let app = TestApp::new().await;
    expect_no_upstream_call(&app).await;

    let (status, body) = app
        .send_json(message_request(json!({"message": "hello"}), None))
        .await;

    assert_that!(status, eq(StatusCode::UNAUTHORIZED));
    assert_that!(body["success"], eq(&json!(false)));
    app.upstream.verify().await;
}

#[tokio::test]
async fn given_expired_session_when_message_sent_then_401_and_session_evicted() {
    // Given
    let app = TestApp::new().await;
    expect_no_upstream_call(&app).await;
    let token = app.session_token(EMAIL).await;
    app.clock.advance(chrono::Duration::hours(25));

    // When
    let (status, body) = app
        .send_json(message_request(
            json!({"message": "hello", "sessionToken": token}),
            None,
        ))
        .await;

    // Then
    assert_that!(status, eq(StatusCode::UNAUTHORIZED));
    assert_that!(body["error"], eq(&json!("Session expired")));
    assert_that!(app.state.session_store.len().await, eq(0));
    app.upstream.verify().await;
}

#[tokio::test]
async fn given_blank_message_when_sent_then_400_before_upstream() {
    let app = TestApp::new().await;
    expect_no_upstream_call(&app).await;
    let token = app.session_token(EMAIL).await;

    let (status, body) = app
        .send_json(message_request(
            json!({"message": "   ", "sessionToken": token}),
            None,
        ))
        .await;

    assert_that!(status, eq(StatusCode::BAD_REQUEST));
    assert_that!(body["error"], eq(&json!("Message cannot be empty")));
    app.upstream.verify().await;
}

#[tokio::test]
async fn given_bearer_header_only_when_message_sent_then_accepted() {
    let app = TestApp::new().await;
    mount_reply(&app, &["ok"]).await;
    let token = app.session_token(EMAIL).await;

    let (status, _, body) = app
        .send(message_request(json!({"message": "hello"}), Some(&token)))
        .await;

    assert_that!(status, eq(StatusCode::OK));
    assert!(body.ends_with("data: {\"finish\":true}\n\n"));
}

#[tokio::test]
async fn given_history_and_coding_message_when_sent_then_upstream_gets_full_payload() {
    // Given
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_partial_json(json!({
            "model": CODING_MODEL,
            "stream": true,
            "max_tokens": 2048,
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "user", "content": "please debug this python script"}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(upstream_frames(&["sure"]), "text/event-stream"),
        )
        .expect(1)
        .mount(&app.upstream)
        .await;
    let token = app.session_token(EMAIL).await;

    // When
    let (status, _, body) = app
        .send(message_request(
            json!({
                "message": "please debug this python script",
                "conversationHistory": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ],
                "sessionToken": token
            }),
            None,
        ))
        .await;

    // Then
    assert_that!(status, eq(StatusCode::OK));
    assert!(body.contains("{\"content\":\"sure\"}"));
    app.upstream.verify().await;
}

#[tokio::test]
async fn given_general_message_when_sent_then_general_model_selected() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": GENERAL_MODEL})))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(upstream_frames(&["sunny"]), "text/event-stream"),
        )
        .expect(1)
        .mount(&app.upstream)
        .await;
    let token = app.session_token(EMAIL).await;

    let (status, _, _) = app
        .send(message_request(
            json!({"message": "what is the weather like", "sessionToken": token}),
            None,
        ))
        .await;

    assert_that!(status, eq(StatusCode::OK));
    app.upstream.verify().await;
}

#[tokio::test]
async fn given_upstream_rate_limited_when_message_sent_then_single_error_event() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&app.upstream)
        .await;
    let token = app.session_token(EMAIL).await;

    let (status, _, body) = app
        .send(message_request(
            json!({"message": "hello", "sessionToken": token}),
            None,
        ))
        .await;

    assert_that!(status, eq(StatusCode::OK));
    assert_that!(
        body,
        eq(&format!("data: {}\n\n", json!({"error": RATE_LIMITED_MESSAGE})))
    );
}

#[tokio::test]
async fn given_upstream_server_error_when_message_sent_then_generic_error_event() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.upstream)
        .await;
    let token = app.session_token(EMAIL).await;

    let (_, _, body) = app
        .send(message_request(
            json!({"message": "hello", "sessionToken": token}),
            None,
        ))
        .await;

    assert_that!(
        body,
        eq(&format!("data: {}\n\n", json!({"error": PROCESSING_ERROR_MESSAGE})))
    );
}
