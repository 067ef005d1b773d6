use crate::ApiError;

use parley_auth::AuthError;

use axum::response::IntoResponse;
use googletest::assert_that;
use googletest::prelude::eq;
use http::StatusCode;
use http_body_util::BodyExt;

async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn given_not_found_when_rendered_then_404_with_error_envelope() {
    let (status, json) = body_json(ApiError::not_found("File not found")).await;

    assert_that!(status, eq(StatusCode::NOT_FOUND));
    assert_that!(json["success"], eq(&serde_json::json!(false)));
    assert_that!(json["error"], eq(&serde_json::json!("File not found")));
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn given_internal_error_when_rendered_then_details_included() {
    let (status, json) = body_json(ApiError::internal("Failed to send OTP", "smtp down")).await;

    assert_that!(status, eq(StatusCode::INTERNAL_SERVER_ERROR));
    assert_that!(json["details"], eq(&serde_json::json!("smtp down")));
}

#[tokio::test]
async fn given_internal_error_when_details_stripped_then_body_has_no_details() {
    let error = ApiError::internal("Failed to send OTP", "smtp down").without_details();

    let (status, json) = body_json(error).await;

    assert_that!(status, eq(StatusCode::INTERNAL_SERVER_ERROR));
    assert_that!(json["error"], eq(&serde_json::json!("Failed to send OTP")));
    assert!(json.get("details").is_none());
}

#[test]
fn given_auth_failures_when_converted_then_status_follows_taxonomy() {
    let cases = vec![
        (AuthError::invalid_input("email", "Invalid email"), StatusCode::BAD_REQUEST),
        (AuthError::conflict("Email already registered"), StatusCode::BAD_REQUEST),
        (AuthError::otp_not_found(), StatusCode::BAD_REQUEST),
        (AuthError::otp_expired(), StatusCode::BAD_REQUEST),
        (AuthError::otp_mismatch(), StatusCode::BAD_REQUEST),
        (AuthError::unauthenticated(), StatusCode::UNAUTHORIZED),
        (AuthError::session_expired(), StatusCode::UNAUTHORIZED),
        (AuthError::invalid_credentials(), StatusCode::UNAUTHORIZED),
        (AuthError::unverified(), StatusCode::FORBIDDEN),
        (AuthError::delivery_failed("webhook returned 502"), StatusCode::INTERNAL_SERVER_ERROR),
        (AuthError::provider("bad code"), StatusCode::INTERNAL_SERVER_ERROR),
        (AuthError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (auth_error, expected) in cases {
        let code = auth_error.error_code();
        let status = ApiError::from(auth_error).status();
        assert_eq!(status, expected, "{code}");
    }
}

#[tokio::test]
async fn given_delivery_failure_when_converted_then_client_message_and_detail_kept() {
    let error = ApiError::from(AuthError::delivery_failed("webhook returned 502"));

    let (_, json) = body_json(error).await;

    assert_that!(json["error"], eq(&serde_json::json!("Failed to send OTP")));
    assert!(
        json["details"]
            .as_str()
            .unwrap()
            .contains("webhook returned 502")
    );
}
