// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{http::StatusCode, response::IntoResponse};
use serde_json::{json, Value};
use taskdeck::error::AppError;
use taskdeck::services::IdentityError;

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_auth_errors_carry_no_details() {
    for (err, code) in [
        (AppError::Unauthorized, "unauthorized"),
        (AppError::InvalidToken, "invalid_token"),
        (AppError::InvalidCredential, "invalid_credential"),
    ] {
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": code }));
    }
}

#[tokio::test]
async fn test_identity_flow_errors_name_next_action() {
    let (status, body) = render(AppError::AccountNotFound).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["action"], "signup");

    let (status, body) = render(AppError::AccountExists).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["action"], "signin");
}

#[tokio::test]
async fn test_server_errors_hide_cause() {
    let (status, body) = render(AppError::Database("deadline exceeded at 10.0.0.3".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "database_error" }));

    let (status, body) = render(AppError::Internal(anyhow::anyhow!("boom"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "internal_error" }));
}

#[tokio::test]
async fn test_client_errors_keep_message() {
    let (status, body) = render(AppError::BadRequest("Title is required".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Title is required");

    let (status, body) = render(AppError::NotFound("Task not found".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "not_found", "details": "Task not found" }));
}

#[test]
fn test_identity_error_mapping() {
    let rejected: AppError = IdentityError::Rejected("bad audience".into()).into();
    assert!(matches!(rejected, AppError::InvalidCredential));

    let transient: AppError = IdentityError::Transient("timeout".into()).into();
    assert_eq!(transient.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
