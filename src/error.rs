// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Authentication failures collapse into `InvalidToken` regardless of cause,
/// and tasks owned by someone else are reported as `NotFound`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid identity credential")]
    InvalidCredential,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("No account exists for this identity")]
    AccountNotFound,

    #[error("An account already exists for this identity")]
    AccountExists,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    /// Flow the client should switch to (`signin` / `signup`).
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'static str>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidToken | AppError::InvalidCredential => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) | AppError::AccountNotFound => StatusCode::NOT_FOUND,
            AppError::AccountExists => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, details, action) = match &self {
            AppError::Unauthorized => ("unauthorized", None, None),
            AppError::InvalidToken => ("invalid_token", None, None),
            AppError::InvalidCredential => ("invalid_credential", None, None),
            AppError::NotFound(msg) => ("not_found", Some(msg.clone()), None),
            AppError::AccountNotFound => (
                "account_not_found",
                Some("No account found, please sign up first".to_string()),
                Some("signup"),
            ),
            AppError::AccountExists => (
                "account_exists",
                Some("Account already exists, please sign in instead".to_string()),
                Some("signin"),
            ),
            AppError::BadRequest(msg) => ("bad_request", Some(msg.clone()), None),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("database_error", None, None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", None, None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            action,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
