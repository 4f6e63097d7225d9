// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google sign-in and session status routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::CurrentAccount;
use crate::models::AccountResponse;
use crate::services::{issue_session_token, resolve_identity, AuthIntent};
use crate::AppState;

/// Public sign-in entry point.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/google", post(google_auth))
}

/// Routes that work with or without a session.
/// The optional auth middleware is applied in routes/mod.rs.
pub fn status_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/status", get(auth_status))
}

/// Body of a Google sign-in / sign-up request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    /// Google ID token from the client-side sign-in button.
    #[serde(default, alias = "assertion")]
    credential: Option<String>,
    #[serde(default)]
    intent: Option<AuthIntent>,
    /// Older clients send a flag instead of `intent`.
    #[serde(default)]
    is_sign_up: Option<bool>,
}

impl GoogleAuthRequest {
    fn intent(&self) -> AuthIntent {
        match (self.intent, self.is_sign_up) {
            (Some(intent), _) => intent,
            (None, Some(true)) => AuthIntent::SignUp,
            (None, _) => AuthIntent::SignIn,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    pub token: String,
    pub is_new_user: bool,
    pub account: AccountResponse,
}

/// Verify a Google credential, resolve it to an account and issue a session.
async fn google_auth(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<GoogleAuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(body) = body?;
    let intent = body.intent();

    let credential = body
        .credential
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Credential is required".to_string()))?;

    let identity = state.identity_verifier.verify(credential).await?;
    let account = resolve_identity(state.db.as_ref(), &identity, intent).await?;

    let token = issue_session_token(&account, &state.config.jwt_signing_key, Utc::now())?;

    tracing::info!(
        account_id = %account.id,
        intent = ?intent,
        is_new_user = account.is_new_user,
        "Session issued"
    );

    Ok(Json(AuthResponse {
        token,
        is_new_user: account.is_new_user,
        account: AccountResponse::from(&account),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_new_user: Option<bool>,
}

/// Report whether the caller holds a valid session.
async fn auth_status(current: Option<Extension<CurrentAccount>>) -> Json<AuthStatusResponse> {
    Json(match current {
        Some(Extension(CurrentAccount(account))) => AuthStatusResponse {
            authenticated: true,
            is_new_user: Some(account.is_new_user),
        },
        None => AuthStatusResponse {
            authenticated: false,
            is_new_user: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> GoogleAuthRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_intent_resolution() {
        assert_eq!(request(r#"{"credential": "x"}"#).intent(), AuthIntent::SignIn);
        assert_eq!(
            request(r#"{"credential": "x", "isSignUp": true}"#).intent(),
            AuthIntent::SignUp
        );
        assert_eq!(
            request(r#"{"credential": "x", "intent": "signin", "isSignUp": true}"#).intent(),
            AuthIntent::SignIn
        );
    }

    #[test]
    fn test_assertion_alias() {
        let body = request(r#"{"assertion": "token"}"#);
        assert_eq!(body.credential.as_deref(), Some("token"));
    }
}
