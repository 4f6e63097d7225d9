// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::error::AppError;
use crate::models::Account;
use crate::services::verify_session_token;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;

/// The authenticated caller, resolved from the session token.
///
/// Inserted into request extensions by [`require_auth`] (and by
/// [`optional_auth`] when a valid token is present); handlers take it as
/// `Extension<CurrentAccount>`.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

impl CurrentAccount {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

/// Bearer token from the Authorization header, if the scheme is Bearer.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Verify the token and load the account it names.
async fn authenticate(state: &AppState, token: &str) -> Result<CurrentAccount, AppError> {
    let claims = verify_session_token(token, &state.config.jwt_signing_key, Utc::now())?;

    match state.db.get_account(&claims.sub).await? {
        Some(account) => Ok(CurrentAccount(account)),
        None => {
            tracing::info!(account_id = %claims.sub, "Session for missing account");
            Err(AppError::InvalidToken)
        }
    }
}

/// Middleware that requires valid session authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let current = authenticate(&state, token).await?;

    request.extensions_mut().insert(current);
    Ok(next.run(request).await)
}

/// Middleware that attaches the caller if a valid token is present and
/// otherwise lets the request through anonymously.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match authenticate(&state, token).await {
            Ok(current) => {
                request.extensions_mut().insert(current);
            }
            Err(AppError::Database(e)) => {
                tracing::error!(error = %e, "Account lookup failed during optional auth");
            }
            Err(_) => {}
        }
    }

    next.run(request).await
}
