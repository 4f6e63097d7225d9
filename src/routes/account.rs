// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account profile routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::CurrentAccount;
use crate::models::{AccountChange, AccountResponse, PreferencesPatch, ProfileSetup};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use std::sync::Arc;

/// Account routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/auth/profile", post(setup_profile))
        .route("/api/auth/preferences", put(update_preferences))
}

/// Get current account profile.
async fn get_me(Extension(current): Extension<CurrentAccount>) -> Json<AccountResponse> {
    Json(AccountResponse::from(&current.0))
}

/// Complete onboarding. Clears `isNewUser`.
async fn setup_profile(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    body: std::result::Result<Json<ProfileSetup>, JsonRejection>,
) -> Result<Json<AccountResponse>> {
    let Json(setup) = body?;
    let setup = setup.normalize()?;

    apply_change(&state, &current, AccountChange::SetupProfile(setup)).await
}

async fn update_preferences(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    body: std::result::Result<Json<PreferencesPatch>, JsonRejection>,
) -> Result<Json<AccountResponse>> {
    let Json(patch) = body?;
    let patch = patch.normalize()?;

    apply_change(&state, &current, AccountChange::UpdatePreferences(patch)).await
}

async fn apply_change(
    state: &AppState,
    current: &CurrentAccount,
    change: AccountChange,
) -> Result<Json<AccountResponse>> {
    let account = state
        .db
        .update_account(current.id(), &change)
        .await?
        .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

    tracing::info!(account_id = %account.id, "Account updated");
    Ok(Json(AccountResponse::from(&account)))
}
