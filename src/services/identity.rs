// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity verification and account resolution.

use crate::db::AccountStore;
use crate::error::AppError;
use crate::models::{Account, VerifiedIdentity};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

/// Identity verification error categories.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    /// The credential is malformed, forged, expired or for another audience.
    #[error("identity credential rejected: {0}")]
    Rejected(String),
    /// The provider could not be reached; the credential may still be valid.
    #[error("identity provider unavailable: {0}")]
    Transient(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected(reason) => {
                tracing::info!(reason = %reason, "Identity credential rejected");
                AppError::InvalidCredential
            }
            IdentityError::Transient(reason) => {
                AppError::Internal(anyhow::anyhow!("identity provider unavailable: {reason}"))
            }
        }
    }
}

/// Turns an identity-provider credential into a verified identity.
///
/// Constructed in `main` and held in [`crate::AppState`], so tests can
/// substitute a fake provider.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Which flow the client started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthIntent {
    #[default]
    SignIn,
    SignUp,
}

/// Find or create the account for a verified identity.
///
/// Sign-in never creates an account and sign-up never returns an existing
/// one. Rejections leave the store untouched.
pub async fn resolve_identity<S>(
    store: &S,
    identity: &VerifiedIdentity,
    intent: AuthIntent,
) -> Result<Account, AppError>
where
    S: AccountStore + ?Sized,
{
    let existing = store.find_account_by_google_id(&identity.subject).await?;

    match (existing, intent) {
        (Some(account), AuthIntent::SignIn) => {
            tracing::info!(account_id = %account.id, "Signed in");
            Ok(account)
        }
        (Some(account), AuthIntent::SignUp) => {
            tracing::info!(account_id = %account.id, "Sign-up for existing account");
            Err(AppError::AccountExists)
        }
        (None, AuthIntent::SignIn) => {
            tracing::info!("Sign-in for unknown identity");
            Err(AppError::AccountNotFound)
        }
        (None, AuthIntent::SignUp) => {
            let account = Account::from_identity(identity, Utc::now());
            store.create_account(&account).await?;
            tracing::info!(account_id = %account.id, "Signed up");
            Ok(account)
        }
    }
}
