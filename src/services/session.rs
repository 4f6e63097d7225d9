// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session bearer tokens (HS256 JWTs).
//!
//! Tokens carry only what authorization needs: account ID, email and name.
//! The Google subject ID and other profile attributes are never embedded.

use crate::error::AppError;
use crate::models::Account;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Session lifetime: 7 days.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (internal account ID)
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Create a session token for `account`, valid for [`SESSION_TTL_SECS`]
/// from `issued_at`.
pub fn issue_session_token(
    account: &Account,
    signing_key: &[u8],
    issued_at: DateTime<Utc>,
) -> anyhow::Result<String> {
    let iat = issued_at.timestamp();
    let claims = SessionClaims {
        sub: account.id.clone(),
        email: account.email.clone(),
        name: account.name.clone(),
        iat,
        exp: iat + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify a session token at time `now`.
///
/// Every failure (bad signature, malformed, expired, empty) is reported as
/// [`AppError::InvalidToken`].
pub fn verify_session_token(
    token: &str,
    signing_key: &[u8],
    now: DateTime<Utc>,
) -> Result<SessionClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "iat", "sub"]);
    // Expiry is checked below against the caller's clock.
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = decode::<SessionClaims>(token, &DecodingKey::from_secret(signing_key), &validation)
        .map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AppError::InvalidToken
        })?
        .claims;

    if now.timestamp() >= claims.exp {
        tracing::debug!(sub = %claims.sub, exp = claims.exp, "Session token expired");
        return Err(AppError::InvalidToken);
    }

    Ok(claims)
}
