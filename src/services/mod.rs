// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod google_oidc;
pub mod identity;
pub mod session;

pub use google_oidc::GoogleIdTokenVerifier;
pub use identity::{resolve_identity, AuthIntent, IdentityError, IdentityVerifier};
pub use session::{issue_session_token, verify_session_token, SessionClaims, SESSION_TTL_SECS};
