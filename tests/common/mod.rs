// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use taskdeck::config::Config;
use taskdeck::db::{AccountStore, Database, FirestoreDb, MemoryDb};
use taskdeck::models::{Account, VerifiedIdentity};
use taskdeck::routes::create_router;
use taskdeck::services::{issue_session_token, IdentityError, IdentityVerifier};
use taskdeck::AppState;
use tower::ServiceExt;

/// Credential that makes [`StaticIdentityVerifier`] report a provider outage.
#[allow(dead_code)]
pub const UNAVAILABLE_CREDENTIAL: &str = "provider-unavailable";

/// Identity provider fake.
///
/// Accepts credentials of the form `google:<subject>` and asserts the
/// identity `<subject>@example.com`. Anything else is rejected.
pub struct StaticIdentityVerifier;

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError> {
        if credential == UNAVAILABLE_CREDENTIAL {
            return Err(IdentityError::Transient("connection refused".to_string()));
        }

        let subject = credential
            .strip_prefix("google:")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| IdentityError::Rejected("unknown test credential".to_string()))?;

        Ok(test_identity(subject))
    }
}

/// Identity the fake provider asserts for `subject`.
#[allow(dead_code)]
pub fn test_identity(subject: &str) -> VerifiedIdentity {
    VerifiedIdentity {
        subject: subject.to_string(),
        email: format!("{subject}@example.com"),
        name: format!("User {subject}"),
        picture: None,
    }
}

/// Credential the fake provider accepts for `subject`.
#[allow(dead_code)]
pub fn credential_for(subject: &str) -> String {
    format!("google:{subject}")
}

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app over a fresh in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_db(Arc::new(MemoryDb::new()))
}

/// Create a test app over the given store.
#[allow(dead_code)]
pub fn create_test_app_with_db(db: Arc<dyn Database>) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db,
        identity_verifier: Arc::new(StaticIdentityVerifier),
    });

    (create_router(state.clone()), state)
}

/// Create an account for `subject` directly in the store and return a
/// valid session token for it.
#[allow(dead_code)]
pub async fn signed_in(state: &AppState, subject: &str) -> (String, Account) {
    let account = Account::from_identity(&test_identity(subject), Utc::now());
    state
        .db
        .create_account(&account)
        .await
        .expect("Failed to create test account");

    let token = issue_session_token(&account, &state.config.jwt_signing_key, Utc::now())
        .expect("Failed to issue test token");

    (token, account)
}

/// Send a request through the router and decode the JSON response body.
///
/// An empty body decodes to `Value::Null`.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };

    (status, json)
}
