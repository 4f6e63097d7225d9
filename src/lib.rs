// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Taskdeck: personal task management API
//!
//! This crate provides the backend API: Google sign-in, session tokens,
//! and per-account task storage with filtering, paging and stats.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Database;
use services::IdentityVerifier;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
}
