// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod account;
pub mod patch;
pub mod task;

pub use account::{
    Account, AccountChange, AccountResponse, Preferences, PreferencesPatch, ProfileSetup,
    VerifiedIdentity,
};
pub use patch::Patch;
pub use task::{NewTask, Task, TaskPatch, TaskStats, UNCATEGORIZED};
