// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by concurrent maps.
//!
//! Used for local development (`STORE_BACKEND=memory`) and the integration
//! tests. Tasks are keyed by `(owner, task_id)`, so a lookup with the wrong
//! owner simply misses.

use crate::db::{email_key, AccountStore, TaskPage, TaskQuery, TaskStore};
use crate::error::AppError;
use crate::models::{Account, AccountChange, NewTask, Task, TaskPatch, TaskStats};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

type TaskKey = (String, String);

fn task_key(owner: &str, task_id: &str) -> TaskKey {
    (owner.to_string(), task_id.to_string())
}

#[derive(Default)]
struct Tables {
    accounts: DashMap<String, Account>,
    /// Google subject ID -> account ID
    google_ids: DashMap<String, String>,
    /// Email key -> account ID
    emails: DashMap<String, String>,
    tasks: DashMap<TaskKey, Task>,
}

/// In-memory database. Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<Tables>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn owned_tasks(&self, owner: &str) -> Vec<Task> {
        self.tables
            .tasks
            .iter()
            .filter(|entry| entry.key().0 == owner)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl AccountStore for MemoryDb {
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>, AppError> {
        Ok(self
            .tables
            .accounts
            .get(account_id)
            .map(|account| account.clone()))
    }

    async fn find_account_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<Account>, AppError> {
        let Some(account_id) = self
            .tables
            .google_ids
            .get(google_id)
            .map(|id| id.clone())
        else {
            return Ok(None);
        };
        self.get_account(&account_id).await
    }

    async fn create_account(&self, account: &Account) -> Result<(), AppError> {
        // Hold the Google ID slot while claiming the email so two concurrent
        // sign-ups for the same identity cannot both succeed.
        let google_slot = match self.tables.google_ids.entry(account.google_id.clone()) {
            Entry::Occupied(_) => return Err(AppError::AccountExists),
            Entry::Vacant(slot) => slot,
        };

        match self.tables.emails.entry(email_key(&account.email)) {
            Entry::Occupied(_) => return Err(AppError::AccountExists),
            Entry::Vacant(slot) => {
                slot.insert(account.id.clone());
            }
        }

        self.tables
            .accounts
            .insert(account.id.clone(), account.clone());
        google_slot.insert(account.id.clone());

        tracing::info!(account_id = %account.id, "Account created");
        Ok(())
    }

    async fn update_account(
        &self,
        account_id: &str,
        change: &AccountChange,
    ) -> Result<Option<Account>, AppError> {
        Ok(self.tables.accounts.get_mut(account_id).map(|mut account| {
            change.apply(&mut account, Utc::now());
            account.clone()
        }))
    }
}

#[async_trait]
impl TaskStore for MemoryDb {
    async fn create_task(&self, owner: &str, new_task: NewTask) -> Result<Task, AppError> {
        let task = new_task.into_task(owner, Utc::now());
        self.tables
            .tasks
            .insert(task_key(owner, &task.id), task.clone());
        Ok(task)
    }

    async fn get_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>, AppError> {
        Ok(self
            .tables
            .tasks
            .get(&task_key(owner, task_id))
            .map(|task| task.clone()))
    }

    async fn list_tasks(&self, owner: &str, query: &TaskQuery) -> Result<TaskPage, AppError> {
        Ok(query.execute(owner, self.owned_tasks(owner)))
    }

    async fn update_task(
        &self,
        owner: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        Ok(self
            .tables
            .tasks
            .get_mut(&task_key(owner, task_id))
            .map(|mut task| {
                patch.apply(&mut task, Utc::now());
                task.clone()
            }))
    }

    async fn delete_task(&self, owner: &str, task_id: &str) -> Result<bool, AppError> {
        Ok(self
            .tables
            .tasks
            .remove(&task_key(owner, task_id))
            .is_some())
    }

    async fn toggle_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>, AppError> {
        Ok(self
            .tables
            .tasks
            .get_mut(&task_key(owner, task_id))
            .map(|mut task| {
                task.completed = !task.completed;
                task.updated_at = Utc::now();
                task.clone()
            }))
    }

    async fn task_stats(&self, owner: &str) -> Result<TaskStats, AppError> {
        Ok(TaskStats::from_tasks(&self.owned_tasks(owner)))
    }
}
