// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Accounts (profile storage plus uniqueness claims)
//! - Tasks (flat collection, every query filtered by `userId`)

use crate::db::{collections, email_key, AccountStore, TaskPage, TaskQuery, TaskStore};
use crate::error::AppError;
use crate::models::{Account, AccountChange, NewTask, Task, TaskPatch, TaskStats};
use async_trait::async_trait;
use chrono::Utc;
use firestore::errors::{BackoffError, FirestoreError};
use firestore::{FirestoreTransaction, FirestoreWritePrecondition};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};

/// Claim document reserving a Google ID or email for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountClaim {
    account_id: String,
}

/// A create-only write lost to a concurrent writer.
fn is_conflict(err: &FirestoreError) -> bool {
    match err {
        FirestoreError::DataConflictError(_) => true,
        FirestoreError::DatabaseError(e) => e.public.code == "FailedPrecondition",
        _ => false,
    }
}

/// Mutation applied to an owned task inside a transaction.
#[derive(Clone)]
enum TaskWrite {
    Patch(TaskPatch),
    Toggle,
    Delete,
}

/// Read the task, check ownership and write it back in one transaction.
///
/// The read goes through the transaction-bound client, so a concurrent
/// commit to the same document aborts and retries this body.
async fn apply_task_write(
    db: firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    owner: String,
    task_id: String,
    write: TaskWrite,
) -> Result<Option<Task>, BackoffError<FirestoreError>> {
    let current: Option<Task> = db
        .fluent()
        .select()
        .by_id_in(collections::TASKS)
        .obj()
        .one(&task_id)
        .await?;

    let Some(mut task) = current.filter(|t| t.user_id == owner) else {
        return Ok(None);
    };

    match write {
        TaskWrite::Delete => {
            db.fluent()
                .delete()
                .from(collections::TASKS)
                .precondition(FirestoreWritePrecondition::Exists(true))
                .document_id(&task_id)
                .add_to_transaction(transaction)?;
            return Ok(Some(task));
        }
        TaskWrite::Patch(patch) => patch.apply(&mut task, Utc::now()),
        TaskWrite::Toggle => {
            task.completed = !task.completed;
            task.updated_at = Utc::now();
        }
    }

    db.fluent()
        .update()
        .in_col(collections::TASKS)
        .precondition(FirestoreWritePrecondition::Exists(true))
        .document_id(&task_id)
        .object(&task)
        .add_to_transaction(transaction)?;

    Ok(Some(task))
}

async fn apply_account_change(
    db: firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    account_id: String,
    change: AccountChange,
) -> Result<Option<Account>, BackoffError<FirestoreError>> {
    let current: Option<Account> = db
        .fluent()
        .select()
        .by_id_in(collections::ACCOUNTS)
        .obj()
        .one(&account_id)
        .await?;

    let Some(mut account) = current else {
        return Ok(None);
    };

    change.apply(&mut account, Utc::now());

    db.fluent()
        .update()
        .in_col(collections::ACCOUNTS)
        .precondition(FirestoreWritePrecondition::Exists(true))
        .document_id(&account_id)
        .object(&account)
        .add_to_transaction(transaction)?;

    Ok(Some(account))
}

/// Write both identity claims and the account, or nothing.
///
/// Returns `false` when either claim is already taken.
async fn insert_account(
    db: firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    account: Account,
) -> Result<bool, BackoffError<FirestoreError>> {
    let email = email_key(&account.email);
    let claim = AccountClaim {
        account_id: account.id.clone(),
    };

    let by_google: Option<AccountClaim> = db
        .fluent()
        .select()
        .by_id_in(collections::ACCOUNT_GOOGLE_IDS)
        .obj()
        .one(&account.google_id)
        .await?;
    let by_email: Option<AccountClaim> = db
        .fluent()
        .select()
        .by_id_in(collections::ACCOUNT_EMAILS)
        .obj()
        .one(&email)
        .await?;

    if by_google.is_some() || by_email.is_some() {
        return Ok(false);
    }

    db.fluent()
        .update()
        .in_col(collections::ACCOUNT_GOOGLE_IDS)
        .precondition(FirestoreWritePrecondition::Exists(false))
        .document_id(&account.google_id)
        .object(&claim)
        .add_to_transaction(transaction)?;
    db.fluent()
        .update()
        .in_col(collections::ACCOUNT_EMAILS)
        .precondition(FirestoreWritePrecondition::Exists(false))
        .document_id(&email)
        .object(&claim)
        .add_to_transaction(transaction)?;
    db.fluent()
        .update()
        .in_col(collections::ACCOUNTS)
        .precondition(FirestoreWritePrecondition::Exists(false))
        .document_id(&account.id)
        .object(&account)
        .add_to_transaction(transaction)?;

    Ok(true)
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Task Helpers ────────────────────────────────────────────

    /// All tasks owned by `owner`, with simple equality filters pushed down.
    async fn owned_tasks(
        &self,
        owner: &str,
        completed: Option<bool>,
        category: Option<&str>,
    ) -> Result<Vec<Task>, AppError> {
        let owner = owner.to_string();
        let category = category.map(str::to_string);

        self.get_client()?
            .fluent()
            .select()
            .from(collections::TASKS)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(owner.clone()),
                    completed.and_then(|c| q.field("completed").eq(c)),
                    category.clone().and_then(|c| q.field("category").eq(c)),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a task by ID and owner in a single query.
    async fn find_owned_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>, AppError> {
        let owner = owner.to_string();
        let task_id = task_id.to_string();

        let tasks: Vec<Task> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::TASKS)
            .filter(move |q| {
                q.for_all([
                    q.field("id").eq(task_id.clone()),
                    q.field("userId").eq(owner.clone()),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(tasks.into_iter().next())
    }

    async fn write_owned_task(
        &self,
        owner: &str,
        task_id: &str,
        write: TaskWrite,
    ) -> Result<Option<Task>, AppError> {
        let owner = owner.to_string();
        let task_id = task_id.to_string();

        self.get_client()?
            .run_transaction(move |db, transaction| {
                apply_task_write(db, transaction, owner.clone(), task_id.clone(), write.clone())
                    .boxed()
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

// ─── Account Operations ──────────────────────────────────────────

#[async_trait]
impl AccountStore for FirestoreDb {
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACCOUNTS)
            .obj()
            .one(account_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_account_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<Account>, AppError> {
        let claim: Option<AccountClaim> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACCOUNT_GOOGLE_IDS)
            .obj()
            .one(google_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match claim {
            Some(claim) => self.get_account(&claim.account_id).await,
            None => Ok(None),
        }
    }

    /// Claims the Google ID and the email and writes the account in one
    /// transaction. Every write is create-only, so of two concurrent
    /// sign-ups for one identity exactly one commits.
    async fn create_account(&self, account: &Account) -> Result<(), AppError> {
        let pending = account.clone();
        let created = self
            .get_client()?
            .run_transaction(move |db, transaction| {
                insert_account(db, transaction, pending.clone()).boxed()
            })
            .await;

        match created {
            Ok(true) => {
                tracing::info!(account_id = %account.id, "Account created");
                Ok(())
            }
            Ok(false) => Err(AppError::AccountExists),
            Err(e) if is_conflict(&e) => Err(AppError::AccountExists),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn update_account(
        &self,
        account_id: &str,
        change: &AccountChange,
    ) -> Result<Option<Account>, AppError> {
        let account_id = account_id.to_string();
        let change = change.clone();

        self.get_client()?
            .run_transaction(move |db, transaction| {
                apply_account_change(db, transaction, account_id.clone(), change.clone()).boxed()
            })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

// ─── Task Operations ─────────────────────────────────────────────

#[async_trait]
impl TaskStore for FirestoreDb {
    async fn create_task(&self, owner: &str, new_task: NewTask) -> Result<Task, AppError> {
        let task = new_task.into_task(owner, Utc::now());

        let _: Task = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::TASKS)
            .document_id(&task.id)
            .object(&task)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(task)
    }

    async fn get_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>, AppError> {
        self.find_owned_task(owner, task_id).await
    }

    /// Equality filters run in Firestore; search, sort and paging run
    /// in memory since per-account task lists are small.
    async fn list_tasks(&self, owner: &str, query: &TaskQuery) -> Result<TaskPage, AppError> {
        let tasks = self
            .owned_tasks(owner, query.completed, query.category.as_deref())
            .await?;
        Ok(query.execute(owner, tasks))
    }

    async fn update_task(
        &self,
        owner: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        self.write_owned_task(owner, task_id, TaskWrite::Patch(patch.clone()))
            .await
    }

    async fn delete_task(&self, owner: &str, task_id: &str) -> Result<bool, AppError> {
        let deleted = self
            .write_owned_task(owner, task_id, TaskWrite::Delete)
            .await?
            .is_some();
        if deleted {
            tracing::debug!(owner, task_id, "Task deleted");
        }
        Ok(deleted)
    }

    async fn toggle_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>, AppError> {
        self.write_owned_task(owner, task_id, TaskWrite::Toggle).await
    }

    async fn task_stats(&self, owner: &str) -> Result<TaskStats, AppError> {
        let tasks = self.owned_tasks(owner, None, None).await?;
        Ok(TaskStats::from_tasks(&tasks))
    }
}
