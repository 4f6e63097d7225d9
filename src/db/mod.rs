//! Database layer.
//!
//! Every task operation takes the caller's account ID as its first argument
//! and matches on it together with the task ID; no method looks a task up
//! by ID alone.

pub mod firestore;
pub mod memory;
pub mod query;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;
pub use query::{SortField, TaskPage, TaskQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::error::AppError;
use crate::models::{Account, AccountChange, NewTask, Task, TaskPatch, TaskStats};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const ACCOUNTS: &str = "accounts";
    /// Uniqueness claims keyed by Google subject ID
    pub const ACCOUNT_GOOGLE_IDS: &str = "account_google_ids";
    /// Uniqueness claims keyed by URL-encoded, lower-cased email
    pub const ACCOUNT_EMAILS: &str = "account_emails";
    pub const TASKS: &str = "tasks";
}

/// Account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>, AppError>;

    async fn find_account_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<Account>, AppError>;

    /// Insert a new account.
    ///
    /// Fails with [`AppError::AccountExists`] if the Google ID or email is
    /// already claimed by another account; nothing is written in that case.
    async fn create_account(&self, account: &Account) -> Result<(), AppError>;

    /// Apply `change` to an account. Returns `None` if it does not exist.
    async fn update_account(
        &self,
        account_id: &str,
        change: &AccountChange,
    ) -> Result<Option<Account>, AppError>;
}

/// Ownership-scoped task persistence.
///
/// "Not found" and "owned by someone else" are indistinguishable: both
/// return `None` / `false`. Errors are reserved for store failures.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, owner: &str, new_task: NewTask) -> Result<Task, AppError>;

    async fn get_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>, AppError>;

    async fn list_tasks(&self, owner: &str, query: &TaskQuery) -> Result<TaskPage, AppError>;

    async fn update_task(
        &self,
        owner: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, AppError>;

    async fn delete_task(&self, owner: &str, task_id: &str) -> Result<bool, AppError>;

    async fn toggle_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>, AppError>;

    async fn task_stats(&self, owner: &str) -> Result<TaskStats, AppError>;
}

/// Full store handle held in [`crate::AppState`].
pub trait Database: AccountStore + TaskStore {}

impl<T: AccountStore + TaskStore> Database for T {}

/// Document ID of an email uniqueness claim.
pub(crate) fn email_key(email: &str) -> String {
    urlencoding::encode(&email.trim().to_lowercase()).into_owned()
}
