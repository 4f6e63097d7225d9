// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Set FIRESTORE_EMULATOR_HOST to run them; otherwise they are skipped.
//!
//! Each test uses fresh random identities, so no cleanup is needed between
//! runs against the same emulator.

use chrono::Utc;
use taskdeck::db::{AccountStore, SortField, TaskQuery, TaskStore};
use taskdeck::error::AppError;
use taskdeck::models::{Account, AccountChange, NewTask, PreferencesPatch, TaskPatch};

mod common;
use common::{test_db, test_identity};

/// Fresh account with a unique Google subject and email.
fn unique_account() -> Account {
    let subject = format!("fs-{}", uuid::Uuid::new_v4());
    Account::from_identity(&test_identity(&subject), Utc::now())
}

fn new_task(title: &str, category: Option<&str>) -> NewTask {
    NewTask::new(title, None, category.map(str::to_string), None).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// ACCOUNT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_account_create_and_lookup() {
    require_emulator!();

    let db = test_db().await;
    let account = unique_account();

    let before = db.find_account_by_google_id(&account.google_id).await.unwrap();
    assert!(before.is_none(), "Account should not exist before creation");

    db.create_account(&account).await.unwrap();

    let by_id = db.get_account(&account.id).await.unwrap().unwrap();
    assert_eq!(by_id, account);

    let by_google = db
        .find_account_by_google_id(&account.google_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_google.id, account.id);

    println!("✓ Account created and verified: id={}", account.id);
}

#[tokio::test]
async fn test_duplicate_google_id_rejected() {
    require_emulator!();

    let db = test_db().await;
    let first = unique_account();
    db.create_account(&first).await.unwrap();

    let mut second = unique_account();
    second.google_id = first.google_id.clone();

    let result = db.create_account(&second).await;
    assert!(matches!(result, Err(AppError::AccountExists)));

    // The losing attempt must not leave its email claimed.
    let mut third = unique_account();
    third.email = second.email.clone();
    db.create_account(&third).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_email_rejected_case_insensitively() {
    require_emulator!();

    let db = test_db().await;
    let first = unique_account();
    db.create_account(&first).await.unwrap();

    let mut second = unique_account();
    second.email = first.email.to_uppercase();

    let result = db.create_account(&second).await;
    assert!(matches!(result, Err(AppError::AccountExists)));

    // Nor its Google ID.
    let mut third = unique_account();
    third.google_id = second.google_id.clone();
    db.create_account(&third).await.unwrap();
}

#[tokio::test]
async fn test_account_update() {
    require_emulator!();

    let db = test_db().await;
    let account = unique_account();
    db.create_account(&account).await.unwrap();

    let patch: PreferencesPatch =
        serde_json::from_value(serde_json::json!({"theme": "dark"})).unwrap();
    let updated = db
        .update_account(&account.id, &AccountChange::UpdatePreferences(patch))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        updated.preferences.theme,
        taskdeck::models::account::Theme::Dark
    );

    let stored = db.get_account(&account.id).await.unwrap().unwrap();
    assert_eq!(stored, updated);

    let missing = db
        .update_account(
            "no-such-account",
            &AccountChange::UpdatePreferences(PreferencesPatch::default()),
        )
        .await
        .unwrap();
    assert!(missing.is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// TASK TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_task_lifecycle() {
    require_emulator!();

    let db = test_db().await;
    let owner = unique_account().id;

    let task = db.create_task(&owner, new_task("Buy milk", None)).await.unwrap();
    assert_eq!(task.user_id, owner);
    assert!(!task.completed);

    let fetched = db.get_task(&owner, &task.id).await.unwrap().unwrap();
    assert_eq!(fetched, task);

    let toggled = db.toggle_task(&owner, &task.id).await.unwrap().unwrap();
    assert!(toggled.completed);

    let patch: TaskPatch =
        serde_json::from_value(serde_json::json!({"title": "Buy oat milk"})).unwrap();
    let updated = db
        .update_task(&owner, &task.id, &patch.normalize().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Buy oat milk");
    assert!(updated.completed);

    assert!(db.delete_task(&owner, &task.id).await.unwrap());
    assert!(db.get_task(&owner, &task.id).await.unwrap().is_none());
    assert!(!db.delete_task(&owner, &task.id).await.unwrap());
}

#[tokio::test]
async fn test_task_ownership_is_enforced() {
    require_emulator!();

    let db = test_db().await;
    let owner = unique_account().id;
    let intruder = unique_account().id;

    let task = db.create_task(&owner, new_task("Secret", None)).await.unwrap();

    assert!(db.get_task(&intruder, &task.id).await.unwrap().is_none());
    assert!(db.toggle_task(&intruder, &task.id).await.unwrap().is_none());
    assert!(db
        .update_task(&intruder, &task.id, &TaskPatch::default())
        .await
        .unwrap()
        .is_none());
    assert!(!db.delete_task(&intruder, &task.id).await.unwrap());

    let page = db.list_tasks(&intruder, &TaskQuery::default()).await.unwrap();
    assert_eq!(page.total, 0);

    // Untouched for the owner.
    let stored = db.get_task(&owner, &task.id).await.unwrap().unwrap();
    assert_eq!(stored, task);
}

#[tokio::test]
async fn test_task_list_filters_and_stats() {
    require_emulator!();

    let db = test_db().await;
    let owner = unique_account().id;

    let a = db.create_task(&owner, new_task("Alpha", Some("Work"))).await.unwrap();
    db.create_task(&owner, new_task("Beta", Some("Work"))).await.unwrap();
    db.create_task(&owner, new_task("Gamma", None)).await.unwrap();
    db.toggle_task(&owner, &a.id).await.unwrap();

    let query = TaskQuery {
        category: Some("Work".to_string()),
        completed: Some(false),
        ..TaskQuery::default()
    };
    let page = db.list_tasks(&owner, &query).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.tasks[0].title, "Beta");

    let query = TaskQuery {
        sort_by: SortField::Title,
        limit: 2,
        ..TaskQuery::default()
    };
    let page = db.list_tasks(&owner, &query).await.unwrap();
    assert_eq!(page.total, 3);
    let titles: Vec<&str> = page.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Gamma", "Beta"]);

    let stats = db.task_stats(&owner).await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.by_category.get("Work"), Some(&2));
    assert_eq!(stats.by_category.get("Uncategorized"), Some(&1));
}

// ═══════════════════════════════════════════════════════════════════════════
// CONCURRENCY TESTS
// ═══════════════════════════════════════════════════════════════════════════

const NUM_CONCURRENT_TOGGLES: usize = 10;
const NUM_DELETE_RACES: usize = 20;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_are_not_lost() {
    require_emulator!();

    let db = test_db().await;
    let owner = unique_account().id;
    let task = db.create_task(&owner, new_task("Flip me", None)).await.unwrap();

    let mut handles = vec![];
    for _ in 0..NUM_CONCURRENT_TOGGLES {
        let db = db.clone();
        let owner = owner.clone();
        let task_id = task.id.clone();
        handles.push(tokio::spawn(async move {
            db.toggle_task(&owner, &task_id).await
        }));
    }

    for handle in handles {
        let toggled = handle.await.expect("Task join failed").unwrap();
        assert!(toggled.is_some());
    }

    // An even number of flips lands back on the starting state.
    let stored = db.get_task(&owner, &task.id).await.unwrap().unwrap();
    assert!(!stored.completed, "a concurrent toggle was lost");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_update_racing_delete_never_resurrects() {
    require_emulator!();

    let db = test_db().await;
    let owner = unique_account().id;
    let patch: TaskPatch =
        serde_json::from_value(serde_json::json!({"title": "Renamed"})).unwrap();
    let patch = patch.normalize().unwrap();

    for round in 0..NUM_DELETE_RACES {
        let task = db
            .create_task(&owner, new_task(&format!("Doomed {round}"), None))
            .await
            .unwrap();

        let updater = {
            let (db, owner, task_id, patch) =
                (db.clone(), owner.clone(), task.id.clone(), patch.clone());
            tokio::spawn(async move { db.update_task(&owner, &task_id, &patch).await })
        };
        let deleter = {
            let (db, owner, task_id) = (db.clone(), owner.clone(), task.id.clone());
            tokio::spawn(async move { db.delete_task(&owner, &task_id).await })
        };

        updater.await.expect("Task join failed").unwrap();
        let deleted = deleter.await.expect("Task join failed").unwrap();

        assert!(deleted, "round {round}: owner delete must succeed");
        assert!(
            db.get_task(&owner, &task.id).await.unwrap().is_none(),
            "round {round}: deleted task came back"
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_signup_leaves_no_partial_claims() {
    require_emulator!();

    let db = test_db().await;
    let first = unique_account();
    db.create_account(&first).await.unwrap();

    // Fresh Google ID colliding on email only: nothing of it may persist.
    let mut loser = unique_account();
    loser.email = first.email.clone();
    assert!(matches!(
        db.create_account(&loser).await,
        Err(AppError::AccountExists)
    ));
    assert!(db
        .find_account_by_google_id(&loser.google_id)
        .await
        .unwrap()
        .is_none());
    assert!(db.get_account(&loser.id).await.unwrap().is_none());

    let mut retry = unique_account();
    retry.google_id = loser.google_id.clone();
    db.create_account(&retry).await.unwrap();
    let found = db
        .find_account_by_google_id(&retry.google_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, retry.id);
}
