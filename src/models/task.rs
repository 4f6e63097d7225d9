// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task model for storage and API.

use crate::error::AppError;
use crate::models::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Bucket used in stats for tasks without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A to-do item owned by exactly one account.
///
/// Stored in the `tasks` collection (document ID = `id`) and returned as-is
/// by the API, so field names are camelCase in both places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Task {
    pub id: String,
    /// Owning account ID. Set at creation and never changed.
    pub user_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a task.
///
/// Only constructible through [`NewTask::new`], so every stored task has a
/// non-empty trimmed title.
#[derive(Debug, Clone)]
pub struct NewTask {
    title: String,
    description: Option<String>,
    category: Option<String>,
    due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(
        title: &str,
        description: Option<String>,
        category: Option<String>,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            title: normalize_title(title)?,
            description: normalize_text(description),
            category: normalize_text(category),
            due_date,
        })
    }

    /// Build the stored task for `owner`. `completed` always starts false.
    pub fn into_task(self, owner: &str, now: DateTime<Utc>) -> Task {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: owner.to_string(),
            title: self.title,
            description: self.description,
            category: self.category,
            due_date: self.due_date,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial task update. Absent fields keep their stored values.
///
/// Has no `userId` field: ownership is immutable and any
/// such key in the request body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub category: Patch<Option<String>>,
    #[serde(default)]
    pub due_date: Patch<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub completed: Patch<bool>,
}

impl TaskPatch {
    /// Trim text fields and reject a blank title.
    pub fn normalize(self) -> Result<Self, AppError> {
        let title = match self.title {
            Patch::Set(title) => Patch::Set(normalize_title(&title)?),
            Patch::Unset => Patch::Unset,
        };

        Ok(Self {
            title,
            description: self.description.map(normalize_text),
            category: self.category.map(normalize_text),
            due_date: self.due_date,
            completed: self.completed,
        })
    }

    pub fn is_empty(&self) -> bool {
        !(self.title.is_set()
            || self.description.is_set()
            || self.category.is_set()
            || self.due_date.is_set()
            || self.completed.is_set())
    }

    /// Merge the set fields into `task`, bumping `updated_at` if anything changed.
    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if self.is_empty() {
            return;
        }

        self.title.clone().apply_to(&mut task.title);
        self.description.clone().apply_to(&mut task.description);
        self.category.clone().apply_to(&mut task.category);
        self.due_date.clone().apply_to(&mut task.due_date);
        self.completed.clone().apply_to(&mut task.completed);
        task.updated_at = now;
    }
}

/// Aggregate counts over one account's tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub by_category: BTreeMap<String, u64>,
}

impl TaskStats {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut stats = Self::default();

        for task in tasks {
            stats.total += 1;
            if task.completed {
                stats.completed += 1;
            } else {
                stats.pending += 1;
            }

            let bucket = task.category.as_deref().unwrap_or(UNCATEGORIZED);
            *stats.by_category.entry(bucket.to_string()).or_insert(0) += 1;
        }

        stats
    }
}

fn normalize_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    Ok(title.to_string())
}

fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
