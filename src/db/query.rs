// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task list filtering, ordering and pagination.
//!
//! Both store backends hand the owner's candidate tasks to
//! [`TaskQuery::execute`], which restricts to the owner before applying any
//! other predicate.

use crate::error::AppError;
use crate::models::Task;
use std::cmp::Ordering;
use std::str::FromStr;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Field to order task lists by (always descending).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Title,
    Category,
    Completed,
}

impl SortField {
    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Category => a.category.cmp(&b.category),
            SortField::Completed => a.completed.cmp(&b.completed),
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            "dueDate" | "due_date" => Ok(SortField::DueDate),
            "title" => Ok(SortField::Title),
            "category" => Ok(SortField::Category),
            "completed" => Ok(SortField::Completed),
            other => Err(AppError::BadRequest(format!(
                "Invalid 'sortBy' parameter: unknown field '{other}'"
            ))),
        }
    }
}

/// Filters and paging for listing one account's tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    /// `None` means both pending and completed tasks
    pub completed: Option<bool>,
    /// Exact category match
    pub category: Option<String>,
    /// Whitespace-separated terms matched against title and description
    pub search: Option<String>,
    pub sort_by: SortField,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            completed: None,
            category: None,
            search: None,
            sort_by: SortField::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a task listing.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    /// Number of tasks matching the filters, before pagination
    pub total: u64,
}

impl TaskQuery {
    /// Whether `task` passes the completion, category and search filters.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if task.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(search) if !search.is_empty() => matches_search(task, search),
            _ => true,
        }
    }

    /// Run the query over candidate tasks.
    ///
    /// Tasks not owned by `owner` are dropped first, whatever the backend
    /// handed over.
    pub fn execute(&self, owner: &str, tasks: impl IntoIterator<Item = Task>) -> TaskPage {
        let mut matching: Vec<Task> = tasks
            .into_iter()
            .filter(|task| task.user_id == owner)
            .filter(|task| self.matches(task))
            .collect();

        let total = matching.len() as u64;

        // Descending, ties broken by ID so pages never overlap.
        matching.sort_by(|a, b| {
            self.sort_by
                .compare(b, a)
                .then_with(|| b.id.cmp(&a.id))
        });

        let limit = self.limit.clamp(1, MAX_PAGE_SIZE) as usize;
        let offset = (self.page.max(1) as usize - 1).saturating_mul(limit);

        let tasks = matching.into_iter().skip(offset).take(limit).collect();

        TaskPage { tasks, total }
    }
}

fn matches_search(task: &Task, search: &str) -> bool {
    let mut haystack = task.title.to_lowercase();
    if let Some(description) = &task.description {
        haystack.push(' ');
        haystack.push_str(&description.to_lowercase());
    }

    search
        .split_whitespace()
        .any(|term| haystack.contains(&term.to_lowercase()))
}
