// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task routes. Every handler scopes its store call to the caller's
//! account from [`CurrentAccount`]; none of them take an owner from the
//! request.

use crate::db::{SortField, TaskQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::{AppError, Result};
use crate::middleware::CurrentAccount;
use crate::models::{NewTask, Task, TaskPatch, TaskStats};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Task routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/stats", get(task_stats))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/toggle", patch(toggle_task))
}

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".to_string())
}

// ─── List ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTasksParams {
    completed: Option<bool>,
    category: Option<String>,
    search: Option<String>,
    sort_by: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

impl ListTasksParams {
    fn into_query(self) -> Result<TaskQuery> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::BadRequest(
                "Page must be greater than 0".to_string(),
            ));
        }

        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit < 1 {
            return Err(AppError::BadRequest(
                "Limit must be greater than 0".to_string(),
            ));
        }

        let sort_by = match self.sort_by.as_deref().map(str::trim) {
            Some(field) if !field.is_empty() => field.parse()?,
            _ => SortField::default(),
        };

        Ok(TaskQuery {
            completed: self.completed,
            category: non_blank(self.category),
            search: non_blank(self.search),
            sort_by,
            page,
            limit: limit.min(MAX_PAGE_SIZE),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    /// Number of tasks matching the filters, across all pages.
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// List the caller's tasks with optional filtering, sorting and paging.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    params: std::result::Result<Query<ListTasksParams>, QueryRejection>,
) -> Result<Json<TaskListResponse>> {
    let Query(params) = params?;
    let query = params.into_query()?;

    tracing::debug!(
        account_id = current.id(),
        completed = ?query.completed,
        category = ?query.category,
        sort_by = ?query.sort_by,
        page = query.page,
        limit = query.limit,
        "Listing tasks"
    );

    let page = state.db.list_tasks(current.id(), &query).await?;

    Ok(Json(TaskListResponse {
        tasks: page.tasks,
        total: page.total,
        page: query.page,
        limit: query.limit,
    }))
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
}

/// Create a task owned by the caller.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    body: std::result::Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>)> {
    let Json(body) = body?;

    let new_task = NewTask::new(
        body.title.as_deref().unwrap_or_default(),
        body.description,
        body.category,
        body.due_date,
    )?;

    let task = state.db.create_task(current.id(), new_task).await?;
    tracing::info!(account_id = current.id(), task_id = %task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

// ─── Single Task ─────────────────────────────────────────────

async fn get_task(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>> {
    state
        .db
        .get_task(current.id(), &task_id)
        .await?
        .map(Json)
        .ok_or_else(task_not_found)
}

/// Apply a partial update. Fields absent from the body are left unchanged.
async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(task_id): Path<String>,
    body: std::result::Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>> {
    let Json(patch) = body?;
    let patch = patch.normalize()?;

    match state.db.update_task(current.id(), &task_id, &patch).await? {
        Some(task) => Ok(Json(task)),
        None => {
            tracing::debug!(account_id = current.id(), task_id = %task_id, "Update missed");
            Err(task_not_found())
        }
    }
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(task_id): Path<String>,
) -> Result<StatusCode> {
    if state.db.delete_task(current.id(), &task_id).await? {
        tracing::info!(account_id = current.id(), task_id = %task_id, "Task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        tracing::debug!(account_id = current.id(), task_id = %task_id, "Delete missed");
        Err(task_not_found())
    }
}

async fn toggle_task(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>> {
    state
        .db
        .toggle_task(current.id(), &task_id)
        .await?
        .map(Json)
        .ok_or_else(task_not_found)
}

// ─── Stats ───────────────────────────────────────────────────

async fn task_stats(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<TaskStats>> {
    Ok(Json(state.db.task_stats(current.id()).await?))
}
