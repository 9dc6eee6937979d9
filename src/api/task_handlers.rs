//! Task board and history API handlers

use crate::api::handlers::{AppError, TrackerState};
use crate::auth::extractor::AuthUser;
use crate::neo4j::models::{HistoryNode, TaskNode};
use crate::tasks::{HistoryAmount, HistoryFilter, NewTask, TaskError, TaskUpdate};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

/// Query of GET /api/day-finish
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub amount: Option<String>,
}

/// POST /api/task
pub async fn create_task(
    State(state): State<TrackerState>,
    user: AuthUser,
    Json(req): Json<NewTask>,
) -> Result<(StatusCode, Json<TaskNode>), AppError> {
    let task = state.tasks.create_task(user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/task - Today's board, newest first
pub async fn list_tasks(
    State(state): State<TrackerState>,
    user: AuthUser,
) -> Result<Json<Vec<TaskNode>>, AppError> {
    Ok(Json(state.tasks.list_tasks(user.user_id).await?))
}

/// PUT /api/task/{task_id}
pub async fn update_task(
    State(state): State<TrackerState>,
    user: AuthUser,
    Path(task_id): Path<Uuid>,
    Json(req): Json<TaskUpdate>,
) -> Result<(StatusCode, Json<TaskNode>), AppError> {
    let task = state.tasks.update_task(user.user_id, task_id, req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// DELETE /api/task/{task_id}
pub async fn delete_task(
    State(state): State<TrackerState>,
    user: AuthUser,
    Path(task_id): Path<Uuid>,
) -> Result<(StatusCode, Json<TaskNode>), AppError> {
    let task = state.tasks.delete_task(user.user_id, task_id).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// POST /api/day-finish - Archive the board; answers the whole history oldest first
pub async fn finish_day(
    State(state): State<TrackerState>,
    user: AuthUser,
) -> Result<(StatusCode, Json<Vec<HistoryNode>>), AppError> {
    let mut history = state.tasks.finish_day(user.user_id).await?;
    history.reverse();
    Ok((StatusCode::CREATED, Json(history)))
}

/// GET /api/day-finish?amount=all - History, newest first
pub async fn get_history(
    State(state): State<TrackerState>,
    user: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryNode>>, AppError> {
    let amount = HistoryAmount::from_query(query.amount.as_deref());
    Ok(Json(state.tasks.history(user.user_id, amount).await?))
}

/// GET /api/filter-history?<field>=<value>
///
/// Only the first query pair is used.
pub async fn filter_history(
    State(state): State<TrackerState>,
    user: AuthUser,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<HistoryNode>>, AppError> {
    let (field, value) = params.first().ok_or(TaskError::NoCriteria)?;
    let filter = HistoryFilter::parse(field, value)?;
    Ok(Json(state.tasks.filter_history(user.user_id, &filter).await?))
}
