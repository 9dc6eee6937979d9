//! Progress statistics API handlers

use crate::api::handlers::{AppError, TrackerState};
use crate::auth::extractor::AuthUser;
use crate::stats::{daily_results, my_stats, top_workspaces, DailyResult, MyStats, WorkspaceScore};
use crate::tasks::HistoryAmount;
use axum::{extract::State, Json};
use chrono::Utc;

/// GET /api/daily-result - Completion rate per day, oldest first
pub async fn daily_result(
    State(state): State<TrackerState>,
    user: AuthUser,
) -> Result<Json<Vec<DailyResult>>, AppError> {
    let history = state.tasks.history(user.user_id, HistoryAmount::All).await?;
    let mut results = daily_results(&history);
    results.reverse();
    Ok(Json(results))
}

/// GET /api/my-stats - Journey progress as of today (UTC)
pub async fn get_my_stats(
    State(state): State<TrackerState>,
    user: AuthUser,
) -> Result<Json<MyStats>, AppError> {
    let profile = state
        .store
        .get_user_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User was not found".to_string()))?;
    let history = state.tasks.history(user.user_id, HistoryAmount::All).await?;

    Ok(Json(my_stats(&profile, &history, Utc::now().date_naive())))
}

/// GET /api/top-workspaces
pub async fn get_top_workspaces(
    State(state): State<TrackerState>,
    user: AuthUser,
) -> Result<Json<Vec<WorkspaceScore>>, AppError> {
    let history = state.tasks.history(user.user_id, HistoryAmount::All).await?;
    Ok(Json(top_workspaces(&history)))
}
