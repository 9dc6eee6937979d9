//! Quiz bot API handlers

use crate::api::handlers::{AppError, TrackerState};
use crate::auth::extractor::AuthUser;
use crate::bot::BotReply;
use crate::neo4j::models::BotRoleNode;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

/// Query of GET /api/bot-message
#[derive(Debug, Deserialize)]
pub struct BotMessageQuery {
    #[serde(default)]
    pub cmd: String,
    #[serde(default)]
    pub role: String,
}

/// Body of POST /api/create-bot
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub role: String,
}

/// Query of GET /api/search-bot
#[derive(Debug, Deserialize)]
pub struct SearchRoleQuery {
    #[serde(default)]
    pub role: String,
}

/// GET /api/bot-message?cmd=&role=
pub async fn bot_message(
    State(state): State<TrackerState>,
    user: AuthUser,
    Query(query): Query<BotMessageQuery>,
) -> Result<Json<BotReply>, AppError> {
    let reply = state.bot.message(user.user_id, &query.cmd, &query.role).await?;
    Ok(Json(reply))
}

/// POST /api/create-bot
pub async fn create_role(
    State(state): State<TrackerState>,
    user: AuthUser,
    Json(req): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<BotRoleNode>), AppError> {
    let role = state.bot.create_role(user.user_id, &req.role).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// GET /api/bot
pub async fn list_roles(
    State(state): State<TrackerState>,
    user: AuthUser,
) -> Result<Json<Vec<BotRoleNode>>, AppError> {
    Ok(Json(state.bot.list_roles(user.user_id).await?))
}

/// DELETE /api/bot/{bot_id}
pub async fn remove_role(
    State(state): State<TrackerState>,
    user: AuthUser,
    Path(bot_id): Path<Uuid>,
) -> Result<(StatusCode, Json<BotRoleNode>), AppError> {
    let role = state.bot.remove_role(user.user_id, bot_id).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// GET /api/search-bot?role=
pub async fn search_roles(
    State(state): State<TrackerState>,
    user: AuthUser,
    Query(query): Query<SearchRoleQuery>,
) -> Result<Json<Vec<BotRoleNode>>, AppError> {
    Ok(Json(state.bot.search_roles(user.user_id, &query.role).await?))
}
