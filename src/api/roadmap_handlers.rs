//! Roadmap API handlers
//!
//! Every roadmap route names its owner explicitly; the owner must be the
//! authenticated user.

use crate::api::handlers::{AppError, TrackerState};
use crate::auth::extractor::AuthUser;
use crate::roadmap::{RoadmapSnapshot, TreeNode};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

/// Body of POST /api/node-tree and POST /api/insert-node.
///
/// For insert-node, `path` holds the parent's name.
#[derive(Debug, Deserialize)]
pub struct NodeRequest {
    pub username: String,
    pub node: String,
    pub path: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMethod {
    Update,
    Remove,
}

/// Body of PUT /api/update-node
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNodeRequest {
    pub username: String,
    pub node: String,
    pub updated_node_name: Option<String>,
    pub method: UpdateMethod,
}

fn check_owner(user: &AuthUser, username: &str) -> Result<(), AppError> {
    if user.name != username.trim() {
        return Err(AppError::Forbidden(
            "Roadmaps can only be accessed by their owner".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/node-tree - Create a node at a literal path
pub async fn create_node(
    State(state): State<TrackerState>,
    user: AuthUser,
    Json(req): Json<NodeRequest>,
) -> Result<(StatusCode, Json<RoadmapSnapshot>), AppError> {
    check_owner(&user, &req.username)?;
    state
        .roadmap
        .create_root(&user.name, &req.node, &req.path, &state.mutation_token())
        .await?;
    let snapshot = state.roadmap.snapshot(&user.name).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// POST /api/insert-node - Create a node under an existing parent
pub async fn insert_node(
    State(state): State<TrackerState>,
    user: AuthUser,
    Json(req): Json<NodeRequest>,
) -> Result<(StatusCode, Json<RoadmapSnapshot>), AppError> {
    check_owner(&user, &req.username)?;
    state
        .roadmap
        .insert_under(&user.name, &req.node, &req.path, &state.mutation_token())
        .await?;
    let snapshot = state.roadmap.snapshot(&user.name).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/nodes/{username} - First root's tree, or null
pub async fn get_tree(
    State(state): State<TrackerState>,
    user: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<Option<TreeNode>>, AppError> {
    check_owner(&user, &username)?;
    Ok(Json(state.roadmap.tree(&user.name).await?))
}

/// GET /api/nodes-name/{username} - Node names in creation order
pub async fn get_node_names(
    State(state): State<TrackerState>,
    user: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    check_owner(&user, &username)?;
    Ok(Json(state.roadmap.list_node_names(&user.name).await?))
}

/// PUT /api/update-node - Rename (`method: "update"`) or remove a node
pub async fn update_node(
    State(state): State<TrackerState>,
    user: AuthUser,
    Json(req): Json<UpdateNodeRequest>,
) -> Result<(StatusCode, Json<RoadmapSnapshot>), AppError> {
    check_owner(&user, &req.username)?;
    let cancel = state.mutation_token();

    match req.method {
        UpdateMethod::Update => {
            let new_name = req.updated_node_name.as_deref().unwrap_or("");
            state
                .roadmap
                .rename(&user.name, &req.node, new_name, &cancel)
                .await?;
        }
        UpdateMethod::Remove => {
            state.roadmap.delete(&user.name, &req.node, &cancel).await?;
        }
    }

    let snapshot = state.roadmap.snapshot(&user.name).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}
