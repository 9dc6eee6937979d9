//! Shared server state, health endpoints and error mapping

use crate::auth::google::GoogleOAuthClient;
use crate::bot::{BotError, BotManager};
use crate::neo4j::traits::DocumentStore;
use crate::roadmap::{RoadmapError, RoadmapManager};
use crate::tasks::{TaskError, TaskManager};
use crate::{AppState, AuthConfig};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared server state
pub struct ServerState {
    pub store: Arc<dyn DocumentStore>,
    pub roadmap: RoadmapManager,
    pub tasks: TaskManager,
    pub bot: BotManager,
    /// Auth config - None means deny-by-default
    pub auth_config: Option<AuthConfig>,
    /// None unless every Google OAuth field is configured
    pub google: Option<GoogleOAuthClient>,
    /// Cancelled on shutdown; roadmap mutations still in flight roll back
    pub shutdown: CancellationToken,
}

/// Shared tracker state
pub type TrackerState = Arc<ServerState>;

impl ServerState {
    pub fn new(state: AppState, shutdown: CancellationToken) -> Self {
        let auth_config = state.config.auth_config.clone();
        let google = auth_config.as_ref().and_then(GoogleOAuthClient::from_config);
        Self {
            roadmap: RoadmapManager::new(state.store.clone())
                .with_mutation_timeout(state.config.mutation_timeout),
            tasks: TaskManager::new(state.store.clone()),
            bot: BotManager::new(state.store.clone()),
            store: state.store,
            auth_config,
            google,
            shutdown,
        }
    }

    /// Token for one roadmap mutation, cancelled together with the server
    pub fn mutation_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

// ============================================================================
// Health check
// ============================================================================

/// Per-service health status in the health response
#[derive(Serialize)]
pub struct ServiceHealthStatus {
    pub neo4j: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealthStatus,
}

/// Health check handler - verifies actual connectivity to Neo4j.
///
/// Returns 200 + `"ok"` when connected, 503 + `"unhealthy"` otherwise.
pub async fn health(State(state): State<TrackerState>) -> (StatusCode, Json<HealthResponse>) {
    let neo4j_ok = state.store.health_check().await.unwrap_or(false);

    let (http_status, status, neo4j) = if neo4j_ok {
        (StatusCode::OK, "ok", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "disconnected")
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealthStatus {
                neo4j: neo4j.to_string(),
            },
        }),
    )
}

/// GET / - liveness banner
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "msg": "Everything looks good..." }))
}

// ============================================================================
// Error handling
// ============================================================================

/// Application error type
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    ServiceUnavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<RoadmapError> for AppError {
    fn from(err: RoadmapError) -> Self {
        match err {
            RoadmapError::Empty => AppError::NotFound(err.to_string()),
            RoadmapError::DuplicateName(_) => AppError::Conflict(err.to_string()),
            RoadmapError::Cancelled | RoadmapError::DeadlineExceeded(_) => {
                AppError::ServiceUnavailable(err.to_string())
            }
            RoadmapError::Structure(e) => AppError::Internal(e.into()),
            RoadmapError::Store(e) => AppError::Internal(e),
            RoadmapError::CreateFailed(ref source) => {
                tracing::warn!("Roadmap insert failed: {:#}", source);
                AppError::BadRequest(err.to_string())
            }
            RoadmapError::InvalidName(_)
            | RoadmapError::MalformedPath(_)
            | RoadmapError::PathNotFound(_)
            | RoadmapError::RenameFailed
            | RoadmapError::RemoveFailed => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound => AppError::NotFound(err.to_string()),
            TaskError::Store(e) => AppError::Internal(e),
            TaskError::MissingField(_)
            | TaskError::StoredTimeOutOfRange
            | TaskError::NoCriteria
            | TaskError::UnknownField(_)
            | TaskError::KindMismatch { .. }
            | TaskError::InvalidPattern(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<BotError> for AppError {
    fn from(err: BotError) -> Self {
        match err {
            BotError::Store(e) => AppError::Internal(e),
            BotError::EmptyRole | BotError::RoleNotFound | BotError::InvalidPattern(_) => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}
