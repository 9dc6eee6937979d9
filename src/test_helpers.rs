//! Test helper factories and mock state builders
//!
//! Provides convenience functions for creating test objects with sensible defaults,
//! and helpers for building mock AppState / ServerState instances.
#![allow(dead_code)]

use crate::api::handlers::{ServerState, TrackerState};
use crate::neo4j::mock::MockStore;
use crate::neo4j::models::*;
use crate::{AppState, AuthConfig, Config};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// JWT secret used by [`test_auth_config`]
pub const TEST_SECRET: &str = "test-secret-key-minimum-32-chars!!";

// ============================================================================
// Mock state builders
// ============================================================================

fn mock_config(auth_config: Option<AuthConfig>) -> Config {
    Config {
        neo4j_uri: "bolt://mock:7687".to_string(),
        neo4j_user: "neo4j".to_string(),
        neo4j_password: "mock".to_string(),
        server_port: 0,
        mutation_timeout: Duration::from_secs(5),
        auth_config,
    }
}

/// Create a mock AppState with an empty in-memory store
pub fn mock_app_state() -> AppState {
    mock_app_state_with(MockStore::new(), None)
}

/// Create a mock AppState over a pre-seeded store
pub fn mock_app_state_with(store: MockStore, auth_config: Option<AuthConfig>) -> AppState {
    AppState {
        store: Arc::new(store),
        config: Arc::new(mock_config(auth_config)),
    }
}

/// Create server state over an empty in-memory store
pub fn mock_server_state(auth_config: Option<AuthConfig>) -> TrackerState {
    Arc::new(ServerState::new(
        mock_app_state_with(MockStore::new(), auth_config),
        CancellationToken::new(),
    ))
}

/// Create a test AuthConfig with Google sign-in enabled.
///
/// bcrypt cost is kept at the minimum so password tests stay fast.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        access_token_expiry_secs: 900,
        refresh_token_expiry_secs: 604800,
        bcrypt_cost: 4,
        frontend_url: Some("http://localhost:3000".to_string()),
        allow_registration: true,
        google_client_id: Some("123456.apps.googleusercontent.com".to_string()),
        google_client_secret: Some("test-client-secret".to_string()),
        google_redirect_uri: Some("http://localhost:8080/api/session/oauth/google".to_string()),
    }
}

/// Generate a valid Bearer header value for `user`.
pub fn test_bearer_token(user: &UserNode) -> String {
    let token = crate::auth::jwt::encode_jwt(
        user.id,
        Uuid::new_v4(),
        &user.email,
        &user.username,
        TEST_SECRET,
        3600,
    )
    .expect("test token encoding should succeed");
    format!("Bearer {}", token)
}

// ============================================================================
// Test data factories
// ============================================================================

/// A password-less user named `username`
pub fn test_user(username: &str) -> UserNode {
    UserNode {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: None,
        picture: None,
        journey_duration: None,
        allocated_time: 0.0,
        created_at: Utc::now(),
    }
}

/// A task on `workspace` authored by `author`
pub fn test_task(author: Uuid, workspace: &str, task: &str) -> TaskNode {
    let now = Utc::now();
    TaskNode {
        id: Uuid::new_v4(),
        author,
        workspace: workspace.to_string(),
        task: task.to_string(),
        desc: "description".to_string(),
        stored_time: 0,
        priority: "medium".to_string(),
        complete: false,
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Router helpers
// ============================================================================

/// Build a request with an optional Bearer header and JSON body
pub fn json_request(
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> axum::http::Request<axum::body::Body> {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header("authorization", bearer);
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    }
}

/// Run one request through the router and decode the JSON body (Null when empty)
pub async fn call(
    app: &axum::Router,
    req: axum::http::Request<axum::body::Body>,
) -> (axum::http::StatusCode, axum::http::HeaderMap, serde_json::Value) {
    use tower::ServiceExt;

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, headers, json)
}
