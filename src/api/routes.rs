//! API route definitions

use super::handlers::{self, TrackerState};
use super::{auth_handlers, bot_handlers, roadmap_handlers, stats_handlers, task_handlers};
use crate::auth::middleware::{require_auth, NEW_ACCESS_TOKEN_HEADER, REFRESH_HEADER};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// CORS policy: credentials are only allowed for a configured frontend origin
fn cors_layer(state: &TrackerState) -> CorsLayer {
    let frontend = state
        .auth_config
        .as_ref()
        .and_then(|c| c.frontend_url.as_deref())
        .and_then(|url| HeaderValue::from_str(url.trim_end_matches('/')).ok());

    match frontend {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static(REFRESH_HEADER),
            ])
            .expose_headers([HeaderName::from_static(NEW_ACCESS_TOKEN_HEADER)]),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Create the API router
pub fn create_router(state: TrackerState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/register", post(auth_handlers::register))
        .route("/api/login", post(auth_handlers::login))
        .route(
            "/api/session/oauth/google",
            get(auth_handlers::google_callback),
        )
        .route(
            "/api/session/oauth/google/url",
            get(auth_handlers::google_url),
        );

    let protected = Router::new()
        // ====================================================================
        // Account
        // ====================================================================
        .route("/api/find-me", get(auth_handlers::find_me))
        .route("/api/new-journey", put(auth_handlers::new_journey))
        .route("/api/log-out", get(auth_handlers::log_out))
        // ====================================================================
        // Roadmap
        // ====================================================================
        .route("/api/node-tree", post(roadmap_handlers::create_node))
        .route("/api/insert-node", post(roadmap_handlers::insert_node))
        .route("/api/update-node", put(roadmap_handlers::update_node))
        .route("/api/nodes/{username}", get(roadmap_handlers::get_tree))
        .route(
            "/api/nodes-name/{username}",
            get(roadmap_handlers::get_node_names),
        )
        // ====================================================================
        // Tasks and history
        // ====================================================================
        .route(
            "/api/task",
            get(task_handlers::list_tasks).post(task_handlers::create_task),
        )
        .route(
            "/api/task/{task_id}",
            put(task_handlers::update_task).delete(task_handlers::delete_task),
        )
        .route(
            "/api/day-finish",
            get(task_handlers::get_history).post(task_handlers::finish_day),
        )
        .route("/api/filter-history", get(task_handlers::filter_history))
        // Stats
        .route("/api/daily-result", get(stats_handlers::daily_result))
        .route("/api/my-stats", get(stats_handlers::get_my_stats))
        .route(
            "/api/top-workspaces",
            get(stats_handlers::get_top_workspaces),
        )
        // ====================================================================
        // Quiz bot
        // ====================================================================
        .route("/api/bot-message", get(bot_handlers::bot_message))
        .route("/api/create-bot", post(bot_handlers::create_role))
        .route("/api/bot", get(bot_handlers::list_roles))
        .route("/api/bot/{bot_id}", delete(bot_handlers::remove_role))
        .route("/api/search-bot", get(bot_handlers::search_roles))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let cors = cors_layer(&state);

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
