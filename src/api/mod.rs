//! HTTP API for the task tracker

pub mod auth_handlers;
pub mod bot_handlers;
pub mod handlers;
pub mod roadmap_handlers;
pub mod routes;
pub mod stats_handlers;
pub mod task_handlers;

pub use routes::create_router;
