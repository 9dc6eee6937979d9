//! DocumentStore trait definition
//!
//! Defines the abstract interface for all persistence operations.
//! `Neo4jClient` implements it against a Neo4j server; the in-memory
//! `MockStore` implements it for tests.

use crate::neo4j::models::*;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Abstract interface for all document store operations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns true if the backend answers queries
    async fn health_check(&self) -> Result<bool>;

    // ========================================================================
    // User operations
    // ========================================================================

    /// Create a new user
    async fn create_user(&self, user: &UserNode) -> Result<()>;

    /// Get a user by ID
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserNode>>;

    /// Get a user by email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserNode>>;

    /// Get a user by username; usernames are unique and own roadmaps
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserNode>>;

    /// Create or refresh a Google account keyed by email.
    ///
    /// Existing users keep their id, username, password and journey; only the
    /// picture is refreshed. New accounts take `username`, which must be free.
    async fn upsert_google_user(
        &self,
        email: &str,
        username: &str,
        picture: Option<&str>,
    ) -> Result<UserNode>;

    /// Set the journey end date and hour budget
    async fn update_user_journey(
        &self,
        id: Uuid,
        journey_duration: &str,
        allocated_time: f64,
    ) -> Result<Option<UserNode>>;

    // ========================================================================
    // Session operations
    // ========================================================================

    /// Create a new session
    async fn create_session(&self, session: &SessionNode) -> Result<()>;

    /// Get a session by ID
    async fn get_session(&self, id: Uuid) -> Result<Option<SessionNode>>;

    /// Get a session by the SHA-256 digest of its refresh token
    async fn get_session_by_refresh_hash(&self, hash: &str) -> Result<Option<SessionNode>>;

    /// Mark a session invalid. Returns false if no such session exists.
    async fn invalidate_session(&self, id: Uuid) -> Result<bool>;

    // ========================================================================
    // Roadmap operations
    // ========================================================================

    /// All roadmap nodes of an owner, in creation order
    async fn list_roadmap_nodes(&self, owner: &str) -> Result<Vec<RoadmapNode>>;

    /// Insert a roadmap node as-is
    async fn insert_roadmap_node(&self, node: &RoadmapNode) -> Result<()>;

    /// Rename `old_name` to `new_name` and rewrite the first `/old_name/`
    /// segment in every path of the owner that contains it.
    ///
    /// Runs as one unit: either every write lands or none does. Returns
    /// `None` when no node matched `old_name`.
    async fn rename_roadmap_node(
        &self,
        owner: &str,
        old_name: &str,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<RenameOutcome>>;

    /// Delete `name` and every node of the owner whose path contains `/name/`.
    ///
    /// Runs as one unit.
    async fn delete_roadmap_subtree(
        &self,
        owner: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<DeleteOutcome>;

    // ========================================================================
    // Task operations
    // ========================================================================

    /// Create a new task
    async fn create_task(&self, task: &TaskNode) -> Result<()>;

    /// Tasks of an author, newest first
    async fn list_tasks(&self, author: Uuid) -> Result<Vec<TaskNode>>;

    /// Update time spent and completion of an author's task
    async fn update_task(
        &self,
        author: Uuid,
        id: Uuid,
        stored_time: i64,
        complete: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<TaskNode>>;

    /// Delete an author's task, returning it
    async fn delete_task(&self, author: Uuid, id: Uuid) -> Result<Option<TaskNode>>;

    /// Move every task of the author into history in one unit.
    /// Returns the number of archived tasks.
    async fn archive_tasks(&self, author: Uuid) -> Result<usize>;

    /// History of an author, newest first
    async fn list_history(&self, author: Uuid) -> Result<Vec<HistoryNode>>;

    // ========================================================================
    // Bot operations
    // ========================================================================

    /// Create a bot role
    async fn create_bot_role(&self, role: &BotRoleNode) -> Result<()>;

    /// Roles of a user
    async fn list_bot_roles(&self, user: Uuid) -> Result<Vec<BotRoleNode>>;

    /// Delete a user's role and the questions stored under it
    async fn delete_bot_role(&self, user: Uuid, id: Uuid) -> Result<Option<BotRoleNode>>;

    /// Remember a question
    async fn create_bot_message(&self, message: &BotMessageNode) -> Result<()>;

    /// One uniformly random question stored under `(user, role)`
    async fn random_bot_message(&self, user: Uuid, role: &str) -> Result<Option<BotMessageNode>>;
}
