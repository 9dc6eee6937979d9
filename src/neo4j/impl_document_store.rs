//! `DocumentStore` implementation for `Neo4jClient`.
//!
//! Every method delegates to the corresponding inherent method on `Neo4jClient`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::client::Neo4jClient;
use super::models::*;
use super::traits::DocumentStore;

#[async_trait]
impl DocumentStore for Neo4jClient {
    async fn health_check(&self) -> anyhow::Result<bool> {
        self.health_check().await
    }

    // ========================================================================
    // User operations
    // ========================================================================

    async fn create_user(&self, user: &UserNode) -> anyhow::Result<()> {
        self.create_user(user).await
    }

    async fn get_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserNode>> {
        self.get_user_by_id(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserNode>> {
        self.get_user_by_email(email).await
    }

    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<UserNode>> {
        self.get_user_by_username(username).await
    }

    async fn upsert_google_user(
        &self,
        email: &str,
        username: &str,
        picture: Option<&str>,
    ) -> anyhow::Result<UserNode> {
        self.upsert_google_user(email, username, picture).await
    }

    async fn update_user_journey(
        &self,
        id: Uuid,
        journey_duration: &str,
        allocated_time: f64,
    ) -> anyhow::Result<Option<UserNode>> {
        self.update_user_journey(id, journey_duration, allocated_time)
            .await
    }

    // ========================================================================
    // Session operations
    // ========================================================================

    async fn create_session(&self, session: &SessionNode) -> anyhow::Result<()> {
        self.create_session(session).await
    }

    async fn get_session(&self, id: Uuid) -> anyhow::Result<Option<SessionNode>> {
        self.get_session(id).await
    }

    async fn get_session_by_refresh_hash(
        &self,
        hash: &str,
    ) -> anyhow::Result<Option<SessionNode>> {
        self.get_session_by_refresh_hash(hash).await
    }

    async fn invalidate_session(&self, id: Uuid) -> anyhow::Result<bool> {
        self.invalidate_session(id).await
    }

    // ========================================================================
    // Roadmap operations
    // ========================================================================

    async fn list_roadmap_nodes(&self, owner: &str) -> anyhow::Result<Vec<RoadmapNode>> {
        self.list_roadmap_nodes(owner).await
    }

    async fn insert_roadmap_node(&self, node: &RoadmapNode) -> anyhow::Result<()> {
        self.insert_roadmap_node(node).await
    }

    async fn rename_roadmap_node(
        &self,
        owner: &str,
        old_name: &str,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Option<RenameOutcome>> {
        self.rename_roadmap_node(owner, old_name, new_name, cancel)
            .await
    }

    async fn delete_roadmap_subtree(
        &self,
        owner: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> anyhow::Result<DeleteOutcome> {
        self.delete_roadmap_subtree(owner, name, cancel).await
    }

    // ========================================================================
    // Task operations
    // ========================================================================

    async fn create_task(&self, task: &TaskNode) -> anyhow::Result<()> {
        self.create_task(task).await
    }

    async fn list_tasks(&self, author: Uuid) -> anyhow::Result<Vec<TaskNode>> {
        self.list_tasks(author).await
    }

    async fn update_task(
        &self,
        author: Uuid,
        id: Uuid,
        stored_time: i64,
        complete: bool,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<TaskNode>> {
        self.update_task(author, id, stored_time, complete, updated_at)
            .await
    }

    async fn delete_task(&self, author: Uuid, id: Uuid) -> anyhow::Result<Option<TaskNode>> {
        self.delete_task(author, id).await
    }

    async fn archive_tasks(&self, author: Uuid) -> anyhow::Result<usize> {
        self.archive_tasks(author).await
    }

    async fn list_history(&self, author: Uuid) -> anyhow::Result<Vec<HistoryNode>> {
        self.list_history(author).await
    }

    // ========================================================================
    // Bot operations
    // ========================================================================

    async fn create_bot_role(&self, role: &BotRoleNode) -> anyhow::Result<()> {
        self.create_bot_role(role).await
    }

    async fn list_bot_roles(&self, user: Uuid) -> anyhow::Result<Vec<BotRoleNode>> {
        self.list_bot_roles(user).await
    }

    async fn delete_bot_role(
        &self,
        user: Uuid,
        id: Uuid,
    ) -> anyhow::Result<Option<BotRoleNode>> {
        self.delete_bot_role(user, id).await
    }

    async fn create_bot_message(&self, message: &BotMessageNode) -> anyhow::Result<()> {
        self.create_bot_message(message).await
    }

    async fn random_bot_message(
        &self,
        user: Uuid,
        role: &str,
    ) -> anyhow::Result<Option<BotMessageNode>> {
        self.random_bot_message(user, role).await
    }
}
