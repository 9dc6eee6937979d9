//! In-memory mock implementation of DocumentStore for testing.
//!
//! Keeps every label in a `tokio::sync::RwLock` collection. Ordered labels
//! use `Vec` so that insertion order doubles as creation order.
//! Conditionally compiled with `#[cfg(test)]`.

use crate::neo4j::models::*;
use crate::neo4j::traits::DocumentStore;
use crate::neo4j::WriteCancelled;
use crate::roadmap::path::{is_below, rewrite_segment};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// In-memory mock implementation of DocumentStore for testing.
#[derive(Default)]
pub struct MockStore {
    pub users: RwLock<HashMap<Uuid, UserNode>>,
    pub sessions: RwLock<HashMap<Uuid, SessionNode>>,
    pub roadmap: RwLock<Vec<RoadmapNode>>,
    pub tasks: RwLock<Vec<TaskNode>>,
    pub history: RwLock<Vec<HistoryNode>>,
    pub bot_roles: RwLock<Vec<BotRoleNode>>,
    pub bot_messages: RwLock<Vec<BotMessageNode>>,
}

impl MockStore {
    /// Create a new empty MockStore.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MockStore {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    // ========================================================================
    // User operations
    // ========================================================================

    async fn create_user(&self, user: &UserNode) -> Result<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            anyhow::bail!("User with email {} already exists", user.email);
        }
        if users.values().any(|u| u.username == user.username) {
            anyhow::bail!("User with username {} already exists", user.username);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserNode>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserNode>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserNode>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn upsert_google_user(
        &self,
        email: &str,
        username: &str,
        picture: Option<&str>,
    ) -> Result<UserNode> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.values_mut().find(|u| u.email == email) {
            existing.picture = picture.map(str::to_string);
            return Ok(existing.clone());
        }
        if users.values().any(|u| u.username == username) {
            anyhow::bail!("User with username {} already exists", username);
        }
        let user = UserNode {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: None,
            picture: picture.map(str::to_string),
            journey_duration: None,
            allocated_time: 0.0,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user_journey(
        &self,
        id: Uuid,
        journey_duration: &str,
        allocated_time: f64,
    ) -> Result<Option<UserNode>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|u| {
            u.journey_duration = Some(journey_duration.to_string());
            u.allocated_time = allocated_time;
            u.clone()
        }))
    }

    // ========================================================================
    // Session operations
    // ========================================================================

    async fn create_session(&self, session: &SessionNode) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<SessionNode>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn get_session_by_refresh_hash(&self, hash: &str) -> Result<Option<SessionNode>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.refresh_token_hash == hash)
            .cloned())
    }

    async fn invalidate_session(&self, id: Uuid) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        Ok(match sessions.get_mut(&id) {
            Some(s) => {
                s.valid = false;
                true
            }
            None => false,
        })
    }

    // ========================================================================
    // Roadmap operations
    // ========================================================================

    async fn list_roadmap_nodes(&self, owner: &str) -> Result<Vec<RoadmapNode>> {
        Ok(self
            .roadmap
            .read()
            .await
            .iter()
            .filter(|n| n.username == owner)
            .cloned()
            .collect())
    }

    async fn insert_roadmap_node(&self, node: &RoadmapNode) -> Result<()> {
        self.roadmap.write().await.push(node.clone());
        Ok(())
    }

    async fn rename_roadmap_node(
        &self,
        owner: &str,
        old_name: &str,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<RenameOutcome>> {
        let mut roadmap = self.roadmap.write().await;

        // Work on a copy and swap it in at the end
        let mut staged = roadmap.clone();
        let Some(target) = staged
            .iter_mut()
            .find(|n| n.username == owner && n.node == old_name)
        else {
            return Ok(None);
        };
        target.node = new_name.to_string();
        let node = target.clone();

        let mut rewritten = 0;
        for entry in staged.iter_mut().filter(|n| n.username == owner) {
            if let Some(path) = rewrite_segment(&entry.path, old_name, new_name) {
                if cancel.is_cancelled() {
                    return Err(WriteCancelled.into());
                }
                entry.path = path;
                rewritten += 1;
            }
        }

        if cancel.is_cancelled() {
            return Err(WriteCancelled.into());
        }
        *roadmap = staged;
        Ok(Some(RenameOutcome { node, rewritten }))
    }

    async fn delete_roadmap_subtree(
        &self,
        owner: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<DeleteOutcome> {
        let mut roadmap = self.roadmap.write().await;

        let Some(index) = roadmap
            .iter()
            .position(|n| n.username == owner && n.node == name)
        else {
            return Ok(DeleteOutcome {
                removed_node: None,
                removed_descendants: 0,
            });
        };

        if cancel.is_cancelled() {
            return Err(WriteCancelled.into());
        }

        let mut staged = roadmap.clone();
        let removed = staged.remove(index);
        let before = staged.len();
        staged.retain(|n| !(n.username == owner && is_below(&n.path, name)));
        let removed_descendants = before - staged.len();

        *roadmap = staged;
        Ok(DeleteOutcome {
            removed_node: Some(removed),
            removed_descendants,
        })
    }

    // ========================================================================
    // Task operations
    // ========================================================================

    async fn create_task(&self, task: &TaskNode) -> Result<()> {
        self.tasks.write().await.push(task.clone());
        Ok(())
    }

    async fn list_tasks(&self, author: Uuid) -> Result<Vec<TaskNode>> {
        let mut tasks: Vec<TaskNode> = self
            .tasks
            .read()
            .await
            .iter()
            .filter(|t| t.author == author)
            .cloned()
            .collect();
        tasks.reverse();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update_task(
        &self,
        author: Uuid,
        id: Uuid,
        stored_time: i64,
        complete: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<TaskNode>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks
            .iter_mut()
            .find(|t| t.id == id && t.author == author)
            .map(|t| {
                t.stored_time = stored_time;
                t.complete = complete;
                t.updated_at = updated_at;
                t.clone()
            }))
    }

    async fn delete_task(&self, author: Uuid, id: Uuid) -> Result<Option<TaskNode>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks
            .iter()
            .position(|t| t.id == id && t.author == author)
            .map(|i| tasks.remove(i)))
    }

    async fn archive_tasks(&self, author: Uuid) -> Result<usize> {
        // Both locks are held for the whole move
        let mut tasks = self.tasks.write().await;
        let mut history = self.history.write().await;

        let (archived, kept): (Vec<TaskNode>, Vec<TaskNode>) =
            tasks.drain(..).partition(|t| t.author == author);
        *tasks = kept;
        history.extend(archived.iter().map(HistoryNode::archive));
        Ok(archived.len())
    }

    async fn list_history(&self, author: Uuid) -> Result<Vec<HistoryNode>> {
        let mut entries: Vec<HistoryNode> = self
            .history
            .read()
            .await
            .iter()
            .filter(|h| h.author == author)
            .cloned()
            .collect();
        entries.reverse();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    // ========================================================================
    // Bot operations
    // ========================================================================

    async fn create_bot_role(&self, role: &BotRoleNode) -> Result<()> {
        self.bot_roles.write().await.push(role.clone());
        Ok(())
    }

    async fn list_bot_roles(&self, user: Uuid) -> Result<Vec<BotRoleNode>> {
        let mut roles: Vec<BotRoleNode> = self
            .bot_roles
            .read()
            .await
            .iter()
            .filter(|r| r.user == user)
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.role.cmp(&b.role));
        Ok(roles)
    }

    async fn delete_bot_role(&self, user: Uuid, id: Uuid) -> Result<Option<BotRoleNode>> {
        let mut roles = self.bot_roles.write().await;
        let Some(index) = roles.iter().position(|r| r.id == id && r.user == user) else {
            return Ok(None);
        };
        let role = roles.remove(index);
        self.bot_messages
            .write()
            .await
            .retain(|m| !(m.user == user && m.role == role.role));
        Ok(Some(role))
    }

    async fn create_bot_message(&self, message: &BotMessageNode) -> Result<()> {
        self.bot_messages.write().await.push(message.clone());
        Ok(())
    }

    async fn random_bot_message(&self, user: Uuid, role: &str) -> Result<Option<BotMessageNode>> {
        let messages = self.bot_messages.read().await;
        let matching: Vec<&BotMessageNode> = messages
            .iter()
            .filter(|m| m.user == user && m.role == role)
            .collect();
        if matching.is_empty() {
            return Ok(None);
        }
        let pick = rand::random::<u64>() as usize % matching.len();
        Ok(Some(matching[pick].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rename_rewrites_only_matching_owner() {
        let store = MockStore::new();
        for node in [
            RoadmapNode::new("alice", "Python", "/"),
            RoadmapNode::new("alice", "OOP", "/Python/"),
            RoadmapNode::new("bob", "Python", "/"),
            RoadmapNode::new("bob", "OOP", "/Python/"),
        ] {
            store.insert_roadmap_node(&node).await.unwrap();
        }

        let outcome = store
            .rename_roadmap_node("alice", "Python", "Py3", &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.node.node, "Py3");
        assert_eq!(outcome.rewritten, 1);

        let bob = store.list_roadmap_nodes("bob").await.unwrap();
        assert_eq!(bob[1].path, "/Python/");
    }

    #[tokio::test]
    async fn test_cancelled_rename_leaves_store_untouched() {
        let store = MockStore::new();
        store
            .insert_roadmap_node(&RoadmapNode::new("alice", "Python", "/"))
            .await
            .unwrap();
        store
            .insert_roadmap_node(&RoadmapNode::new("alice", "OOP", "/Python/"))
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = store
            .rename_roadmap_node("alice", "Python", "Py3", &cancel)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<WriteCancelled>().is_some());

        let nodes = store.list_roadmap_nodes("alice").await.unwrap();
        assert_eq!(nodes[0].node, "Python");
        assert_eq!(nodes[1].path, "/Python/");
    }

    #[tokio::test]
    async fn test_archive_moves_only_author_tasks() {
        let store = MockStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let now = Utc::now();
        for author in [alice, alice, bob] {
            store
                .create_task(&TaskNode {
                    id: Uuid::new_v4(),
                    author,
                    workspace: "Rust".into(),
                    task: "Read".into(),
                    desc: String::new(),
                    stored_time: 60,
                    priority: "low".into(),
                    complete: false,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.archive_tasks(alice).await.unwrap(), 2);
        assert!(store.list_tasks(alice).await.unwrap().is_empty());
        assert_eq!(store.list_tasks(bob).await.unwrap().len(), 1);
        assert_eq!(store.list_history(alice).await.unwrap().len(), 2);
        assert!(store.list_history(bob).await.unwrap().is_empty());
    }
}
