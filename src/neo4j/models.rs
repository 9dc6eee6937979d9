//! Stored record types for the document store
//!
//! Each record maps to one Neo4j label. Wire (JSON) field names follow the
//! camelCase contract the frontend already speaks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Users and sessions
// ============================================================================

/// A registered user (local password or Google account)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserNode {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// bcrypt hash; `None` for accounts created through Google OAuth
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub picture: Option<String>,
    /// Journey end date as entered by the user (e.g. `2025-06-30`)
    pub journey_duration: Option<String>,
    /// Hours budgeted for the whole journey
    pub allocated_time: f64,
    pub created_at: DateTime<Utc>,
}

/// A login session. The refresh token itself is never stored, only its SHA-256 digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionNode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub valid: bool,
    pub user_agent: String,
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionNode {
    /// A session can mint access tokens while it is valid and not expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.valid && self.expires_at > now
    }
}

// ============================================================================
// Roadmap
// ============================================================================

/// One element of a user's roadmap tree.
///
/// `path` is the materialized chain of ancestor names, wrapped in slashes
/// (`/Python/OOP/`); children of the root carry `/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoadmapNode {
    pub id: Uuid,
    /// Owner namespace
    pub username: String,
    /// Node label
    pub node: String,
    pub path: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl RoadmapNode {
    pub fn new(username: impl Into<String>, node: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            node: node.into(),
            path: path.into(),
            created_at: Utc::now(),
        }
    }
}

/// Result of a rename cascade
#[derive(Debug, Clone, PartialEq)]
pub struct RenameOutcome {
    pub node: RoadmapNode,
    /// Number of descendants whose path was rewritten
    pub rewritten: usize,
}

/// Result of a subtree delete
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub removed_node: Option<RoadmapNode>,
    pub removed_descendants: usize,
}

// ============================================================================
// Tasks and history
// ============================================================================

/// A task on today's board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub id: Uuid,
    pub author: Uuid,
    pub workspace: String,
    pub task: String,
    pub desc: String,
    /// Seconds spent on the task
    pub stored_time: i64,
    pub priority: String,
    pub complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An archived task. `created_at` is the moment the task was last touched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryNode {
    pub id: Uuid,
    pub author: Uuid,
    pub workspace: String,
    pub task: String,
    pub stored_time: i64,
    pub complete: bool,
    pub priority: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryNode {
    /// Archive a task into a history entry
    pub fn archive(task: &TaskNode) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: task.author,
            workspace: task.workspace.clone(),
            task: task.task.clone(),
            stored_time: task.stored_time,
            complete: task.complete,
            priority: task.priority.clone(),
            created_at: task.updated_at,
        }
    }
}

// ============================================================================
// Bot
// ============================================================================

/// A quiz topic ("role") the bot can be asked about
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotRoleNode {
    pub id: Uuid,
    pub user: Uuid,
    pub role: String,
}

/// A question remembered by the bot under a role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotMessageNode {
    pub id: Uuid,
    pub user: Uuid,
    pub msg: String,
    pub role: String,
}
