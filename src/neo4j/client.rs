//! Neo4j client for the task tracker's document store

use super::models::*;
use super::WriteCancelled;
use crate::roadmap::path::{rewrite_segment, segment};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use neo4rs::{query, Graph};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

/// Timestamps are stored as fixed-width RFC 3339 strings so that string
/// ordering in Cypher matches chronological ordering.
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn get_timestamp(node: &neo4rs::Node, key: &str) -> Result<DateTime<Utc>> {
    let raw: String = node.get(key)?;
    let parsed = DateTime::parse_from_rfc3339(&raw)
        .with_context(|| format!("Invalid timestamp in '{}': {}", key, raw))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Optional strings are stored as empty strings
fn get_optional(node: &neo4rs::Node, key: &str) -> Option<String> {
    node.get::<String>(key).ok().filter(|s| !s.is_empty())
}

impl Neo4jClient {
    /// Create a new Neo4j client
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize constraints and indexes
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            "CREATE CONSTRAINT user_id IF NOT EXISTS FOR (u:User) REQUIRE u.id IS UNIQUE",
            "CREATE CONSTRAINT user_email IF NOT EXISTS FOR (u:User) REQUIRE u.email IS UNIQUE",
            "CREATE CONSTRAINT user_username IF NOT EXISTS FOR (u:User) REQUIRE u.username IS UNIQUE",
            "CREATE CONSTRAINT session_id IF NOT EXISTS FOR (s:Session) REQUIRE s.id IS UNIQUE",
            "CREATE CONSTRAINT roadmap_node_id IF NOT EXISTS FOR (n:RoadmapNode) REQUIRE n.id IS UNIQUE",
            "CREATE CONSTRAINT task_id IF NOT EXISTS FOR (t:Task) REQUIRE t.id IS UNIQUE",
            "CREATE CONSTRAINT history_id IF NOT EXISTS FOR (h:History) REQUIRE h.id IS UNIQUE",
            "CREATE CONSTRAINT bot_role_id IF NOT EXISTS FOR (r:BotRole) REQUIRE r.id IS UNIQUE",
            "CREATE CONSTRAINT bot_message_id IF NOT EXISTS FOR (m:BotMessage) REQUIRE m.id IS UNIQUE",
        ];

        let indexes = vec![
            "CREATE INDEX session_refresh IF NOT EXISTS FOR (s:Session) ON (s.refresh_token_hash)",
            "CREATE INDEX roadmap_owner IF NOT EXISTS FOR (n:RoadmapNode) ON (n.username)",
            "CREATE INDEX roadmap_owner_node IF NOT EXISTS FOR (n:RoadmapNode) ON (n.username, n.node)",
            "CREATE INDEX task_author IF NOT EXISTS FOR (t:Task) ON (t.author)",
            "CREATE INDEX history_author IF NOT EXISTS FOR (h:History) ON (h.author)",
            "CREATE INDEX bot_role_user IF NOT EXISTS FOR (r:BotRole) ON (r.user)",
            "CREATE INDEX bot_message_user_role IF NOT EXISTS FOR (m:BotMessage) ON (m.user, m.role)",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Index may already exist: {}", e);
            }
        }

        Ok(())
    }

    /// Returns true if the server answers a trivial query
    pub async fn health_check(&self) -> Result<bool> {
        let mut result = self.graph.execute(query("RETURN 1 AS ok")).await?;
        Ok(result.next().await?.is_some())
    }

    // ========================================================================
    // User operations
    // ========================================================================

    /// Create a new user
    pub async fn create_user(&self, user: &UserNode) -> Result<()> {
        let q = query(
            r#"
            CREATE (u:User {
                id: $id,
                username: $username,
                email: $email,
                password_hash: $password_hash,
                picture: $picture,
                journey_duration: $journey_duration,
                allocated_time: $allocated_time,
                created_at: $created_at
            })
            "#,
        )
        .param("id", user.id.to_string())
        .param("username", user.username.clone())
        .param("email", user.email.clone())
        .param("password_hash", user.password_hash.clone().unwrap_or_default())
        .param("picture", user.picture.clone().unwrap_or_default())
        .param(
            "journey_duration",
            user.journey_duration.clone().unwrap_or_default(),
        )
        .param("allocated_time", user.allocated_time)
        .param("created_at", timestamp(&user.created_at));

        self.graph.run(q).await?;
        Ok(())
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserNode>> {
        let q = query("MATCH (u:User {id: $id}) RETURN u").param("id", id.to_string());
        self.fetch_user(q).await
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserNode>> {
        let q = query("MATCH (u:User {email: $email}) RETURN u").param("email", email);
        self.fetch_user(q).await
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserNode>> {
        let q = query("MATCH (u:User {username: $username}) RETURN u").param("username", username);
        self.fetch_user(q).await
    }

    /// Create or refresh a Google account keyed by email
    pub async fn upsert_google_user(
        &self,
        email: &str,
        username: &str,
        picture: Option<&str>,
    ) -> Result<UserNode> {
        let q = query(
            r#"
            MERGE (u:User {email: $email})
            ON CREATE SET
                u.id = $id,
                u.username = $username,
                u.password_hash = '',
                u.picture = $picture,
                u.journey_duration = '',
                u.allocated_time = 0.0,
                u.created_at = $created_at
            ON MATCH SET
                u.picture = $picture
            RETURN u
            "#,
        )
        .param("email", email)
        .param("id", Uuid::new_v4().to_string())
        .param("username", username)
        .param("picture", picture.unwrap_or_default())
        .param("created_at", timestamp(&Utc::now()));

        self.fetch_user(q)
            .await?
            .context("MERGE on User returned no row")
    }

    /// Set the journey end date and hour budget
    pub async fn update_user_journey(
        &self,
        id: Uuid,
        journey_duration: &str,
        allocated_time: f64,
    ) -> Result<Option<UserNode>> {
        let q = query(
            r#"
            MATCH (u:User {id: $id})
            SET u.journey_duration = $journey_duration,
                u.allocated_time = $allocated_time
            RETURN u
            "#,
        )
        .param("id", id.to_string())
        .param("journey_duration", journey_duration)
        .param("allocated_time", allocated_time);

        self.fetch_user(q).await
    }

    async fn fetch_user(&self, q: neo4rs::Query) -> Result<Option<UserNode>> {
        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("u")?;
            Ok(Some(self.node_to_user(&node)?))
        } else {
            Ok(None)
        }
    }

    fn node_to_user(&self, node: &neo4rs::Node) -> Result<UserNode> {
        Ok(UserNode {
            id: node.get::<String>("id")?.parse()?,
            username: node.get("username")?,
            email: node.get("email")?,
            password_hash: get_optional(node, "password_hash"),
            picture: get_optional(node, "picture"),
            journey_duration: get_optional(node, "journey_duration"),
            allocated_time: node.get::<f64>("allocated_time").unwrap_or(0.0),
            created_at: get_timestamp(node, "created_at")?,
        })
    }

    // ========================================================================
    // Session operations
    // ========================================================================

    /// Create a new session
    pub async fn create_session(&self, session: &SessionNode) -> Result<()> {
        let q = query(
            r#"
            CREATE (s:Session {
                id: $id,
                user_id: $user_id,
                valid: $valid,
                user_agent: $user_agent,
                refresh_token_hash: $refresh_token_hash,
                created_at: $created_at,
                expires_at: $expires_at
            })
            "#,
        )
        .param("id", session.id.to_string())
        .param("user_id", session.user_id.to_string())
        .param("valid", session.valid)
        .param("user_agent", session.user_agent.clone())
        .param("refresh_token_hash", session.refresh_token_hash.clone())
        .param("created_at", timestamp(&session.created_at))
        .param("expires_at", timestamp(&session.expires_at));

        self.graph.run(q).await?;
        Ok(())
    }

    /// Get a session by ID
    pub async fn get_session(&self, id: Uuid) -> Result<Option<SessionNode>> {
        let q = query("MATCH (s:Session {id: $id}) RETURN s").param("id", id.to_string());
        self.fetch_session(q).await
    }

    /// Get a session by refresh token digest
    pub async fn get_session_by_refresh_hash(&self, hash: &str) -> Result<Option<SessionNode>> {
        let q = query("MATCH (s:Session {refresh_token_hash: $hash}) RETURN s LIMIT 1")
            .param("hash", hash);
        self.fetch_session(q).await
    }

    /// Mark a session invalid
    pub async fn invalidate_session(&self, id: Uuid) -> Result<bool> {
        let q = query("MATCH (s:Session {id: $id}) SET s.valid = false RETURN s.id AS id")
            .param("id", id.to_string());

        let mut result = self.graph.execute(q).await?;
        Ok(result.next().await?.is_some())
    }

    async fn fetch_session(&self, q: neo4rs::Query) -> Result<Option<SessionNode>> {
        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("s")?;
            Ok(Some(self.node_to_session(&node)?))
        } else {
            Ok(None)
        }
    }

    fn node_to_session(&self, node: &neo4rs::Node) -> Result<SessionNode> {
        Ok(SessionNode {
            id: node.get::<String>("id")?.parse()?,
            user_id: node.get::<String>("user_id")?.parse()?,
            valid: node.get("valid")?,
            user_agent: node.get("user_agent").unwrap_or_default(),
            refresh_token_hash: node.get("refresh_token_hash")?,
            created_at: get_timestamp(node, "created_at")?,
            expires_at: get_timestamp(node, "expires_at")?,
        })
    }

    // ========================================================================
    // Roadmap operations
    // ========================================================================

    /// All roadmap nodes of an owner, in creation order
    pub async fn list_roadmap_nodes(&self, owner: &str) -> Result<Vec<RoadmapNode>> {
        let q = query(
            r#"
            MATCH (n:RoadmapNode {username: $owner})
            RETURN n
            ORDER BY n.created_at ASC
            "#,
        )
        .param("owner", owner);

        let mut result = self.graph.execute(q).await?;
        let mut nodes = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("n")?;
            nodes.push(self.node_to_roadmap(&node)?);
        }
        Ok(nodes)
    }

    /// Insert a roadmap node
    pub async fn insert_roadmap_node(&self, node: &RoadmapNode) -> Result<()> {
        let q = query(
            r#"
            CREATE (n:RoadmapNode {
                id: $id,
                username: $username,
                node: $node,
                path: $path,
                created_at: $created_at
            })
            "#,
        )
        .param("id", node.id.to_string())
        .param("username", node.username.clone())
        .param("node", node.node.clone())
        .param("path", node.path.clone())
        .param("created_at", timestamp(&node.created_at));

        self.graph.run(q).await?;
        Ok(())
    }

    /// Rename a node and rewrite its descendants' paths inside one transaction.
    ///
    /// The cancellation token is checked before every descendant write; once
    /// observed, the transaction is rolled back and [`WriteCancelled`] returned.
    pub async fn rename_roadmap_node(
        &self,
        owner: &str,
        old_name: &str,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<RenameOutcome>> {
        let mut txn = self.graph.start_txn().await?;

        let mut renamed = None;
        let mut stream = txn
            .execute(
                query(
                    r#"
                    MATCH (n:RoadmapNode {username: $owner, node: $old})
                    WITH n ORDER BY n.created_at ASC LIMIT 1
                    SET n.node = $new
                    RETURN n
                    "#,
                )
                .param("owner", owner)
                .param("old", old_name)
                .param("new", new_name),
            )
            .await?;
        while let Some(row) = stream.next(txn.handle()).await? {
            let node: neo4rs::Node = row.get("n")?;
            renamed = Some(self.node_to_roadmap(&node)?);
        }

        let Some(node) = renamed else {
            txn.rollback().await?;
            return Ok(None);
        };

        let mut rewrites = Vec::new();
        let mut stream = txn
            .execute(
                query(
                    r#"
                    MATCH (d:RoadmapNode {username: $owner})
                    WHERE d.path CONTAINS $segment
                    RETURN d.id AS id, d.path AS path
                    "#,
                )
                .param("owner", owner)
                .param("segment", segment(old_name)),
            )
            .await?;
        while let Some(row) = stream.next(txn.handle()).await? {
            let id: String = row.get("id")?;
            let path: String = row.get("path")?;
            if let Some(rewritten) = rewrite_segment(&path, old_name, new_name) {
                rewrites.push((id, rewritten));
            }
        }

        for (id, path) in &rewrites {
            if cancel.is_cancelled() {
                txn.rollback().await?;
                return Err(WriteCancelled.into());
            }
            txn.run(
                query("MATCH (d:RoadmapNode {id: $id}) SET d.path = $path")
                    .param("id", id.clone())
                    .param("path", path.clone()),
            )
            .await?;
        }

        if cancel.is_cancelled() {
            txn.rollback().await?;
            return Err(WriteCancelled.into());
        }
        txn.commit().await?;

        Ok(Some(RenameOutcome {
            node,
            rewritten: rewrites.len(),
        }))
    }

    /// Delete a node and every node below it inside one transaction.
    ///
    /// Nothing is written when the node itself does not exist.
    pub async fn delete_roadmap_subtree(
        &self,
        owner: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<DeleteOutcome> {
        let mut txn = self.graph.start_txn().await?;

        let mut target = None;
        let mut stream = txn
            .execute(
                query(
                    r#"
                    MATCH (n:RoadmapNode {username: $owner, node: $name})
                    RETURN n
                    ORDER BY n.created_at ASC
                    LIMIT 1
                    "#,
                )
                .param("owner", owner)
                .param("name", name),
            )
            .await?;
        while let Some(row) = stream.next(txn.handle()).await? {
            let node: neo4rs::Node = row.get("n")?;
            target = Some(self.node_to_roadmap(&node)?);
        }

        let Some(target) = target else {
            txn.rollback().await?;
            return Ok(DeleteOutcome {
                removed_node: None,
                removed_descendants: 0,
            });
        };

        txn.run(
            query("MATCH (n:RoadmapNode {id: $id}) DELETE n").param("id", target.id.to_string()),
        )
        .await?;

        if cancel.is_cancelled() {
            txn.rollback().await?;
            return Err(WriteCancelled.into());
        }

        let mut removed_descendants = 0usize;
        let mut stream = txn
            .execute(
                query(
                    r#"
                    MATCH (d:RoadmapNode {username: $owner})
                    WHERE d.path CONTAINS $segment
                    DELETE d
                    RETURN count(*) AS removed
                    "#,
                )
                .param("owner", owner)
                .param("segment", segment(name)),
            )
            .await?;
        while let Some(row) = stream.next(txn.handle()).await? {
            removed_descendants = row.get::<i64>("removed")?.max(0) as usize;
        }

        if cancel.is_cancelled() {
            txn.rollback().await?;
            return Err(WriteCancelled.into());
        }
        txn.commit().await?;

        Ok(DeleteOutcome {
            removed_node: Some(target),
            removed_descendants,
        })
    }

    fn node_to_roadmap(&self, node: &neo4rs::Node) -> Result<RoadmapNode> {
        Ok(RoadmapNode {
            id: node.get::<String>("id")?.parse()?,
            username: node.get("username")?,
            node: node.get("node")?,
            path: node.get("path")?,
            created_at: get_timestamp(node, "created_at")?,
        })
    }

    // ========================================================================
    // Task operations
    // ========================================================================

    /// Create a new task
    pub async fn create_task(&self, task: &TaskNode) -> Result<()> {
        let q = query(
            r#"
            CREATE (t:Task {
                id: $id,
                author: $author,
                workspace: $workspace,
                task: $task,
                desc: $desc,
                stored_time: $stored_time,
                priority: $priority,
                complete: $complete,
                created_at: $created_at,
                updated_at: $updated_at
            })
            "#,
        )
        .param("id", task.id.to_string())
        .param("author", task.author.to_string())
        .param("workspace", task.workspace.clone())
        .param("task", task.task.clone())
        .param("desc", task.desc.clone())
        .param("stored_time", task.stored_time)
        .param("priority", task.priority.clone())
        .param("complete", task.complete)
        .param("created_at", timestamp(&task.created_at))
        .param("updated_at", timestamp(&task.updated_at));

        self.graph.run(q).await?;
        Ok(())
    }

    /// Tasks of an author, newest first
    pub async fn list_tasks(&self, author: Uuid) -> Result<Vec<TaskNode>> {
        let q = query(
            r#"
            MATCH (t:Task {author: $author})
            RETURN t
            ORDER BY t.created_at DESC
            "#,
        )
        .param("author", author.to_string());

        let mut result = self.graph.execute(q).await?;
        let mut tasks = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("t")?;
            tasks.push(self.node_to_task(&node)?);
        }
        Ok(tasks)
    }

    /// Update time spent and completion of an author's task
    pub async fn update_task(
        &self,
        author: Uuid,
        id: Uuid,
        stored_time: i64,
        complete: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<TaskNode>> {
        let q = query(
            r#"
            MATCH (t:Task {id: $id, author: $author})
            SET t.stored_time = $stored_time,
                t.complete = $complete,
                t.updated_at = $updated_at
            RETURN t
            "#,
        )
        .param("id", id.to_string())
        .param("author", author.to_string())
        .param("stored_time", stored_time)
        .param("complete", complete)
        .param("updated_at", timestamp(&updated_at));

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("t")?;
            Ok(Some(self.node_to_task(&node)?))
        } else {
            Ok(None)
        }
    }

    /// Delete an author's task
    pub async fn delete_task(&self, author: Uuid, id: Uuid) -> Result<Option<TaskNode>> {
        let mut txn = self.graph.start_txn().await?;

        let mut task = None;
        let mut stream = txn
            .execute(
                query("MATCH (t:Task {id: $id, author: $author}) RETURN t")
                    .param("id", id.to_string())
                    .param("author", author.to_string()),
            )
            .await?;
        while let Some(row) = stream.next(txn.handle()).await? {
            let node: neo4rs::Node = row.get("t")?;
            task = Some(self.node_to_task(&node)?);
        }

        if task.is_some() {
            txn.run(query("MATCH (t:Task {id: $id}) DELETE t").param("id", id.to_string()))
                .await?;
            txn.commit().await?;
        } else {
            txn.rollback().await?;
        }
        Ok(task)
    }

    /// Move every task of the author into history.
    ///
    /// A single statement, so the copy and the delete commit together.
    pub async fn archive_tasks(&self, author: Uuid) -> Result<usize> {
        let q = query(
            r#"
            MATCH (t:Task {author: $author})
            CREATE (h:History {
                id: randomUUID(),
                author: t.author,
                workspace: t.workspace,
                task: t.task,
                stored_time: t.stored_time,
                complete: t.complete,
                priority: t.priority,
                created_at: t.updated_at
            })
            DELETE t
            RETURN count(h) AS archived
            "#,
        )
        .param("author", author.to_string());

        let mut result = self.graph.execute(q).await?;
        let mut archived = 0usize;
        while let Some(row) = result.next().await? {
            archived = row.get::<i64>("archived")?.max(0) as usize;
        }
        Ok(archived)
    }

    /// History of an author, newest first
    pub async fn list_history(&self, author: Uuid) -> Result<Vec<HistoryNode>> {
        let q = query(
            r#"
            MATCH (h:History {author: $author})
            RETURN h
            ORDER BY h.created_at DESC
            "#,
        )
        .param("author", author.to_string());

        let mut result = self.graph.execute(q).await?;
        let mut entries = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("h")?;
            entries.push(self.node_to_history(&node)?);
        }
        Ok(entries)
    }

    fn node_to_task(&self, node: &neo4rs::Node) -> Result<TaskNode> {
        Ok(TaskNode {
            id: node.get::<String>("id")?.parse()?,
            author: node.get::<String>("author")?.parse()?,
            workspace: node.get("workspace")?,
            task: node.get("task")?,
            desc: node.get("desc").unwrap_or_default(),
            stored_time: node.get("stored_time").unwrap_or(0),
            priority: node.get("priority")?,
            complete: node.get("complete").unwrap_or(false),
            created_at: get_timestamp(node, "created_at")?,
            updated_at: get_timestamp(node, "updated_at")?,
        })
    }

    fn node_to_history(&self, node: &neo4rs::Node) -> Result<HistoryNode> {
        Ok(HistoryNode {
            id: node.get::<String>("id")?.parse()?,
            author: node.get::<String>("author")?.parse()?,
            workspace: node.get("workspace")?,
            task: node.get("task")?,
            stored_time: node.get("stored_time").unwrap_or(0),
            complete: node.get("complete").unwrap_or(false),
            priority: node.get("priority")?,
            created_at: get_timestamp(node, "created_at")?,
        })
    }

    // ========================================================================
    // Bot operations
    // ========================================================================

    /// Create a bot role
    pub async fn create_bot_role(&self, role: &BotRoleNode) -> Result<()> {
        let q = query("CREATE (r:BotRole {id: $id, user: $user, role: $role})")
            .param("id", role.id.to_string())
            .param("user", role.user.to_string())
            .param("role", role.role.clone());

        self.graph.run(q).await?;
        Ok(())
    }

    /// Roles of a user, ordered by name
    pub async fn list_bot_roles(&self, user: Uuid) -> Result<Vec<BotRoleNode>> {
        let q = query("MATCH (r:BotRole {user: $user}) RETURN r ORDER BY r.role ASC")
            .param("user", user.to_string());

        let mut result = self.graph.execute(q).await?;
        let mut roles = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("r")?;
            roles.push(self.node_to_bot_role(&node)?);
        }
        Ok(roles)
    }

    /// Delete a role together with the questions stored under it
    pub async fn delete_bot_role(&self, user: Uuid, id: Uuid) -> Result<Option<BotRoleNode>> {
        let mut txn = self.graph.start_txn().await?;

        let mut role = None;
        let mut stream = txn
            .execute(
                query("MATCH (r:BotRole {id: $id, user: $user}) RETURN r")
                    .param("id", id.to_string())
                    .param("user", user.to_string()),
            )
            .await?;
        while let Some(row) = stream.next(txn.handle()).await? {
            let node: neo4rs::Node = row.get("r")?;
            role = Some(self.node_to_bot_role(&node)?);
        }

        let Some(role) = role else {
            txn.rollback().await?;
            return Ok(None);
        };

        txn.run(query("MATCH (r:BotRole {id: $id}) DELETE r").param("id", id.to_string()))
            .await?;
        txn.run(
            query("MATCH (m:BotMessage {user: $user, role: $role}) DELETE m")
                .param("user", user.to_string())
                .param("role", role.role.clone()),
        )
        .await?;
        txn.commit().await?;

        Ok(Some(role))
    }

    /// Remember a question
    pub async fn create_bot_message(&self, message: &BotMessageNode) -> Result<()> {
        let q = query("CREATE (m:BotMessage {id: $id, user: $user, msg: $msg, role: $role})")
            .param("id", message.id.to_string())
            .param("user", message.user.to_string())
            .param("msg", message.msg.clone())
            .param("role", message.role.clone());

        self.graph.run(q).await?;
        Ok(())
    }

    /// One random question stored under `(user, role)`
    pub async fn random_bot_message(
        &self,
        user: Uuid,
        role: &str,
    ) -> Result<Option<BotMessageNode>> {
        let q = query(
            r#"
            MATCH (m:BotMessage {user: $user, role: $role})
            RETURN m
            ORDER BY rand()
            LIMIT 1
            "#,
        )
        .param("user", user.to_string())
        .param("role", role);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("m")?;
            Ok(Some(BotMessageNode {
                id: node.get::<String>("id")?.parse()?,
                user: node.get::<String>("user")?.parse()?,
                msg: node.get("msg")?,
                role: node.get("role")?,
            }))
        } else {
            Ok(None)
        }
    }

    fn node_to_bot_role(&self, node: &neo4rs::Node) -> Result<BotRoleNode> {
        Ok(BotRoleNode {
            id: node.get::<String>("id")?.parse()?,
            user: node.get::<String>("user")?.parse()?,
            role: node.get("role")?,
        })
    }
}
