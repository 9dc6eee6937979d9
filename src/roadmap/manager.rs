//! Roadmap manager: per-owner node tree operations over the document store

use super::hierarchy::{build_hierarchy, HierarchyError, TreeNode};
use super::path::{is_well_formed, normalize_name, resolve_child_path, split_parent};
use crate::neo4j::models::{DeleteOutcome, RoadmapNode};
use crate::neo4j::traits::DocumentStore;
use crate::neo4j::WriteCancelled;
use dashmap::DashMap;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Default deadline for a single roadmap mutation
pub const DEFAULT_MUTATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised by roadmap operations
#[derive(Debug, thiserror::Error)]
pub enum RoadmapError {
    #[error("invalid node name '{0}'")]
    InvalidName(String),

    #[error("malformed path '{0}'")]
    MalformedPath(String),

    #[error("nodes' path was not found")]
    PathNotFound(String),

    #[error("data was not found or data is not available")]
    Empty,

    #[error("node '{0}' already exists")]
    DuplicateName(String),

    #[error("bad request with creating node tree")]
    CreateFailed(#[source] anyhow::Error),

    #[error("bad request with updating node")]
    RenameFailed,

    #[error("bad request with removing nodes and its sub nodes")]
    RemoveFailed,

    #[error(transparent)]
    Structure(#[from] HierarchyError),

    #[error("roadmap mutation was cancelled")]
    Cancelled,

    #[error("roadmap mutation exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error(transparent)]
    Store(anyhow::Error),
}

impl From<anyhow::Error> for RoadmapError {
    fn from(err: anyhow::Error) -> Self {
        if err.downcast_ref::<WriteCancelled>().is_some() {
            RoadmapError::Cancelled
        } else {
            RoadmapError::Store(err)
        }
    }
}

/// Tree plus flat name list, the payload every roadmap mutation answers with
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapSnapshot {
    pub node_tree: Option<TreeNode>,
    pub node_names: Vec<String>,
}

/// Node tree operations for every owner.
///
/// Mutations of one owner run one at a time; different owners proceed in
/// parallel. An owner's lock lives only while some mutation holds or awaits it.
pub struct RoadmapManager {
    store: Arc<dyn DocumentStore>,
    owner_locks: DashMap<String, Arc<Mutex<()>>>,
    mutation_timeout: Duration,
}

impl RoadmapManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            owner_locks: DashMap::new(),
            mutation_timeout: DEFAULT_MUTATION_TIMEOUT,
        }
    }

    pub fn with_mutation_timeout(mut self, timeout: Duration) -> Self {
        self.mutation_timeout = timeout;
        self
    }

    fn owner_lock(&self, owner: &str) -> Arc<Mutex<()>> {
        self.owner_locks
            .entry(owner.to_string())
            .or_default()
            .clone()
    }

    /// Run a mutation under the owner's lock, bounded by the deadline and the token.
    async fn mutate<T, F>(
        &self,
        owner: &str,
        cancel: &CancellationToken,
        op: F,
    ) -> Result<T, RoadmapError>
    where
        F: Future<Output = Result<T, RoadmapError>>,
    {
        if cancel.is_cancelled() {
            return Err(RoadmapError::Cancelled);
        }

        let lock = self.owner_lock(owner);
        let timeout = self.mutation_timeout;
        let result = {
            let guarded = async {
                let _guard = lock.lock().await;
                op.await
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(RoadmapError::Cancelled),
                result = tokio::time::timeout(timeout, guarded) => {
                    result.unwrap_or(Err(RoadmapError::DeadlineExceeded(timeout)))
                }
            }
        };

        drop(lock);
        self.release_owner_lock(owner);
        result
    }

    /// Forget the owner's lock once no mutation references it.
    ///
    /// `owner_lock` clones under the same shard lock, so a lock that is handed
    /// out concurrently is never dropped from the map.
    fn release_owner_lock(&self, owner: &str) {
        self.owner_locks
            .remove_if(owner, |_, lock| Arc::strong_count(lock) == 1);
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert a node with a caller-supplied path (`/` for roots).
    pub async fn create_root(
        &self,
        owner: &str,
        name: &str,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<RoadmapNode, RoadmapError> {
        let name = normalize_name(name).ok_or_else(|| RoadmapError::InvalidName(name.to_string()))?;
        let path = path.trim();
        if !is_well_formed(path) {
            return Err(RoadmapError::MalformedPath(path.to_string()));
        }

        self.mutate(owner, cancel, async {
            let nodes = self.store.list_roadmap_nodes(owner).await?;
            if nodes.iter().any(|n| n.node == name) {
                return Err(RoadmapError::DuplicateName(name.clone()));
            }
            if let Some((parent_path, parent_name)) = split_parent(path) {
                let parent_exists = nodes
                    .iter()
                    .any(|n| n.node == parent_name && n.path == parent_path);
                if !parent_exists {
                    return Err(RoadmapError::PathNotFound(path.to_string()));
                }
            }

            let node = RoadmapNode::new(owner, name.clone(), path);
            self.store
                .insert_roadmap_node(&node)
                .await
                .map_err(RoadmapError::CreateFailed)?;

            tracing::debug!(owner = %owner, node = %node.node, path = %node.path, "Created roadmap node");
            Ok(node)
        })
        .await
    }

    /// Insert `name` as a child of the node called `parent_name`.
    pub async fn insert_under(
        &self,
        owner: &str,
        name: &str,
        parent_name: &str,
        cancel: &CancellationToken,
    ) -> Result<RoadmapNode, RoadmapError> {
        let name = normalize_name(name).ok_or_else(|| RoadmapError::InvalidName(name.to_string()))?;
        let parent_name = parent_name.trim();

        self.mutate(owner, cancel, async {
            let nodes = self.store.list_roadmap_nodes(owner).await?;
            if nodes.is_empty() {
                return Err(RoadmapError::Empty);
            }
            let path = resolve_child_path(&nodes, parent_name)
                .ok_or_else(|| RoadmapError::PathNotFound(parent_name.to_string()))?;
            if nodes.iter().any(|n| n.node == name) {
                return Err(RoadmapError::DuplicateName(name.clone()));
            }

            let node = RoadmapNode::new(owner, name.clone(), path);
            self.store.insert_roadmap_node(&node).await?;

            tracing::debug!(owner = %owner, node = %node.node, path = %node.path, "Inserted roadmap node");
            Ok(node)
        })
        .await
    }

    /// Rename a node and rewrite the paths of everything below it.
    pub async fn rename(
        &self,
        owner: &str,
        old_name: &str,
        new_name: &str,
        cancel: &CancellationToken,
    ) -> Result<RoadmapNode, RoadmapError> {
        let old_name = old_name.trim();
        let new_name =
            normalize_name(new_name).ok_or_else(|| RoadmapError::InvalidName(new_name.to_string()))?;

        self.mutate(owner, cancel, async {
            let nodes = self.store.list_roadmap_nodes(owner).await?;
            let Some(current) = nodes.iter().find(|n| n.node == old_name) else {
                return Err(RoadmapError::RenameFailed);
            };
            if old_name == new_name {
                return Ok(current.clone());
            }
            if nodes.iter().any(|n| n.node == new_name) {
                return Err(RoadmapError::DuplicateName(new_name.clone()));
            }

            let outcome = self
                .store
                .rename_roadmap_node(owner, old_name, &new_name, cancel)
                .await?
                .ok_or(RoadmapError::RenameFailed)?;

            tracing::debug!(
                owner = %owner,
                from = %old_name,
                to = %new_name,
                rewritten = outcome.rewritten,
                "Renamed roadmap node"
            );
            Ok(outcome.node)
        })
        .await
    }

    /// Delete a node and its whole subtree.
    pub async fn delete(
        &self,
        owner: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<DeleteOutcome, RoadmapError> {
        let name = name.trim();

        self.mutate(owner, cancel, async {
            let outcome = self.store.delete_roadmap_subtree(owner, name, cancel).await?;
            if outcome.removed_node.is_none() {
                return Err(RoadmapError::RemoveFailed);
            }

            tracing::debug!(
                owner = %owner,
                node = %name,
                descendants = outcome.removed_descendants,
                "Removed roadmap subtree"
            );
            Ok(outcome)
        })
        .await
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Full forest of an owner
    pub async fn build_hierarchy(&self, owner: &str) -> Result<Vec<TreeNode>, RoadmapError> {
        let nodes = self.store.list_roadmap_nodes(owner).await?;
        Ok(build_hierarchy(&nodes)?)
    }

    /// First root's tree, or `None` for an owner without nodes
    pub async fn tree(&self, owner: &str) -> Result<Option<TreeNode>, RoadmapError> {
        Ok(self.build_hierarchy(owner).await?.into_iter().next())
    }

    /// Node names in creation order
    pub async fn list_node_names(&self, owner: &str) -> Result<Vec<String>, RoadmapError> {
        let nodes = self.store.list_roadmap_nodes(owner).await?;
        Ok(nodes.into_iter().map(|n| n.node).collect())
    }

    /// Tree and names from a single read
    pub async fn snapshot(&self, owner: &str) -> Result<RoadmapSnapshot, RoadmapError> {
        let nodes = self.store.list_roadmap_nodes(owner).await?;
        let node_tree = build_hierarchy(&nodes)?.into_iter().next();
        Ok(RoadmapSnapshot {
            node_tree,
            node_names: nodes.into_iter().map(|n| n.node).collect(),
        })
    }
}
