//! Nested tree reconstruction from flat roadmap records
//!
//! Relationships are never stored as pointers: a node is a child of `p`
//! when its `path` equals `p`. The tree is rebuilt on every read.

use super::path::ROOT_PATH;
use crate::neo4j::models::RoadmapNode;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A node of the rendered hierarchy
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes in this subtree, itself included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }

    /// Depth-first search for a node by name
    pub fn find(&self, name: &str) -> Option<&TreeNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// The stored records do not form a tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// The same record was reached twice, e.g. two siblings sharing a name
    #[error("node '{name}' ({id}) is reachable through more than one path")]
    Revisited { id: Uuid, name: String },
}

/// Rebuild the forest of an owner from its flat record set.
///
/// Children keep the order of `nodes`. Records whose path does not lead back
/// to [`ROOT_PATH`] are left out and logged.
pub fn build_hierarchy(nodes: &[RoadmapNode]) -> Result<Vec<TreeNode>, HierarchyError> {
    let mut by_parent: HashMap<&str, Vec<&RoadmapNode>> = HashMap::new();
    for node in nodes {
        by_parent.entry(node.path.as_str()).or_default().push(node);
    }

    let mut visited = HashSet::with_capacity(nodes.len());
    let forest = children_of(ROOT_PATH, &by_parent, &mut visited)?;

    if visited.len() < nodes.len() {
        let orphans: Vec<&str> = nodes
            .iter()
            .filter(|n| !visited.contains(&n.id))
            .map(|n| n.node.as_str())
            .collect();
        tracing::warn!(
            count = orphans.len(),
            ?orphans,
            "Roadmap records with a dangling path left out of the hierarchy"
        );
    }

    Ok(forest)
}

fn children_of(
    parent_path: &str,
    by_parent: &HashMap<&str, Vec<&RoadmapNode>>,
    visited: &mut HashSet<Uuid>,
) -> Result<Vec<TreeNode>, HierarchyError> {
    let Some(children) = by_parent.get(parent_path) else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(children.len());
    for node in children {
        if !visited.insert(node.id) {
            return Err(HierarchyError::Revisited {
                id: node.id,
                name: node.node.clone(),
            });
        }
        let own_path = format!("{}{}/", parent_path, node.node);
        out.push(TreeNode {
            name: node.node.clone(),
            children: children_of(&own_path, by_parent, visited)?,
        });
    }
    Ok(out)
}
