//! Materialized path helpers
//!
//! A path lists the names of a node's ancestors, root first, wrapped in
//! slashes: `/Python/OOP/`. Children of the root carry [`ROOT_PATH`].

use crate::neo4j::models::RoadmapNode;

/// Path of the root's direct children
pub const ROOT_PATH: &str = "/";

/// The `/name/` segment a node contributes to its descendants' paths.
pub fn segment(name: &str) -> String {
    format!("/{}/", name)
}

/// Path that children of `parent` carry.
pub fn child_path(parent: &RoadmapNode) -> String {
    format!("{}{}/", parent.path, parent.node)
}

/// True if a node stored under `path` lives below the node called `name`.
pub fn is_below(path: &str, name: &str) -> bool {
    path.contains(&segment(name))
}

/// Replace the first `/old/` segment of `path` with `/new/`.
///
/// Returns `None` when the path does not pass through `old`.
pub fn rewrite_segment(path: &str, old: &str, new: &str) -> Option<String> {
    let old_segment = segment(old);
    if !path.contains(&old_segment) {
        return None;
    }
    Some(path.replacen(&old_segment, &segment(new), 1))
}

/// Check that a path is `/` or a slash-wrapped list of non-empty names.
pub fn is_well_formed(path: &str) -> bool {
    if path == ROOT_PATH {
        return true;
    }
    path.len() > 2
        && path.starts_with('/')
        && path.ends_with('/')
        && path[1..path.len() - 1].split('/').all(|s| !s.trim().is_empty())
}

/// Split a non-root path into the parent's own path and the parent's name.
///
/// `/Python/OOP/` → `("/Python/", "OOP")`. Returns `None` for the root path.
pub fn split_parent(path: &str) -> Option<(String, String)> {
    if path == ROOT_PATH || !is_well_formed(path) {
        return None;
    }
    let inner = &path[1..path.len() - 1];
    match inner.rsplit_once('/') {
        Some((ancestors, name)) => Some((format!("/{}/", ancestors), name.to_string())),
        None => Some((ROOT_PATH.to_string(), inner.to_string())),
    }
}

/// Resolve the path a new child of `parent_name` would carry.
///
/// Takes the first node whose name matches; `None` if there is none.
pub fn resolve_child_path(nodes: &[RoadmapNode], parent_name: &str) -> Option<String> {
    nodes
        .iter()
        .find(|n| n.node == parent_name)
        .map(child_path)
}

/// Normalize and validate a node name.
///
/// Names are trimmed, must be non-empty and must not contain the path delimiter.
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_path() {
        let root = RoadmapNode::new("alice", "Python", "/");
        assert_eq!(child_path(&root), "/Python/");

        let inner = RoadmapNode::new("alice", "OOP", "/Python/");
        assert_eq!(child_path(&inner), "/Python/OOP/");
    }

    #[test]
    fn test_rewrite_segment_first_occurrence_only() {
        assert_eq!(
            rewrite_segment("/Python/OOP/", "OOP", "Object-Oriented"),
            Some("/Python/Object-Oriented/".to_string())
        );
        assert_eq!(
            rewrite_segment("/A/x/A/", "A", "B"),
            Some("/B/x/A/".to_string())
        );
        assert_eq!(rewrite_segment("/Python/", "OOP", "X"), None);
    }

    #[test]
    fn test_segment_match_is_whole_name() {
        // "Py" must not match inside "/Python/"
        assert!(!is_below("/Python/OOP/", "Py"));
        assert!(is_below("/Python/OOP/", "Python"));
        assert!(is_below("/Python/OOP/", "OOP"));
        assert_eq!(rewrite_segment("/Python/", "Py", "Rust"), None);
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("/"));
        assert!(is_well_formed("/Python/"));
        assert!(is_well_formed("/Learn Python/OOP/"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("Python/"));
        assert!(!is_well_formed("/Python"));
        assert!(!is_well_formed("//"));
        assert!(!is_well_formed("/Python//OOP/"));
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("/"), None);
        assert_eq!(
            split_parent("/Python/"),
            Some(("/".to_string(), "Python".to_string()))
        );
        assert_eq!(
            split_parent("/Python/OOP/"),
            Some(("/Python/".to_string(), "OOP".to_string()))
        );
        assert_eq!(split_parent("bogus"), None);
    }

    #[test]
    fn test_resolve_child_path() {
        let nodes = vec![
            RoadmapNode::new("alice", "Python", "/"),
            RoadmapNode::new("alice", "OOP", "/Python/"),
        ];
        assert_eq!(
            resolve_child_path(&nodes, "OOP"),
            Some("/Python/OOP/".to_string())
        );
        assert_eq!(resolve_child_path(&nodes, "Rust"), None);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  OOP "), Some("OOP".to_string()));
        assert_eq!(normalize_name("   "), None);
        assert_eq!(normalize_name("a/b"), None);
    }
}
