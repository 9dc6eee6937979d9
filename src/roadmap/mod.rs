//! Per-user roadmap stored as flat records with materialized paths
//!
//! Each record names one node and the `/`-delimited chain of its ancestors.
//! [`RoadmapManager`] owns every mutation; [`hierarchy::build_hierarchy`]
//! turns the flat set back into a nested tree.

pub mod hierarchy;
pub mod manager;
pub mod path;

pub use hierarchy::{build_hierarchy, HierarchyError, TreeNode};
pub use manager::{RoadmapError, RoadmapManager, RoadmapSnapshot};
