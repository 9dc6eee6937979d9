//! Neo4j client and record types for the document store

pub mod client;
mod impl_document_store;
pub mod models;
pub mod traits;

pub use client::Neo4jClient;
pub use models::*;
pub use traits::DocumentStore;

#[cfg(test)]
pub(crate) mod mock;

/// A multi-record write observed its cancellation token and rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("write cancelled before commit")]
pub struct WriteCancelled;
