//! Trait definitions for external interactions
//!
//! These traits define the boundary between the argument model and storage.
//! Implementations live in other crates (see `warrant-store`).

use serde::{Deserialize, Serialize};

/// A node as seen by a graph store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeHandle {
    /// Node identifier in the store
    pub id: String,
    /// Node label (`AssuranceCase`, `GSN_GOAL`, `Evidence`, ...)
    pub label: String,
}

/// Trait for persisting labelled nodes and typed relationships
///
/// Callers must create every node before any relationship that refers to it.
pub trait GraphStore {
    /// Error type for store operations
    type Error;

    /// Create (or overwrite) a node
    fn create_node(
        &mut self,
        label: &str,
        properties: serde_json::Value,
        node_id: &str,
    ) -> Result<NodeHandle, Self::Error>;

    /// Create a typed relationship between two existing nodes
    fn create_relationship(
        &mut self,
        rel_type: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), Self::Error>;

    /// Look up a node
    fn get_node(&self, node_id: &str) -> Option<NodeHandle>;

    /// Flush to durable storage, if any
    fn save_to_disk(&mut self) -> Result<(), Self::Error>;
}
