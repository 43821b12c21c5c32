//! Warrant Storage Layer
//!
//! Implements the [`GraphStore`] trait with an in-memory evidence graph:
//! labelled nodes, typed relationships and a label index.
//!
//! # Persistence
//!
//! A graph opened on a directory writes its whole state to
//! `<dir>/graph.json` on [`GraphStore::save_to_disk`] and reloads it on the
//! next [`EvidenceGraph::open`]. An in-memory graph ignores saves.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use warrant_domain::GraphStore;
//! use warrant_store::EvidenceGraph;
//!
//! let mut graph = EvidenceGraph::in_memory();
//! graph.create_node("Evidence", json!({"kind": "test_report"}), "ev1").unwrap();
//! graph.create_node("GSN_GOAL", json!({}), "G1").unwrap();
//! graph.create_relationship("EVIDENCED_BY", "G1", "ev1").unwrap();
//! assert_eq!(graph.relationships(Some("G1"), None, None).len(), 1);
//! ```

#![warn(missing_docs)]

mod records;

pub use records::{Relationship, StoredNode};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use warrant_domain::{GraphStore, NodeHandle};

/// File name of the snapshot inside the storage directory
pub const SNAPSHOT_FILE: &str = "graph.json";

/// Label used for evidence nodes
pub const EVIDENCE_LABEL: &str = "Evidence";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the snapshot failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot or property encoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Relationship endpoint not found
    #[error("Node not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    nodes: BTreeMap<String, StoredNode>,
    relationships: BTreeMap<String, Relationship>,
}

/// In-memory graph of evidence and argument nodes
///
/// Creating a node under an existing id replaces it. Relationship ids are
/// derived from type and endpoints, so creating the same edge twice keeps
/// one record.
#[derive(Debug, Default)]
pub struct EvidenceGraph {
    nodes: BTreeMap<String, StoredNode>,
    relationships: BTreeMap<String, Relationship>,
    label_index: BTreeMap<String, BTreeSet<String>>,
    storage_dir: Option<PathBuf>,
}

impl EvidenceGraph {
    /// Graph without backing storage
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Graph backed by `dir`, loading an existing snapshot if present
    ///
    /// The directory is created if missing.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let path = dir.join(SNAPSHOT_FILE);
        let snapshot = if path.exists() {
            let snapshot: Snapshot = serde_json::from_str(&fs::read_to_string(&path)?)?;
            debug!(
                path = %path.display(),
                nodes = snapshot.nodes.len(),
                relationships = snapshot.relationships.len(),
                "Loaded graph snapshot"
            );
            snapshot
        } else {
            Snapshot::default()
        };

        let mut graph = Self {
            nodes: snapshot.nodes,
            relationships: snapshot.relationships,
            label_index: BTreeMap::new(),
            storage_dir: Some(dir),
        };
        graph.rebuild_index();
        Ok(graph)
    }

    /// Snapshot location, if backed by a directory
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.storage_dir.as_ref().map(|dir| dir.join(SNAPSHOT_FILE))
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Full node record
    pub fn node(&self, node_id: &str) -> Option<&StoredNode> {
        self.nodes.get(node_id)
    }

    /// Create an evidence node
    pub fn add_evidence(&mut self, evidence_id: &str, evidence_type: &str) -> NodeHandle {
        self.insert_node(
            EVIDENCE_LABEL,
            serde_json::json!({ "evidence_type": evidence_type }),
            evidence_id,
        )
    }

    /// Nodes carrying `label`, or every node when `label` is `None`
    pub fn find_nodes(&self, label: Option<&str>) -> Vec<&StoredNode> {
        match label {
            Some(label) => self
                .label_index
                .get(label)
                .map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)).collect())
                .unwrap_or_default(),
            None => self.nodes.values().collect(),
        }
    }

    /// Relationships matching every given filter
    pub fn relationships(
        &self,
        source_id: Option<&str>,
        target_id: Option<&str>,
        rel_type: Option<&str>,
    ) -> Vec<&Relationship> {
        self.relationships
            .values()
            .filter(|r| source_id.is_none_or(|s| r.source_id == s))
            .filter(|r| target_id.is_none_or(|t| r.target_id == t))
            .filter(|r| rel_type.is_none_or(|t| r.rel_type == t))
            .collect()
    }

    fn insert_node(&mut self, label: &str, properties: serde_json::Value, node_id: &str) -> NodeHandle {
        let node = StoredNode {
            id: node_id.to_string(),
            label: label.to_string(),
            properties,
            created_at: Utc::now(),
        };
        let handle = node.handle();

        if let Some(previous) = self.nodes.insert(node_id.to_string(), node) {
            if let Some(ids) = self.label_index.get_mut(&previous.label) {
                ids.remove(node_id);
            }
        }
        self.label_index
            .entry(label.to_string())
            .or_default()
            .insert(node_id.to_string());

        handle
    }

    fn rebuild_index(&mut self) {
        self.label_index.clear();
        for node in self.nodes.values() {
            self.label_index
                .entry(node.label.clone())
                .or_default()
                .insert(node.id.clone());
        }
    }
}

fn relationship_id(rel_type: &str, source_id: &str, target_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(target_id.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}_{}", rel_type, &digest[..16])
}

impl GraphStore for EvidenceGraph {
    type Error = StoreError;

    fn create_node(
        &mut self,
        label: &str,
        properties: serde_json::Value,
        node_id: &str,
    ) -> Result<NodeHandle, Self::Error> {
        Ok(self.insert_node(label, properties, node_id))
    }

    fn create_relationship(
        &mut self,
        rel_type: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), Self::Error> {
        for id in [source_id, target_id] {
            if !self.nodes.contains_key(id) {
                return Err(StoreError::NotFound(id.to_string()));
            }
        }

        let id = relationship_id(rel_type, source_id, target_id);
        self.relationships.insert(
            id.clone(),
            Relationship {
                id,
                rel_type: rel_type.to_string(),
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn get_node(&self, node_id: &str) -> Option<NodeHandle> {
        self.nodes.get(node_id).map(StoredNode::handle)
    }

    fn save_to_disk(&mut self) -> Result<(), Self::Error> {
        let Some(path) = self.snapshot_path() else {
            return Ok(());
        };

        #[derive(Serialize)]
        struct SnapshotRef<'a> {
            nodes: &'a BTreeMap<String, StoredNode>,
            relationships: &'a BTreeMap<String, Relationship>,
        }

        let json = serde_json::to_string_pretty(&SnapshotRef {
            nodes: &self.nodes,
            relationships: &self.relationships,
        })?;
        fs::write(&path, json)?;

        info!(
            path = %path.display(),
            nodes = self.nodes.len(),
            relationships = self.relationships.len(),
            "Saved evidence graph"
        );
        Ok(())
    }
}
