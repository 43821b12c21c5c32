//! Records held by the evidence graph

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warrant_domain::NodeHandle;

/// A labelled node with free-form properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    /// Node id
    pub id: String,
    /// Label (`AssuranceCase`, `GSN_GOAL`, `Evidence`, ...)
    pub label: String,
    /// Properties as given at creation
    #[serde(default)]
    pub properties: serde_json::Value,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl StoredNode {
    /// Id and label only
    pub fn handle(&self) -> NodeHandle {
        NodeHandle {
            id: self.id.clone(),
            label: self.label.clone(),
        }
    }
}

/// A typed, directed edge between two stored nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// `{type}_{hash}` id, stable for a given type and endpoint pair
    pub id: String,
    /// Relationship type (`CONTAINS`, `SUPPORTS`, `EVIDENCED_BY`, ...)
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Source node id
    pub source_id: String,
    /// Target node id
    pub target_id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}
