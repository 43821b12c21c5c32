//! GSN node module - the building block of every argument

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Node kinds of Goal Structuring Notation
///
/// All six kinds share one record shape; the tag is the only difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A claim about the system
    Goal,

    /// Reasoning step that decomposes a goal
    Strategy,

    /// Reference to evidence supporting a goal
    Solution,

    /// Scope or environment information
    Context,

    /// Condition accepted without evidence
    Assumption,

    /// Rationale for choosing a strategy
    Justification,
}

impl NodeType {
    /// All node types in declaration order
    pub const ALL: [NodeType; 6] = [
        NodeType::Goal,
        NodeType::Strategy,
        NodeType::Solution,
        NodeType::Context,
        NodeType::Assumption,
        NodeType::Justification,
    ];

    /// Lowercase tag used in serialized forms
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Goal => "goal",
            NodeType::Strategy => "strategy",
            NodeType::Solution => "solution",
            NodeType::Context => "context",
            NodeType::Assumption => "assumption",
            NodeType::Justification => "justification",
        }
    }

    /// Conventional GSN id prefix (`G`, `S`, `Sn`, ...)
    pub fn id_prefix(&self) -> &'static str {
        match self {
            NodeType::Goal => "G",
            NodeType::Strategy => "S",
            NodeType::Solution => "Sn",
            NodeType::Context => "C",
            NodeType::Assumption => "A",
            NodeType::Justification => "J",
        }
    }

    /// Label used when the node is exported to a graph store
    pub fn graph_label(&self) -> String {
        format!("GSN_{}", self.as_str().to_uppercase())
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "goal" => Ok(NodeType::Goal),
            "strategy" => Ok(NodeType::Strategy),
            "solution" => Ok(NodeType::Solution),
            "context" => Ok(NodeType::Context),
            "assumption" => Ok(NodeType::Assumption),
            "justification" => Ok(NodeType::Justification),
            other => Err(format!("Unknown GSN node type: {}", other)),
        }
    }
}

/// A node in an assurance argument graph
///
/// Edges are stored as id lists with set semantics; insertion order is kept
/// so that traversals are reproducible. Symmetry between `child_ids` and
/// `parent_ids` is maintained by the owning [`ArgumentGraph`](crate::ArgumentGraph).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GsnNode {
    /// Unique identifier within the owning graph
    pub id: String,

    /// Node kind
    pub node_type: NodeType,

    /// The claim, strategy or evidence statement
    pub statement: String,

    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,

    /// Free-form properties
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,

    /// Ids of nodes this node supports
    #[serde(default)]
    pub parent_ids: Vec<String>,

    /// Ids of nodes supporting this node
    #[serde(default)]
    pub child_ids: Vec<String>,

    /// Opaque evidence identifiers
    #[serde(default)]
    pub evidence_ids: Vec<String>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl GsnNode {
    /// Create a node with no edges
    pub fn new(id: impl Into<String>, node_type: NodeType, statement: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            node_type,
            statement: statement.into(),
            description: None,
            properties: BTreeMap::new(),
            parent_ids: Vec::new(),
            child_ids: Vec::new(),
            evidence_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a property
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Record a parent edge. Returns `false` if it was already present.
    pub fn add_parent(&mut self, parent_id: &str) -> bool {
        self.insert_unique(EdgeSet::Parents, parent_id)
    }

    /// Record a child edge. Returns `false` if it was already present.
    pub fn add_child(&mut self, child_id: &str) -> bool {
        self.insert_unique(EdgeSet::Children, child_id)
    }

    /// Link evidence. Returns `false` if it was already linked.
    pub fn add_evidence(&mut self, evidence_id: &str) -> bool {
        self.insert_unique(EdgeSet::Evidence, evidence_id)
    }

    /// Add every parent, child and evidence link of `other` not already present
    pub fn merge_edges(&mut self, other: &GsnNode) {
        for id in &other.parent_ids {
            self.add_parent(id);
        }
        for id in &other.child_ids {
            self.add_child(id);
        }
        for id in &other.evidence_ids {
            self.add_evidence(id);
        }
    }

    /// True if the node has no children
    pub fn is_leaf(&self) -> bool {
        self.child_ids.is_empty()
    }

    /// True if at least one evidence id is linked
    pub fn has_evidence(&self) -> bool {
        !self.evidence_ids.is_empty()
    }

    /// True if the node is of the given kind
    pub fn is(&self, node_type: NodeType) -> bool {
        self.node_type == node_type
    }

    fn insert_unique(&mut self, set: EdgeSet, value: &str) -> bool {
        let target = match set {
            EdgeSet::Parents => &mut self.parent_ids,
            EdgeSet::Children => &mut self.child_ids,
            EdgeSet::Evidence => &mut self.evidence_ids,
        };
        if target.iter().any(|existing| existing == value) {
            return false;
        }
        target.push(value.to_string());
        self.updated_at = Utc::now();
        true
    }
}

#[derive(Clone, Copy)]
enum EdgeSet {
    Parents,
    Children,
    Evidence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_child_is_idempotent() {
        let mut goal = GsnNode::new("G1", NodeType::Goal, "System is safe");
        assert!(goal.add_child("S1"));
        assert!(!goal.add_child("S1"));
        assert_eq!(goal.child_ids, vec!["S1".to_string()]);
    }

    #[test]
    fn test_add_evidence_bumps_timestamp() {
        let mut solution = GsnNode::new("Sn1", NodeType::Solution, "Test report");
        let before = solution.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        solution.add_evidence("ev-1");
        assert!(solution.updated_at > before);
        assert!(solution.has_evidence());
    }

    #[test]
    fn test_duplicate_insert_keeps_timestamp() {
        let mut node = GsnNode::new("G1", NodeType::Goal, "x");
        node.add_parent("G0");
        let stamp = node.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        node.add_parent("G0");
        assert_eq!(node.updated_at, stamp);
    }

    #[test]
    fn test_node_type_tags() {
        assert_eq!(NodeType::Solution.as_str(), "solution");
        assert_eq!(NodeType::Solution.id_prefix(), "Sn");
        assert_eq!(NodeType::Goal.graph_label(), "GSN_GOAL");
        assert_eq!("Strategy".parse::<NodeType>().unwrap(), NodeType::Strategy);
        assert!("widget".parse::<NodeType>().is_err());
    }

    #[test]
    fn test_serialized_type_is_lowercase() {
        let node = GsnNode::new("J1", NodeType::Justification, "Because");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["node_type"], "justification");
        // RFC 3339 timestamps
        assert!(json["created_at"].as_str().unwrap().contains('T'));
    }
}
