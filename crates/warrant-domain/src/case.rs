//! Assurance case module

use crate::{ArgumentGraph, DomainError, GsnNode, NodeType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A complete assurance argument: a rooted GSN graph
///
/// Invariant: when `root_goal_id` is set it names an existing Goal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssuranceCase {
    /// Case identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// What is being assured
    pub description: String,

    /// Kind of project (web, api, library, ...)
    #[serde(default)]
    pub project_type: Option<String>,

    nodes: ArgumentGraph,

    #[serde(default)]
    root_goal_id: Option<String>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

/// Structural validation result for a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseValidation {
    /// True when there are no errors (warnings are allowed)
    pub valid: bool,
    /// Blocking problems
    pub errors: Vec<String>,
    /// Non-blocking problems
    pub warnings: Vec<String>,
    /// Total nodes in the case
    pub node_count: usize,
    /// Nodes reachable from the root
    pub connected_nodes: usize,
    /// Nodes not reachable from the root
    pub orphan_nodes: usize,
}

impl AssuranceCase {
    /// Create an empty case
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            project_type: None,
            nodes: ArgumentGraph::new(),
            root_goal_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the project type
    pub fn with_project_type(mut self, project_type: impl Into<String>) -> Self {
        self.project_type = Some(project_type.into());
        self
    }

    /// Add a node, returning its id
    ///
    /// An existing node with the same id is updated and keeps its links.
    pub fn add_node(&mut self, node: GsnNode) -> String {
        let id = node.id.clone();
        self.nodes.insert(node);
        self.touch();
        id
    }

    /// Look up a node
    pub fn get_node(&self, id: &str) -> Option<&GsnNode> {
        self.nodes.get(id)
    }

    /// The node arena
    pub fn graph(&self) -> &ArgumentGraph {
        &self.nodes
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Create a parent → child edge
    pub fn link_nodes(&mut self, parent_id: &str, child_id: &str) -> Result<(), DomainError> {
        self.nodes.link(parent_id, child_id)?;
        self.touch();
        Ok(())
    }

    /// Link evidence to a node
    pub fn link_evidence(&mut self, node_id: &str, evidence_id: &str) -> Result<(), DomainError> {
        self.nodes.link_evidence(node_id, evidence_id)?;
        self.touch();
        Ok(())
    }

    /// Promote a Goal node to root
    pub fn set_root_goal(&mut self, goal_id: &str) -> Result<(), DomainError> {
        let goal = self
            .nodes
            .get(goal_id)
            .ok_or_else(|| DomainError::InvalidState(format!("root goal '{}' does not exist", goal_id)))?;
        if !goal.is(NodeType::Goal) {
            return Err(DomainError::InvalidState(format!(
                "node '{}' is a {}, not a goal",
                goal_id, goal.node_type
            )));
        }

        self.root_goal_id = Some(goal_id.to_string());
        self.touch();
        Ok(())
    }

    /// Id of the root goal, if set
    pub fn root_goal_id(&self) -> Option<&str> {
        self.root_goal_id.as_deref()
    }

    /// The root goal node, if set
    pub fn root_goal(&self) -> Option<&GsnNode> {
        self.root_goal_id.as_deref().and_then(|id| self.nodes.get(id))
    }

    /// Children of a node
    pub fn children(&self, id: &str) -> Vec<&GsnNode> {
        self.nodes.children(id)
    }

    /// All nodes of one kind
    pub fn nodes_by_type(&self, node_type: NodeType) -> Vec<&GsnNode> {
        self.nodes.of_type(node_type).collect()
    }

    /// Depth-first preorder from the root goal (empty without a root)
    pub fn traverse_from_root(&self) -> Vec<&GsnNode> {
        match self.root_goal_id.as_deref() {
            Some(root) => self.nodes.traverse_from(root),
            None => Vec::new(),
        }
    }

    /// Check the case structure
    pub fn validate(&self) -> CaseValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        match self.root_goal_id.as_deref() {
            None => errors.push("No root goal set".to_string()),
            Some(root) if !self.nodes.contains(root) => {
                errors.push(format!("Root goal {} not found in nodes", root));
            }
            Some(_) => {}
        }

        let connected: HashSet<&str> = self
            .traverse_from_root()
            .into_iter()
            .map(|n| n.id.as_str())
            .collect();
        let orphan_count = self
            .nodes
            .iter()
            .filter(|n| !connected.contains(n.id.as_str()))
            .count();
        if orphan_count > 0 {
            warnings.push(format!(
                "Found {} orphan nodes not connected to root",
                orphan_count
            ));
        }

        for solution in self.nodes.of_type(NodeType::Solution) {
            if !solution.has_evidence() {
                warnings.push(format!("Solution {} has no linked evidence", solution.id));
            }
        }

        for goal in self.nodes.of_type(NodeType::Goal) {
            if goal.is_leaf() {
                warnings.push(format!("Goal {} has no supporting arguments", goal.id));
            }
        }

        CaseValidation {
            valid: errors.is_empty(),
            errors,
            warnings,
            node_count: self.nodes.len(),
            connected_nodes: connected.len(),
            orphan_nodes: orphan_count,
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, DomainError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON, re-checking the root goal invariant
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let case: AssuranceCase = serde_json::from_str(json)?;
        if let Some(root) = case.root_goal_id.as_deref() {
            match case.nodes.get(root) {
                Some(node) if node.is(NodeType::Goal) => {}
                _ => {
                    return Err(DomainError::InvalidState(format!(
                        "root goal '{}' is missing or not a goal",
                        root
                    )))
                }
            }
        }
        Ok(case)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
