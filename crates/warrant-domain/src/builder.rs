//! Fluent construction of assurance cases
//!
//! The builder keeps a cursor on the most recently added node. Cursor
//! operations (`link_to_parent`, `link_evidence_to_current`, `set_as_root`)
//! fail with `InvalidState` when nothing has been added yet.

use crate::{AssuranceCase, DomainError, GraphStore, GsnNode, NodeHandle, NodeType};
use chrono::Utc;
use sha2::{Digest, Sha256};

/// Relationship type from a case to each of its nodes
pub const REL_CONTAINS: &str = "CONTAINS";
/// Relationship type from a child node to the parent it supports
pub const REL_SUPPORTS: &str = "SUPPORTS";
/// Relationship type from a node to an evidence node
pub const REL_EVIDENCED_BY: &str = "EVIDENCED_BY";
/// Label of the case node in a graph store
pub const CASE_LABEL: &str = "AssuranceCase";

/// Builder for [`AssuranceCase`] with a current-node cursor
#[derive(Debug, Clone)]
pub struct AssuranceCaseBuilder {
    case: AssuranceCase,
    current: Option<String>,
}

impl AssuranceCaseBuilder {
    /// Start a new, empty case
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::from_case(AssuranceCase::new(id, title, description))
    }

    /// Continue building an existing case
    pub fn from_case(case: AssuranceCase) -> Self {
        Self { case, current: None }
    }

    /// Add a Goal with a generated id
    pub fn add_goal(&mut self, statement: &str) -> &mut Self {
        self.add(NodeType::Goal, statement)
    }

    /// Add a Strategy with a generated id
    pub fn add_strategy(&mut self, statement: &str) -> &mut Self {
        self.add(NodeType::Strategy, statement)
    }

    /// Add a Solution with a generated id
    pub fn add_solution(&mut self, statement: &str) -> &mut Self {
        self.add(NodeType::Solution, statement)
    }

    /// Add a Context with a generated id
    pub fn add_context(&mut self, statement: &str) -> &mut Self {
        self.add(NodeType::Context, statement)
    }

    /// Add an Assumption with a generated id
    pub fn add_assumption(&mut self, statement: &str) -> &mut Self {
        self.add(NodeType::Assumption, statement)
    }

    /// Add a Justification with a generated id
    pub fn add_justification(&mut self, statement: &str) -> &mut Self {
        self.add(NodeType::Justification, statement)
    }

    /// Add a node of any kind with a generated id
    pub fn add(&mut self, node_type: NodeType, statement: &str) -> &mut Self {
        let id = self.generate_node_id(node_type.id_prefix(), statement);
        self.add_with_id(node_type, &id, statement)
    }

    /// Add a node with an explicit id
    ///
    /// Re-using an id updates that node and keeps its links.
    pub fn add_with_id(&mut self, node_type: NodeType, node_id: &str, statement: &str) -> &mut Self {
        self.case.add_node(GsnNode::new(node_id, node_type, statement));
        self.current = Some(node_id.to_string());
        self
    }

    /// Id of the node under the cursor
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Make the current node a child of `parent_id`
    pub fn link_to_parent(&mut self, parent_id: &str) -> Result<&mut Self, DomainError> {
        let current = self.cursor()?;
        self.case.link_nodes(parent_id, &current)?;
        Ok(self)
    }

    /// Link evidence to the current node
    pub fn link_evidence_to_current(&mut self, evidence_id: &str) -> Result<&mut Self, DomainError> {
        let current = self.cursor()?;
        self.case.link_evidence(&current, evidence_id)?;
        Ok(self)
    }

    /// Make the current node the root goal
    pub fn set_as_root(&mut self) -> Result<&mut Self, DomainError> {
        let current = self.cursor()?;
        self.case.set_root_goal(&current)?;
        Ok(self)
    }

    /// The case built so far
    pub fn case(&self) -> &AssuranceCase {
        &self.case
    }

    /// Finish and take the case
    pub fn build(self) -> AssuranceCase {
        self.case
    }

    /// Persist the case into a graph store
    ///
    /// The case node and every GSN node are created first; relationships are
    /// created only afterwards, then the store is flushed. `EVIDENCED_BY`
    /// edges are created only for evidence nodes the store already holds.
    pub fn save_to_graph<G>(&self, graph: &mut G) -> Result<NodeHandle, G::Error>
    where
        G: GraphStore,
        G::Error: From<serde_json::Error>,
    {
        let case = &self.case;
        let handle = graph.create_node(CASE_LABEL, serde_json::to_value(case)?, &case.id)?;

        for node in case.graph().iter() {
            graph.create_node(
                &node.node_type.graph_label(),
                serde_json::to_value(node)?,
                &node.id,
            )?;
        }

        for node in case.graph().iter() {
            graph.create_relationship(REL_CONTAINS, &case.id, &node.id)?;

            for child_id in &node.child_ids {
                if case.get_node(child_id).is_some() {
                    graph.create_relationship(REL_SUPPORTS, child_id, &node.id)?;
                }
            }

            for evidence_id in &node.evidence_ids {
                if graph.get_node(evidence_id).is_some() {
                    graph.create_relationship(REL_EVIDENCED_BY, &node.id, evidence_id)?;
                }
            }
        }

        graph.save_to_disk()?;
        Ok(handle)
    }

    fn cursor(&self) -> Result<String, DomainError> {
        self.current
            .clone()
            .ok_or_else(|| DomainError::InvalidState("no current node".to_string()))
    }

    fn generate_node_id(&self, prefix: &str, statement: &str) -> String {
        let timestamp = Utc::now().to_rfc3339();
        let mut salt = 0u32;
        loop {
            let mut hasher = Sha256::new();
            hasher.update(prefix.as_bytes());
            hasher.update(statement.as_bytes());
            hasher.update(timestamp.as_bytes());
            if salt > 0 {
                hasher.update(salt.to_string().as_bytes());
            }
            let digest = hex::encode(hasher.finalize());
            let id = format!("{}_{}", prefix, &digest[..8]);
            if self.case.get_node(&id).is_none() {
                return id;
            }
            salt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Records every call so ordering can be asserted
    #[derive(Default)]
    struct RecordingStore {
        nodes: HashMap<String, String>,
        calls: Vec<String>,
        saved: bool,
    }

    impl GraphStore for RecordingStore {
        type Error = DomainError;

        fn create_node(
            &mut self,
            label: &str,
            _properties: serde_json::Value,
            node_id: &str,
        ) -> Result<NodeHandle, DomainError> {
            self.nodes.insert(node_id.to_string(), label.to_string());
            self.calls.push(format!("node:{}", node_id));
            Ok(NodeHandle {
                id: node_id.to_string(),
                label: label.to_string(),
            })
        }

        fn create_relationship(
            &mut self,
            rel_type: &str,
            source_id: &str,
            target_id: &str,
        ) -> Result<(), DomainError> {
            if !self.nodes.contains_key(source_id) || !self.nodes.contains_key(target_id) {
                return Err(DomainError::NotFound(format!("{} -> {}", source_id, target_id)));
            }
            self.calls.push(format!("rel:{}:{}:{}", rel_type, source_id, target_id));
            Ok(())
        }

        fn get_node(&self, node_id: &str) -> Option<NodeHandle> {
            self.nodes.get(node_id).map(|label| NodeHandle {
                id: node_id.to_string(),
                label: label.clone(),
            })
        }

        fn save_to_disk(&mut self) -> Result<(), DomainError> {
            self.saved = true;
            Ok(())
        }
    }

    fn sample() -> AssuranceCaseBuilder {
        let mut b = AssuranceCaseBuilder::new("case-1", "API security", "REST API is secure");
        b.add_with_id(NodeType::Goal, "G1", "API is secure");
        b.set_as_root().unwrap();
        b.add_with_id(NodeType::Strategy, "S1", "Argue over threats");
        b.link_to_parent("G1").unwrap();
        b.add_with_id(NodeType::Solution, "Sn1", "Scan report");
        b.link_to_parent("S1").unwrap();
        b.link_evidence_to_current("ev-scan").unwrap();
        b.link_evidence_to_current("ev-missing").unwrap();
        b
    }

    #[test]
    fn test_cursor_required() {
        let mut b = AssuranceCaseBuilder::new("c", "t", "d");
        assert!(matches!(b.set_as_root(), Err(DomainError::InvalidState(_))));
        assert!(matches!(b.link_to_parent("x"), Err(DomainError::InvalidState(_))));
        assert!(matches!(
            b.link_evidence_to_current("e"),
            Err(DomainError::InvalidState(_))
        ));
    }

    #[test]
    fn test_generated_ids() {
        let mut b = AssuranceCaseBuilder::new("c", "t", "d");
        b.add_goal("System is safe");
        let goal = b.current_id().unwrap().to_string();
        assert!(goal.starts_with("G_"));
        assert_eq!(goal.len(), 2 + 8);

        b.add_solution("Report");
        assert!(b.current_id().unwrap().starts_with("Sn_"));
    }

    #[test]
    fn test_same_statement_never_collides() {
        let mut b = AssuranceCaseBuilder::new("c", "t", "d");
        for _ in 0..20 {
            b.add_goal("Identical statement");
        }
        assert_eq!(b.case().node_count(), 20);
    }

    #[test]
    fn test_reusing_an_id_keeps_links() {
        let mut b = sample();
        b.add_with_id(NodeType::Strategy, "S1", "Argue over each threat class");

        let case = b.case();
        let s1 = case.get_node("S1").unwrap();
        assert_eq!(s1.statement, "Argue over each threat class");
        assert_eq!(s1.parent_ids, vec!["G1".to_string()]);
        assert_eq!(s1.child_ids, vec!["Sn1".to_string()]);
        assert_eq!(case.node_count(), 3);
        assert_eq!(case.traverse_from_root().len(), 3);
        assert_eq!(b.current_id(), Some("S1"));
    }

    #[test]
    fn test_fluent_chain() {
        let mut b = AssuranceCaseBuilder::new("c", "t", "d");
        b.add_goal("Top").set_as_root().unwrap().add_strategy("Split");
        let case = b.build();
        assert_eq!(case.node_count(), 2);
        assert!(case.root_goal_id().is_some());
    }

    #[test]
    fn test_save_creates_nodes_before_relationships() {
        let builder = sample();
        let mut store = RecordingStore::default();
        store
            .create_node("Evidence", serde_json::json!({}), "ev-scan")
            .unwrap();
        store.calls.clear();

        let handle = builder.save_to_graph(&mut store).unwrap();
        assert_eq!(handle.id, "case-1");
        assert_eq!(handle.label, CASE_LABEL);
        assert!(store.saved);

        let first_rel = store.calls.iter().position(|c| c.starts_with("rel:")).unwrap();
        assert!(store.calls[..first_rel].iter().all(|c| c.starts_with("node:")));
        assert!(store.calls[first_rel..].iter().all(|c| c.starts_with("rel:")));
        assert_eq!(first_rel, 4);

        assert!(store.calls.contains(&"rel:SUPPORTS:S1:G1".to_string()));
        assert!(store.calls.contains(&"rel:EVIDENCED_BY:Sn1:ev-scan".to_string()));
        assert!(!store.calls.iter().any(|c| c.contains("ev-missing")));
        assert_eq!(store.get_node("G1").unwrap().label, "GSN_GOAL");
    }
}
