//! Argument graph arena
//!
//! Every case and fragment owns exactly one [`ArgumentGraph`]. Nodes live in a
//! `Vec` in insertion order with an id index beside it; edges are stored on the
//! nodes by id. Composition deep-copies node records from one arena into
//! another, so no node is ever shared between two owners.

use crate::{DomainError, GsnNode, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Arena of GSN nodes keyed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<GsnNode>", into = "Vec<GsnNode>")]
pub struct ArgumentGraph {
    nodes: Vec<GsnNode>,
    index: HashMap<String, usize>,
}

impl ArgumentGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node
    ///
    /// A node with the same id keeps its slot and its edges: it takes the
    /// incoming kind, statement, description and properties, and the
    /// incoming edges are merged into its own. Neighbours never end up
    /// pointing at a node that has forgotten them.
    ///
    /// Returns the previous record, if any.
    pub fn insert(&mut self, node: GsnNode) -> Option<GsnNode> {
        match self.index.get(&node.id) {
            Some(&slot) => {
                let existing = &mut self.nodes[slot];
                let previous = existing.clone();
                existing.merge_edges(&node);
                existing.updated_at = existing.updated_at.max(node.updated_at);
                existing.node_type = node.node_type;
                existing.statement = node.statement;
                existing.description = node.description;
                existing.properties = node.properties;
                Some(previous)
            }
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
                None
            }
        }
    }

    /// Look up a node by id
    pub fn get(&self, id: &str) -> Option<&GsnNode> {
        self.index.get(id).map(|&slot| &self.nodes[slot])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut GsnNode> {
        match self.index.get(id) {
            Some(&slot) => Some(&mut self.nodes[slot]),
            None => None,
        }
    }

    /// True if a node with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &GsnNode> {
        self.nodes.iter()
    }

    /// Create a symmetric parent → child edge
    ///
    /// Both endpoints are checked before either is touched, so a failed call
    /// leaves the graph unchanged.
    pub fn link(&mut self, parent_id: &str, child_id: &str) -> Result<(), DomainError> {
        if !self.contains(parent_id) {
            return Err(DomainError::NotFound(format!("parent node '{}'", parent_id)));
        }
        if !self.contains(child_id) {
            return Err(DomainError::NotFound(format!("child node '{}'", child_id)));
        }

        if let Some(parent) = self.get_mut(parent_id) {
            parent.add_child(child_id);
        }
        if let Some(child) = self.get_mut(child_id) {
            child.add_parent(parent_id);
        }
        Ok(())
    }

    /// Link an evidence id to a node
    pub fn link_evidence(&mut self, node_id: &str, evidence_id: &str) -> Result<(), DomainError> {
        let node = self
            .get_mut(node_id)
            .ok_or_else(|| DomainError::node_not_found(node_id))?;
        node.add_evidence(evidence_id);
        Ok(())
    }

    /// Children of a node, skipping ids that are not present
    pub fn children(&self, id: &str) -> Vec<&GsnNode> {
        self.get(id)
            .map(|node| node.child_ids.iter().filter_map(|c| self.get(c)).collect())
            .unwrap_or_default()
    }

    /// Nodes of one kind, in insertion order
    pub fn of_type(&self, node_type: NodeType) -> impl Iterator<Item = &GsnNode> {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }

    /// Nodes without children, in insertion order
    pub fn leaves(&self) -> impl Iterator<Item = &GsnNode> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// Ids of nodes without children
    pub fn leaf_ids(&self) -> Vec<String> {
        self.leaves().map(|n| n.id.clone()).collect()
    }

    /// Depth-first preorder from `root_id`
    ///
    /// A visited set guards against cycles, so each node is returned at most
    /// once. Dangling child ids are ignored.
    pub fn traverse_from<'a>(&'a self, root_id: &'a str) -> Vec<&'a GsnNode> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<&str> = vec![root_id];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = self.get(id) else {
                continue;
            };
            order.push(node);
            // Reverse so the first child is visited first
            for child in node.child_ids.iter().rev() {
                if !visited.contains(child.as_str()) {
                    stack.push(child.as_str());
                }
            }
        }

        order
    }

    /// Union of evidence ids linked to any node
    pub fn evidence_ids(&self) -> BTreeSet<String> {
        self.nodes
            .iter()
            .flat_map(|n| n.evidence_ids.iter().cloned())
            .collect()
    }

    /// Deep-copy every node of `other` into this graph
    ///
    /// Nodes present in both keep the union of their edges.
    pub fn absorb(&mut self, other: &ArgumentGraph) {
        for node in other.iter() {
            self.insert(node.clone());
        }
    }
}

impl PartialEq for ArgumentGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl From<Vec<GsnNode>> for ArgumentGraph {
    fn from(nodes: Vec<GsnNode>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.insert(node);
        }
        graph
    }
}

impl From<ArgumentGraph> for Vec<GsnNode> {
    fn from(graph: ArgumentGraph) -> Self {
        graph.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ArgumentGraph {
        let mut g = ArgumentGraph::new();
        g.insert(GsnNode::new("G1", NodeType::Goal, "top"));
        g.insert(GsnNode::new("S1", NodeType::Strategy, "split"));
        g.insert(GsnNode::new("G2", NodeType::Goal, "left"));
        g.insert(GsnNode::new("G3", NodeType::Goal, "right"));
        g.link("G1", "S1").unwrap();
        g.link("S1", "G2").unwrap();
        g.link("S1", "G3").unwrap();
        g
    }

    #[test]
    fn test_link_is_symmetric() {
        let g = chain();
        assert!(g.get("G1").unwrap().child_ids.contains(&"S1".to_string()));
        assert!(g.get("S1").unwrap().parent_ids.contains(&"G1".to_string()));
    }

    #[test]
    fn test_link_missing_endpoint_leaves_graph_untouched() {
        let mut g = chain();
        let err = g.link("G1", "missing").unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(g.get("G1").unwrap().child_ids.len(), 1);
    }

    #[test]
    fn test_preorder_traversal() {
        let g = chain();
        let ids: Vec<&str> = g.traverse_from("G1").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["G1", "S1", "G2", "G3"]);
    }

    #[test]
    fn test_traversal_survives_cycle() {
        let mut g = chain();
        g.link("G3", "G1").unwrap();
        let ids: Vec<&str> = g.traverse_from("G1").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["G1", "S1", "G2", "G3"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut g = chain();
        let replaced = g.insert(GsnNode::new("S1", NodeType::Strategy, "renamed"));
        assert_eq!(replaced.unwrap().statement, "split");
        assert_eq!(g.len(), 4);
        assert_eq!(g.iter().nth(1).unwrap().statement, "renamed");
    }

    #[test]
    fn test_reinsert_keeps_existing_edges() {
        let mut g = chain();
        g.link_evidence("G2", "ev-1").unwrap();
        g.insert(GsnNode::new("S1", NodeType::Strategy, "renamed"));
        g.insert(GsnNode::new("G2", NodeType::Goal, "left again"));

        let s1 = g.get("S1").unwrap();
        assert_eq!(s1.parent_ids, vec!["G1".to_string()]);
        assert_eq!(s1.child_ids, vec!["G2".to_string(), "G3".to_string()]);
        assert!(g.get("G2").unwrap().has_evidence());
    }

    #[test]
    fn test_absorb_merges_shared_nodes() {
        let mut target = chain();
        let mut other = ArgumentGraph::new();
        other.insert(GsnNode::new("S1", NodeType::Strategy, "split"));
        other.insert(GsnNode::new("G4", NodeType::Goal, "extra"));
        other.link("S1", "G4").unwrap();

        target.absorb(&other);

        let s1 = target.get("S1").unwrap();
        assert_eq!(s1.parent_ids, vec!["G1".to_string()]);
        assert_eq!(
            s1.child_ids,
            vec!["G2".to_string(), "G3".to_string(), "G4".to_string()]
        );
        assert_eq!(target.get("G4").unwrap().parent_ids, vec!["S1".to_string()]);
    }

    #[test]
    fn test_leaves_in_insertion_order() {
        let g = chain();
        assert_eq!(g.leaf_ids(), vec!["G2".to_string(), "G3".to_string()]);
    }

    #[test]
    fn test_absorb_copies_rather_than_shares() {
        let source = chain();
        let mut target = ArgumentGraph::new();
        target.absorb(&source);
        target.link_evidence("G2", "ev-1").unwrap();

        assert!(target.get("G2").unwrap().has_evidence());
        assert!(!source.get("G2").unwrap().has_evidence());
    }

    #[test]
    fn test_serde_preserves_order() {
        let g = chain();
        let json = serde_json::to_string(&g).unwrap();
        let back: ArgumentGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(g, back);
        assert!(back.contains("G3"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: traversal visits each node at most once on arbitrary
        /// (possibly cyclic) edge sets and terminates
        #[test]
        fn test_traversal_visits_each_node_once(
            size in 1..12usize,
            edges in prop::collection::vec((0..12usize, 0..12usize), 0..40),
        ) {
            let mut g = ArgumentGraph::new();
            for i in 0..size {
                g.insert(GsnNode::new(format!("N{}", i), NodeType::Goal, "n"));
            }
            for (a, b) in edges {
                if a < size && b < size {
                    g.link(&format!("N{}", a), &format!("N{}", b)).unwrap();
                }
            }

            let visited = g.traverse_from("N0");
            let unique: HashSet<&str> = visited.iter().map(|n| n.id.as_str()).collect();
            prop_assert_eq!(unique.len(), visited.len());
            prop_assert!(visited.len() <= size);
        }

        /// Property: every link is recorded on both endpoints
        #[test]
        fn test_link_symmetry(edges in prop::collection::vec((0..6usize, 0..6usize), 1..20)) {
            let mut g = ArgumentGraph::new();
            for i in 0..6 {
                g.insert(GsnNode::new(format!("N{}", i), NodeType::Goal, "n"));
            }
            for (a, b) in &edges {
                g.link(&format!("N{}", a), &format!("N{}", b)).unwrap();
            }
            for node in g.iter() {
                for child in &node.child_ids {
                    prop_assert!(g.get(child).unwrap().parent_ids.contains(&node.id));
                }
                for parent in &node.parent_ids {
                    prop_assert!(g.get(parent).unwrap().child_ids.contains(&node.id));
                }
            }
        }
    }
}
