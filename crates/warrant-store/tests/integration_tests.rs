//! Integration tests for warrant-store
//!
//! These tests persist built cases and reload the snapshot from disk.

use serde_json::json;
use tempfile::TempDir;
use warrant_domain::builder::{CASE_LABEL, REL_CONTAINS, REL_EVIDENCED_BY, REL_SUPPORTS};
use warrant_domain::{AssuranceCaseBuilder, GraphStore, NodeType};
use warrant_store::{EvidenceGraph, StoreError, SNAPSHOT_FILE};

fn builder() -> AssuranceCaseBuilder {
    let mut builder = AssuranceCaseBuilder::new("web", "Web application", "Release 2.1");
    builder
        .add_with_id(NodeType::Goal, "G1", "Web application is acceptably secure")
        .set_as_root()
        .unwrap();
    builder
        .add_with_id(NodeType::Solution, "Sn1", "Penetration test report")
        .link_to_parent("G1")
        .unwrap()
        .link_evidence_to_current("ev-pentest")
        .unwrap()
        .link_evidence_to_current("ev-unknown")
        .unwrap();
    builder
}

#[test]
fn test_save_case_and_reload() {
    let dir = TempDir::new().unwrap();
    let mut graph = EvidenceGraph::open(dir.path()).unwrap();
    graph.add_evidence("ev-pentest", "pentest_report");

    let handle = builder().save_to_graph(&mut graph).unwrap();
    assert_eq!(handle.id, "web");
    assert_eq!(handle.label, CASE_LABEL);
    assert!(dir.path().join(SNAPSHOT_FILE).exists());

    // case + 2 GSN nodes + 1 evidence node
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.relationships(Some("web"), None, Some(REL_CONTAINS)).len(), 2);
    assert_eq!(graph.relationships(Some("Sn1"), Some("G1"), Some(REL_SUPPORTS)).len(), 1);
    // only evidence already in the store gets an edge
    assert_eq!(graph.relationships(None, None, Some(REL_EVIDENCED_BY)).len(), 1);

    let reopened = EvidenceGraph::open(dir.path()).unwrap();
    assert_eq!(reopened.node_count(), 4);
    assert_eq!(reopened.relationship_count(), graph.relationship_count());
    assert_eq!(reopened.find_nodes(Some("GSN_GOAL")).len(), 1);
    assert_eq!(
        reopened.node("G1").unwrap().properties["statement"],
        json!("Web application is acceptably secure")
    );
}

#[test]
fn test_open_creates_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("evidence").join("graph");

    let mut graph = EvidenceGraph::open(&nested).unwrap();
    assert!(nested.is_dir());
    assert_eq!(graph.node_count(), 0);
    graph.save_to_disk().unwrap();
    assert!(nested.join(SNAPSHOT_FILE).exists());
}

#[test]
fn test_corrupt_snapshot_is_an_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(SNAPSHOT_FILE), "{ not json").unwrap();

    let result = EvidenceGraph::open(dir.path());
    assert!(matches!(result, Err(StoreError::Serialization(_))));
}
