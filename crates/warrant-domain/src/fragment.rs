//! Assurance case fragments
//!
//! A fragment is a self-contained sub-argument for one component or concern.
//! Besides its own argument graph it tracks which evidence has been supplied,
//! which evidence types are still outstanding, and how it connects to other
//! fragments. Its strength and completeness are derived from those sets.
//!
//! Lifecycle: Draft → Complete → Validated, with Deprecated reachable from any
//! state and terminal.

use crate::{ArgumentGraph, DomainError, GsnNode, NodeType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentStatus {
    /// Under construction
    #[default]
    Draft,
    /// Structure set and no outstanding evidence
    Complete,
    /// Passed the strength and completeness thresholds
    Validated,
    /// Retired; no further transitions
    Deprecated,
}

impl FragmentStatus {
    /// Lowercase tag
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentStatus::Draft => "draft",
            FragmentStatus::Complete => "complete",
            FragmentStatus::Validated => "validated",
            FragmentStatus::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for FragmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FragmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(FragmentStatus::Draft),
            "complete" => Ok(FragmentStatus::Complete),
            "validated" => Ok(FragmentStatus::Validated),
            "deprecated" => Ok(FragmentStatus::Deprecated),
            other => Err(format!("Unknown fragment status: {}", other)),
        }
    }
}

/// What a fragment argues about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentType {
    /// A single component
    Component,
    /// A group of components
    Subsystem,
    /// Security properties
    Security,
    /// Safety properties
    Safety,
    /// Code quality
    Quality,
    /// Performance properties
    Performance,
    /// Interaction between components
    Integration,
}

impl FragmentType {
    /// Lowercase tag
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentType::Component => "component",
            FragmentType::Subsystem => "subsystem",
            FragmentType::Security => "security",
            FragmentType::Safety => "safety",
            FragmentType::Quality => "quality",
            FragmentType::Performance => "performance",
            FragmentType::Integration => "integration",
        }
    }
}

impl fmt::Display for FragmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FragmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "component" => Ok(FragmentType::Component),
            "subsystem" => Ok(FragmentType::Subsystem),
            "security" => Ok(FragmentType::Security),
            "safety" => Ok(FragmentType::Safety),
            "quality" => Ok(FragmentType::Quality),
            "performance" => Ok(FragmentType::Performance),
            "integration" => Ok(FragmentType::Integration),
            other => Err(format!("Unknown fragment type: {}", other)),
        }
    }
}

/// Thresholds a fragment must meet to be marked validated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationThresholds {
    /// Minimum completeness score
    pub min_completeness: f64,
    /// Minimum strength score
    pub min_strength: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            min_completeness: 0.8,
            min_strength: 0.7,
        }
    }
}

impl ValidationThresholds {
    /// Require fully supplied evidence and a near-perfect structure
    pub fn strict() -> Self {
        Self {
            min_completeness: 1.0,
            min_strength: 0.9,
        }
    }
}

/// Result of a strength assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthAssessment {
    /// Weighted overall score in [0, 1]
    pub strength_score: f64,
    /// Share of evidence supplied, in [0, 1]
    pub completeness_score: f64,
    /// Human-readable weaknesses
    pub weakness_points: Vec<String>,
    /// Status at assessment time
    pub status: FragmentStatus,
    /// `supplied/total` evidence count
    pub evidence_coverage: String,
}

/// A reusable piece of assurance argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssuranceCaseFragment {
    /// Fragment identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// What the fragment argues about
    pub fragment_type: FragmentType,

    /// What the fragment argues
    pub description: String,

    /// Component or subsystem the fragment covers
    #[serde(default)]
    pub component_name: Option<String>,

    status: FragmentStatus,

    nodes: ArgumentGraph,

    #[serde(default)]
    root_goal_id: Option<String>,

    /// Evidence ids supplied so far
    #[serde(default)]
    pub evidence_ids: BTreeSet<String>,

    /// Evidence types still outstanding
    #[serde(default)]
    pub required_evidence_types: BTreeSet<String>,

    /// Fragments this one depends on
    #[serde(default)]
    pub depends_on: BTreeSet<String>,

    /// Fragments that depend on this one
    #[serde(default)]
    pub provides_to: BTreeSet<String>,

    /// Connection description per dependency
    #[serde(default)]
    pub interface_points: BTreeMap<String, String>,

    #[serde(default)]
    strength_score: f64,

    #[serde(default)]
    completeness_score: f64,

    #[serde(default)]
    weakness_points: Vec<String>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl AssuranceCaseFragment {
    /// Create an empty draft fragment
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        fragment_type: FragmentType,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            fragment_type,
            description: description.into(),
            component_name: None,
            status: FragmentStatus::Draft,
            nodes: ArgumentGraph::new(),
            root_goal_id: None,
            evidence_ids: BTreeSet::new(),
            required_evidence_types: BTreeSet::new(),
            depends_on: BTreeSet::new(),
            provides_to: BTreeSet::new(),
            interface_points: BTreeMap::new(),
            strength_score: 0.0,
            completeness_score: 0.0,
            weakness_points: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the covered component
    pub fn with_component(mut self, component_name: impl Into<String>) -> Self {
        self.component_name = Some(component_name.into());
        self
    }

    /// Current lifecycle status
    pub fn status(&self) -> FragmentStatus {
        self.status
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

    /// Deep-copy every node of another graph into this fragment
    pub fn absorb_nodes(&mut self, other: &ArgumentGraph) {
        self.nodes.absorb(other);
        self.touch();
    }

    /// Create a parent → child edge inside the fragment
    pub fn link_nodes(&mut self, parent_id: &str, child_id: &str) -> Result<(), DomainError> {
        self.nodes.link(parent_id, child_id)?;
        self.touch();
        Ok(())
    }

    /// Link an evidence id to one node of the fragment
    pub fn link_node_evidence(&mut self, node_id: &str, evidence_id: &str) -> Result<(), DomainError> {
        self.nodes.link_evidence(node_id, evidence_id)?;
        self.touch();
        Ok(())
    }

    /// Promote an existing Goal node to root
    pub fn set_root_goal(&mut self, goal_id: &str) -> Result<(), DomainError> {
        let node = self
            .nodes
            .get(goal_id)
            .ok_or_else(|| DomainError::NotFound(format!("goal '{}' in fragment '{}'", goal_id, self.id)))?;
        if !node.is(NodeType::Goal) {
            return Err(DomainError::InvalidState(format!(
                "node '{}' is a {}, not a goal",
                goal_id, node.node_type
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

    /// Depth-first preorder from the root goal (empty without a root)
    pub fn traverse_from_root(&self) -> Vec<&GsnNode> {
        match self.root_goal_id.as_deref() {
            Some(root) => self.nodes.traverse_from(root),
            None => Vec::new(),
        }
    }

    /// Record supplied evidence, clearing its type from the outstanding set
    pub fn link_evidence(&mut self, evidence_id: &str, evidence_type: &str) {
        self.evidence_ids.insert(evidence_id.to_string());
        self.required_evidence_types.remove(evidence_type);
        self.touch();
    }

    /// Mark an evidence type as outstanding
    pub fn require_evidence(&mut self, evidence_type: &str) {
        self.required_evidence_types.insert(evidence_type.to_string());
        self.touch();
    }

    /// Record a dependency on another fragment through a named interface point
    pub fn add_dependency(&mut self, fragment_id: &str, interface_point: &str) {
        self.depends_on.insert(fragment_id.to_string());
        self.interface_points
            .insert(fragment_id.to_string(), interface_point.to_string());
        self.touch();
    }

    /// Record that another fragment depends on this one
    pub fn add_consumer(&mut self, fragment_id: &str) {
        self.provides_to.insert(fragment_id.to_string());
        self.touch();
    }

    /// Union another fragment's supplied and outstanding evidence into this one
    pub fn merge_evidence_from(&mut self, other: &AssuranceCaseFragment) {
        self.evidence_ids.extend(other.evidence_ids.iter().cloned());
        self.required_evidence_types
            .extend(other.required_evidence_types.iter().cloned());
        self.touch();
    }

    /// Compute the assessment without caching it
    pub fn assessment(&self) -> StrengthAssessment {
        let supplied = self.evidence_ids.len();
        let total = supplied + self.required_evidence_types.len();
        let completeness = if total > 0 {
            supplied as f64 / total as f64
        } else {
            0.0
        };

        let has_structure = self.root_goal_id.is_some() && !self.nodes.is_empty();
        let loose_dependencies = !self.depends_on.is_empty() && self.interface_points.is_empty();

        let mut weaknesses = Vec::new();
        if self.root_goal_id.is_none() {
            weaknesses.push("No root goal defined".to_string());
        }
        if self.nodes.is_empty() {
            weaknesses.push("No argument structure".to_string());
        }
        if !self.required_evidence_types.is_empty() {
            weaknesses.push(format!(
                "Missing {} evidence types",
                self.required_evidence_types.len()
            ));
        }
        if loose_dependencies {
            weaknesses.push("Dependencies without interface points".to_string());
        }

        let structure_score = if has_structure { 1.0 } else { 0.0 };
        let dependency_score = if loose_dependencies { 0.5 } else { 1.0 };

        StrengthAssessment {
            strength_score: structure_score * 0.3 + completeness * 0.5 + dependency_score * 0.2,
            completeness_score: completeness,
            weakness_points: weaknesses,
            status: self.status,
            evidence_coverage: format!("{}/{}", supplied, total),
        }
    }

    /// Assess strength and cache the scores on the fragment
    pub fn assess_strength(&mut self) -> StrengthAssessment {
        let assessment = self.assessment();
        self.strength_score = assessment.strength_score;
        self.completeness_score = assessment.completeness_score;
        self.weakness_points = assessment.weakness_points.clone();
        assessment
    }

    /// Cached strength score from the last assessment
    pub fn strength_score(&self) -> f64 {
        self.strength_score
    }

    /// Cached completeness score from the last assessment
    pub fn completeness_score(&self) -> f64 {
        self.completeness_score
    }

    /// Cached weaknesses from the last assessment
    pub fn weakness_points(&self) -> &[String] {
        &self.weakness_points
    }

    /// Draft → Complete
    pub fn mark_complete(&mut self) -> Result<(), DomainError> {
        self.ensure_not_deprecated()?;
        if self.root_goal_id.is_none() {
            return Err(DomainError::InvalidState(format!(
                "fragment '{}' has no root goal",
                self.id
            )));
        }
        if !self.required_evidence_types.is_empty() {
            return Err(DomainError::InvalidState(format!(
                "fragment '{}' has {} outstanding evidence types",
                self.id,
                self.required_evidence_types.len()
            )));
        }
        self.status = FragmentStatus::Complete;
        self.touch();
        Ok(())
    }

    /// Mark validated using the default thresholds
    pub fn mark_validated(&mut self) -> Result<(), DomainError> {
        self.mark_validated_with(&ValidationThresholds::default())
    }

    /// Re-assess and mark validated if the thresholds are met
    pub fn mark_validated_with(&mut self, thresholds: &ValidationThresholds) -> Result<(), DomainError> {
        self.ensure_not_deprecated()?;
        let assessment = self.assess_strength();
        if assessment.completeness_score < thresholds.min_completeness
            || assessment.strength_score < thresholds.min_strength
        {
            return Err(DomainError::InvalidState(format!(
                "fragment '{}' does not meet validation criteria (completeness {:.2}, strength {:.2})",
                self.id, assessment.completeness_score, assessment.strength_score
            )));
        }
        self.status = FragmentStatus::Validated;
        self.touch();
        Ok(())
    }

    /// Retire the fragment
    pub fn deprecate(&mut self) {
        self.status = FragmentStatus::Deprecated;
        self.touch();
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, DomainError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON, re-checking the root goal invariant
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let fragment: AssuranceCaseFragment = serde_json::from_str(json)?;
        if let Some(root) = fragment.root_goal_id.as_deref() {
            match fragment.nodes.get(root) {
                Some(node) if node.is(NodeType::Goal) => {}
                _ => {
                    return Err(DomainError::InvalidState(format!(
                        "root goal '{}' is missing or not a goal",
                        root
                    )))
                }
            }
        }
        Ok(fragment)
    }

    fn ensure_not_deprecated(&self) -> Result<(), DomainError> {
        if self.status == FragmentStatus::Deprecated {
            return Err(DomainError::InvalidState(format!(
                "fragment '{}' is deprecated",
                self.id
            )));
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: scores always stay within [0, 1]
        #[test]
        fn test_scores_bounded(
            supplied in 0..10usize,
            outstanding in 0..10usize,
            with_root in any::<bool>(),
            loose_dep in any::<bool>(),
        ) {
            let mut f = AssuranceCaseFragment::new("p", "p", FragmentType::Component, "");
            if with_root {
                f.add_node(GsnNode::new("g", NodeType::Goal, "goal"));
                f.set_root_goal("g").unwrap();
            }
            for i in 0..supplied {
                f.link_evidence(&format!("ev{}", i), "none");
            }
            for i in 0..outstanding {
                f.require_evidence(&format!("type{}", i));
            }
            if loose_dep {
                f.depends_on.insert("x".into());
            }

            let a = f.assess_strength();
            prop_assert!((0.0..=1.0).contains(&a.strength_score));
            prop_assert!((0.0..=1.0).contains(&a.completeness_score));
        }
    }
}
