//! Structured query results

use crate::QueryType;
use serde::{Deserialize, Serialize};
use warrant_domain::ContradictionStrategy;

/// Two goals flagged as contradictory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    /// First goal id
    pub goal1_id: String,
    /// First goal statement
    pub goal1: String,
    /// Second goal id
    pub goal2_id: String,
    /// Second goal statement
    pub goal2: String,
}

/// Consistency check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// True if no contradiction was found
    pub consistent: bool,
    /// Contradictory goal pairs
    pub contradictions: Vec<Contradiction>,
    /// Nodes in the target
    pub nodes_checked: usize,
    /// Heuristic used
    pub strategy: ContradictionStrategy,
    /// Goals left out because of the pairwise limit
    pub goals_skipped: usize,
}

/// Completeness check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// True if nothing is missing
    pub complete: bool,
    /// Human-readable list of what is missing
    pub missing_elements: Vec<String>,
    /// At least one Goal
    pub has_goal: bool,
    /// At least one Strategy
    pub has_strategy: bool,
    /// At least one Solution
    pub has_solution: bool,
    /// At least one evidence id
    pub has_evidence: bool,
    /// Non-root nodes without parents
    pub orphan_count: usize,
    /// Non-Context leaves without evidence
    pub unsupported_leaves: usize,
}

/// Soundness check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundnessReport {
    /// True if no issue was found
    pub sound: bool,
    /// One message per problem node
    pub issues: Vec<String>,
    /// Nodes in the target
    pub nodes_checked: usize,
}

/// Evidence coverage result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Evidenced leaves over all leaves (0 without leaves)
    pub coverage_ratio: f64,
    /// Leaves in the target
    pub total_leaves: usize,
    /// Leaves with at least one evidence id
    pub supported_leaves: usize,
    /// Distinct evidence ids known to the target
    pub evidence_count: usize,
    /// Ratio met the threshold
    pub adequate_coverage: bool,
    /// Threshold applied
    pub threshold: f64,
}

/// Root-to-evidence traceability result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceabilityReport {
    /// At least one path reaches evidence
    pub traceable: bool,
    /// Why tracing could not start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Number of paths ending at an evidenced node
    pub paths_count: usize,
    /// Mean node count per path
    pub average_path_length: f64,
    /// Path collection stopped at the configured path or expansion limit
    pub truncated: bool,
}

/// Category of an aggregated weakness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaknessKind {
    /// Contradictory goals
    Consistency,
    /// Missing elements
    Completeness,
    /// Unsupported structure
    Soundness,
    /// Too few evidenced leaves
    Coverage,
}

/// One failing check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weakness {
    /// Which check failed
    #[serde(rename = "type")]
    pub kind: WeaknessKind,
    /// Findings of that check
    pub details: Vec<String>,
}

/// Aggregated weaknesses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaknessReport {
    /// Number of failing checks
    pub weakness_count: usize,
    /// Failing checks with details
    pub weaknesses: Vec<Weakness>,
}

/// A parent → child edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Parent node id
    pub from: String,
    /// Child node id
    pub to: String,
}

/// Dependency analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum DependencyReport {
    /// Fragment-level dependencies
    Fragment {
        /// Fragment depends on at least one other
        has_dependencies: bool,
        /// Number of dependencies
        dependency_count: usize,
        /// Fragments depended upon
        dependencies: Vec<String>,
        /// Fragments depending on this one
        provides_to: Vec<String>,
    },
    /// Node-level edges of a case
    Case {
        /// Number of edges
        chain_count: usize,
        /// Every parent → child edge
        chains: Vec<DependencyEdge>,
    },
}

/// A claim that invites a defeater
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialDefeater {
    /// Goal id
    pub node_id: String,
    /// Goal statement
    pub claim: String,
    /// Why it is vulnerable
    pub reason: String,
}

/// Potential defeater search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefeaterReport {
    /// Number of findings
    pub defeater_count: usize,
    /// Findings in node order
    pub potential_defeaters: Vec<PotentialDefeater>,
}

/// Result of any query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryResult {
    /// See [`ConsistencyReport`]
    Consistency(ConsistencyReport),
    /// See [`CompletenessReport`]
    Completeness(CompletenessReport),
    /// See [`SoundnessReport`]
    Soundness(SoundnessReport),
    /// See [`CoverageReport`]
    Coverage(CoverageReport),
    /// See [`TraceabilityReport`]
    Traceability(TraceabilityReport),
    /// See [`WeaknessReport`]
    Weaknesses(WeaknessReport),
    /// See [`DependencyReport`]
    Dependencies(DependencyReport),
    /// See [`DefeaterReport`]
    Defeaters(DefeaterReport),
}

impl QueryResult {
    /// Query type that produced this result
    pub fn query_type(&self) -> QueryType {
        match self {
            QueryResult::Consistency(_) => QueryType::Consistency,
            QueryResult::Completeness(_) => QueryType::Completeness,
            QueryResult::Soundness(_) => QueryType::Soundness,
            QueryResult::Coverage(_) => QueryType::Coverage,
            QueryResult::Traceability(_) => QueryType::Traceability,
            QueryResult::Weaknesses(_) => QueryType::Weaknesses,
            QueryResult::Dependencies(_) => QueryType::Dependencies,
            QueryResult::Defeaters(_) => QueryType::Defeaters,
        }
    }

    /// True if the check found nothing to complain about
    pub fn passed(&self) -> bool {
        match self {
            QueryResult::Consistency(r) => r.consistent,
            QueryResult::Completeness(r) => r.complete,
            QueryResult::Soundness(r) => r.sound,
            QueryResult::Coverage(r) => r.adequate_coverage,
            QueryResult::Traceability(r) => r.traceable,
            QueryResult::Weaknesses(r) => r.weakness_count == 0,
            QueryResult::Dependencies(_) => true,
            QueryResult::Defeaters(r) => r.defeater_count == 0,
        }
    }
}
