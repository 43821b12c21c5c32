//! Reasoning, risk and consistency results

use crate::{Defeater, Theory};
use serde::{Deserialize, Serialize};
use std::fmt;
use warrant_domain::ContradictionStrategy;

/// Outcome of reasoning about a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningReport {
    /// Theories whose premises all hold
    pub applicable_theories: Vec<Theory>,
    /// Defeaters whose target and conditions match
    pub active_defeaters: Vec<Defeater>,
    /// No defeater is active
    pub indefeasible: bool,
    /// Mean confidence of the applicable theories
    pub base_confidence: f64,
    /// Base confidence minus the defeater penalty, floored at zero
    pub confidence_score: f64,
    /// Suggested follow-ups
    pub recommendations: Vec<String>,
}

/// Risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Below the medium threshold
    Low,
    /// Below the high threshold
    Medium,
    /// At or above the high threshold
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        })
    }
}

/// Risk estimate for a case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Risk in [0, 1]
    pub risk_score: f64,
    /// Band of `risk_score`
    pub risk_level: RiskLevel,
    /// Penalized confidence from the reasoning pass
    pub confidence_score: f64,
    /// Confidence before the defeater penalty
    pub base_confidence: f64,
    /// Active critical defeaters
    pub critical_issues: usize,
    /// Active high-severity defeaters
    pub high_issues: usize,
    /// No defeater is active
    pub indefeasible: bool,
    /// Suggested follow-ups
    pub recommendations: Vec<String>,
}

/// Two goals that appear to contradict each other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyIssue {
    /// First goal id
    pub goal1: String,
    /// Second goal id
    pub goal2: String,
    /// Human-readable explanation
    pub description: String,
}

/// Result of a consistency analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyAnalysis {
    /// No contradictions found
    pub consistent: bool,
    /// Heuristic used
    pub strategy: ContradictionStrategy,
    /// Contradictory goal pairs
    pub issues: Vec<ConsistencyIssue>,
    /// Goals left out of the comparison by the pairwise limit
    #[serde(default)]
    pub goals_skipped: usize,
}
