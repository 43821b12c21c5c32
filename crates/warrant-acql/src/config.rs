//! ACQL engine configuration

use serde::Deserialize;

/// Limits and thresholds for query evaluation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AcqlConfig {
    /// Minimum evidenced-leaf ratio for adequate coverage (0.0-1.0)
    pub coverage_threshold: f64,

    /// Goals beyond this count are left out of pairwise consistency checks
    pub max_pairwise_goals: usize,

    /// Traceability stops collecting paths after this many
    pub max_trace_paths: usize,

    /// Traceability stops after expanding this many nodes, counted over
    /// every path walked (paths that share nodes count them again)
    pub max_trace_expansions: usize,
}

impl Default for AcqlConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: 0.8,
            max_pairwise_goals: 500,
            max_trace_paths: 10_000,
            max_trace_expansions: 200_000,
        }
    }
}

impl AcqlConfig {
    /// Every leaf must carry evidence
    pub fn strict() -> Self {
        Self {
            coverage_threshold: 1.0,
            ..Self::default()
        }
    }

    /// Small limits for very large graphs
    pub fn bounded(max_pairwise_goals: usize, max_trace_paths: usize) -> Self {
        Self {
            max_pairwise_goals,
            max_trace_paths,
            ..Self::default()
        }
    }
}
