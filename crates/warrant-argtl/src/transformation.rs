//! Composition strategies and the transformation log

use crate::ArgTlError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How `compose` arranges its source fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionStrategy {
    /// New root goal and strategy with every source root beneath it
    #[default]
    Parallel,
    /// Each source hangs below every leaf of the one before it
    Sequential,
    /// First source is the scaffold, the rest attach round-robin to its leaves
    Hierarchical,
}

impl CompositionStrategy {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionStrategy::Parallel => "parallel",
            CompositionStrategy::Sequential => "sequential",
            CompositionStrategy::Hierarchical => "hierarchical",
        }
    }
}

impl fmt::Display for CompositionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompositionStrategy {
    type Err = ArgTlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parallel" => Ok(CompositionStrategy::Parallel),
            "sequential" => Ok(CompositionStrategy::Sequential),
            "hierarchical" => Ok(CompositionStrategy::Hierarchical),
            other => Err(ArgTlError::Parse(format!(
                "Unknown composition strategy: {}",
                other
            ))),
        }
    }
}

/// Kind of recorded transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformationKind {
    /// Fragments combined into a new fragment
    Compose,
    /// Dependency recorded between two fragments
    Link,
    /// Validation rules evaluated on a fragment
    Validate,
}

/// One entry of the engine's transformation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    /// What happened
    pub kind: TransformationKind,
    /// Fragment ids the transformation read
    pub sources: Vec<String>,
    /// Fragment id the transformation produced, if any
    pub target: Option<String>,
    /// Strategy, interface text, rules and results
    pub parameters: serde_json::Value,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

impl Transformation {
    pub(crate) fn new(
        kind: TransformationKind,
        sources: Vec<String>,
        target: Option<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            kind,
            sources,
            target,
            parameters,
            timestamp: Utc::now(),
        }
    }
}
