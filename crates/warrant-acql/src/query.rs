//! Query types and targets

use crate::AcqlError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use warrant_domain::{ArgumentGraph, AssuranceCase, AssuranceCaseFragment};

/// The eight ACQL query kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Pairwise contradiction check over goals
    Consistency,
    /// Presence of required element kinds, orphans and unsupported leaves
    Completeness,
    /// Strategies without sub-goals and leaf goals without support
    Soundness,
    /// Share of leaves carrying evidence
    Coverage,
    /// Paths from the root to evidenced nodes
    Traceability,
    /// Aggregate of the failing checks above
    Weaknesses,
    /// Fragment or node dependency edges
    Dependencies,
    /// Claims that invite counterexamples
    Defeaters,
}

impl QueryType {
    /// Every query type
    pub const ALL: [QueryType; 8] = [
        QueryType::Consistency,
        QueryType::Completeness,
        QueryType::Soundness,
        QueryType::Coverage,
        QueryType::Traceability,
        QueryType::Weaknesses,
        QueryType::Dependencies,
        QueryType::Defeaters,
    ];

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Consistency => "consistency",
            QueryType::Completeness => "completeness",
            QueryType::Soundness => "soundness",
            QueryType::Coverage => "coverage",
            QueryType::Traceability => "traceability",
            QueryType::Weaknesses => "weaknesses",
            QueryType::Dependencies => "dependencies",
            QueryType::Defeaters => "defeaters",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = AcqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        QueryType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| AcqlError::Parse(format!("Unknown query type: {}", s)))
    }
}

/// A query with its string parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcqlQuery {
    /// What to check
    pub query_type: QueryType,
    /// `key=value` parameters
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl AcqlQuery {
    /// Query without parameters
    pub fn new(query_type: QueryType) -> Self {
        Self {
            query_type,
            parameters: BTreeMap::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Look up a parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

/// What a query runs against: exactly one case or one fragment
#[derive(Debug, Clone, Copy)]
pub enum QueryTarget<'a> {
    /// A complete assurance case
    Case(&'a AssuranceCase),
    /// A fragment
    Fragment(&'a AssuranceCaseFragment),
}

impl<'a> QueryTarget<'a> {
    /// Id of the case or fragment
    pub fn id(&self) -> &'a str {
        match *self {
            QueryTarget::Case(case) => &case.id,
            QueryTarget::Fragment(fragment) => &fragment.id,
        }
    }

    /// The node arena
    pub fn graph(&self) -> &'a ArgumentGraph {
        match *self {
            QueryTarget::Case(case) => case.graph(),
            QueryTarget::Fragment(fragment) => fragment.graph(),
        }
    }

    /// Root goal id, if set
    pub fn root_goal_id(&self) -> Option<&'a str> {
        match *self {
            QueryTarget::Case(case) => case.root_goal_id(),
            QueryTarget::Fragment(fragment) => fragment.root_goal_id(),
        }
    }

    /// Evidence known to the target
    ///
    /// For a case this is the union over its nodes; a fragment keeps its own
    /// supplied-evidence set.
    pub fn evidence_ids(&self) -> BTreeSet<String> {
        match *self {
            QueryTarget::Case(case) => case.graph().evidence_ids(),
            QueryTarget::Fragment(fragment) => fragment.evidence_ids.clone(),
        }
    }
}

impl<'a> From<&'a AssuranceCase> for QueryTarget<'a> {
    fn from(case: &'a AssuranceCase) -> Self {
        QueryTarget::Case(case)
    }
}

impl<'a> From<&'a AssuranceCaseFragment> for QueryTarget<'a> {
    fn from(fragment: &'a AssuranceCaseFragment) -> Self {
        QueryTarget::Fragment(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_parse_ignores_case() {
        assert_eq!("COVERAGE".parse::<QueryType>().unwrap(), QueryType::Coverage);
        assert_eq!("Defeaters".parse::<QueryType>().unwrap(), QueryType::Defeaters);
        assert!(matches!("speed".parse::<QueryType>(), Err(AcqlError::Parse(_))));
    }

    #[test]
    fn test_query_params() {
        let q = AcqlQuery::new(QueryType::Coverage).with_param("threshold", "0.5");
        assert_eq!(q.param("threshold"), Some("0.5"));
        assert_eq!(q.param("other"), None);
    }
}
