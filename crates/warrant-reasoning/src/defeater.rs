//! Defeaters: arguments that can refute a claim

use crate::premise::{evaluate_premise, is_truthy, EvidenceContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use warrant_domain::text::token_set;
use warrant_domain::AssuranceCase;

/// How a defeater attacks its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefeaterType {
    /// Directly contradicts the claim
    Rebuttal,
    /// Attacks the inference
    Undercut,
    /// Attacks the support
    Undercutter,
    /// Shows an exception
    Counterexample,
}

impl DefeaterType {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            DefeaterType::Rebuttal => "rebuttal",
            DefeaterType::Undercut => "undercut",
            DefeaterType::Undercutter => "undercutter",
            DefeaterType::Counterexample => "counterexample",
        }
    }
}

impl fmt::Display for DefeaterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defeater severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Minor
    Low,
    /// Worth addressing
    Medium,
    /// Raises risk
    High,
    /// Raises risk sharply; needs immediate action
    Critical,
}

impl Severity {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("Unknown severity: {}", other)),
        }
    }
}

/// A known counterargument against a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defeater {
    /// Registry key
    pub id: String,

    /// Display name
    pub name: String,

    /// Kind of attack
    #[serde(rename = "type")]
    pub defeater_type: DefeaterType,

    /// Claim under attack, matched fuzzily against node statements
    pub target_claim: String,

    /// The counterargument
    #[serde(default)]
    pub argument: String,

    /// Premises or context keys; any one activates the defeater
    #[serde(default)]
    pub conditions: Vec<String>,

    /// How bad it is when active
    pub severity: Severity,
}

impl Defeater {
    /// Create an unconditional defeater
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        defeater_type: DefeaterType,
        target_claim: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            defeater_type,
            target_claim: target_claim.into(),
            argument: String::new(),
            conditions: Vec::new(),
            severity,
        }
    }

    /// Set the counterargument text
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = argument.into();
        self
    }

    /// Add an activation condition
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// True if at least `threshold` of the target tokens appear in `statement`
    pub fn matches_statement(&self, statement: &str, threshold: f64) -> bool {
        let target = token_set(&self.target_claim);
        let common = target.intersection(&token_set(statement)).count();
        common as f64 >= target.len() as f64 * threshold
    }

    /// True if some node of `case` states the target claim
    pub fn targets(&self, case: &AssuranceCase, threshold: f64) -> bool {
        case.graph()
            .iter()
            .any(|node| self.matches_statement(&node.statement, threshold))
    }

    /// True if there are no conditions or any condition holds
    ///
    /// A condition holds when it evaluates true as a premise or names a
    /// truthy context value.
    pub fn conditions_hold(&self, context: &EvidenceContext) -> bool {
        self.conditions.is_empty()
            || self.conditions.iter().any(|c| {
                evaluate_premise(c, context) || context.get(c).is_some_and(is_truthy)
            })
    }

    /// Target present in `case` and conditions met
    pub fn is_active(&self, case: &AssuranceCase, context: &EvidenceContext, threshold: f64) -> bool {
        self.targets(case, threshold) && self.conditions_hold(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use warrant_domain::{GsnNode, NodeType};

    fn defeater() -> Defeater {
        Defeater::new(
            "d",
            "Dependency Defeater",
            DefeaterType::Rebuttal,
            "system_is_secure",
            Severity::Critical,
        )
        .with_condition("vulnerable_dependencies > 0")
        .with_condition("unpatched")
    }

    #[test]
    fn test_fuzzy_claim_match() {
        let d = defeater();
        assert!(d.matches_statement("The system is secure against remote attackers", 0.7));
        // two of three tokens is below 70%
        assert!(!d.matches_statement("The system is fast", 0.7));
        assert!(d.matches_statement("The system is fast", 0.6));
    }

    #[test]
    fn test_empty_target_matches_any_statement() {
        let d = Defeater::new("d", "D", DefeaterType::Counterexample, "", Severity::Low);
        assert!(d.matches_statement("anything", 0.7));
    }

    #[test]
    fn test_conditions() {
        let d = defeater();
        let mut ctx = EvidenceContext::new();
        assert!(!d.conditions_hold(&ctx));

        ctx.insert("vulnerable_dependencies".into(), json!(0));
        assert!(!d.conditions_hold(&ctx));

        ctx.insert("unpatched".into(), json!("yes"));
        assert!(d.conditions_hold(&ctx));

        let unconditional = Defeater::new("u", "U", DefeaterType::Undercut, "x", Severity::Low);
        assert!(unconditional.conditions_hold(&EvidenceContext::new()));
    }

    #[test]
    fn test_is_active_needs_target_in_case() {
        let d = defeater();
        let mut ctx = EvidenceContext::new();
        ctx.insert("vulnerable_dependencies".into(), json!(3));

        let mut case = AssuranceCase::new("c", "C", "");
        case.add_node(GsnNode::new("G1", NodeType::Goal, "Code is reviewed"));
        assert!(!d.is_active(&case, &ctx, 0.7));

        case.add_node(GsnNode::new("G2", NodeType::Goal, "System is secure"));
        assert!(d.is_active(&case, &ctx, 0.7));
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Low < Severity::Medium);
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
    }
}
