//! Assurance theories

use crate::premise::{evaluate_premise, EvidenceContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality attribute a theory argues for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TheoryType {
    /// Hazard avoidance
    Safety,
    /// Resistance to attack
    Security,
    /// Correct operation over time
    Reliability,
    /// Ease of change
    Maintainability,
    /// Speed and resource use
    Performance,
}

impl TheoryType {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            TheoryType::Safety => "safety",
            TheoryType::Security => "security",
            TheoryType::Reliability => "reliability",
            TheoryType::Maintainability => "maintainability",
            TheoryType::Performance => "performance",
        }
    }
}

impl fmt::Display for TheoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TheoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "safety" => Ok(TheoryType::Safety),
            "security" => Ok(TheoryType::Security),
            "reliability" => Ok(TheoryType::Reliability),
            "maintainability" => Ok(TheoryType::Maintainability),
            "performance" => Ok(TheoryType::Performance),
            other => Err(format!("Unknown theory type: {}", other)),
        }
    }
}

/// A reusable inference: when every premise holds, the conclusion follows
/// with the given confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theory {
    /// Registry key
    pub id: String,

    /// Display name
    pub name: String,

    /// Attribute argued for
    #[serde(rename = "type")]
    pub theory_type: TheoryType,

    /// `variable OP value` premises, all required
    #[serde(default)]
    pub premises: Vec<String>,

    /// Claim established when the theory applies
    pub conclusion: String,

    /// Why the inference is accepted
    #[serde(default)]
    pub justification: String,

    /// Confidence in the conclusion (0.0-1.0)
    pub confidence: f64,
}

impl Theory {
    /// Create a theory with no premises
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        theory_type: TheoryType,
        conclusion: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            theory_type,
            premises: Vec::new(),
            conclusion: conclusion.into(),
            justification: String::new(),
            confidence,
        }
    }

    /// Add a premise
    pub fn with_premise(mut self, premise: impl Into<String>) -> Self {
        self.premises.push(premise.into());
        self
    }

    /// Set the justification
    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = justification.into();
        self
    }

    /// True if every premise holds in `context`
    pub fn applies(&self, context: &EvidenceContext) -> bool {
        self.premises.iter().all(|p| evaluate_premise(p, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_applies_needs_every_premise() {
        let theory = Theory::new("t", "T", TheoryType::Reliability, "ok", 0.8)
            .with_premise("a >= 1")
            .with_premise("b = yes");

        let mut ctx = EvidenceContext::new();
        ctx.insert("a".into(), json!(2));
        assert!(!theory.applies(&ctx));

        ctx.insert("b".into(), json!("YES"));
        assert!(theory.applies(&ctx));
    }

    #[test]
    fn test_toml_definition() {
        let theory: Theory = toml::from_str(
            r#"
id = "fuzzing"
name = "Fuzzing Theory"
type = "security"
premises = ["fuzz_hours >= 24"]
conclusion = "parser_robust"
confidence = 0.7
"#,
        )
        .unwrap();
        assert_eq!(theory.theory_type, TheoryType::Security);
        assert_eq!(theory.premises.len(), 1);
        assert!(theory.justification.is_empty());
    }
}
