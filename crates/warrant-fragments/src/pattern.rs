//! Fragment patterns

use serde::{Deserialize, Serialize};
use warrant_domain::{FragmentType, NodeType};

/// One node of a pattern skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternStep {
    /// Kind of node to create
    pub node_type: NodeType,
    /// Statement of the created node
    pub statement: String,
}

impl PatternStep {
    /// Create a step
    pub fn new(node_type: NodeType, statement: impl Into<String>) -> Self {
        Self {
            node_type,
            statement: statement.into(),
        }
    }
}

/// A reusable fragment template
///
/// The first step becomes the root goal. Every later step is attached to the
/// most recent Strategy (or the root when no Strategy has appeared yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentPattern {
    /// Display name given to instantiated fragments
    pub name: String,
    /// Type given to instantiated fragments
    pub fragment_type: FragmentType,
    /// Evidence types marked outstanding on instantiation
    #[serde(default)]
    pub required_evidence: Vec<String>,
    /// Node skeleton
    pub structure: Vec<PatternStep>,
}

/// The patterns every library starts with
pub fn default_patterns() -> Vec<(String, FragmentPattern)> {
    vec![
        (
            "component_quality".to_string(),
            skeleton(
                "Component Quality Assurance",
                FragmentType::Quality,
                &["static_analysis", "unit_tests", "code_review"],
                "Component meets quality standards",
                "Argue through multi-faceted quality assessment",
                &[
                    "Code quality is acceptable",
                    "Tests are comprehensive",
                    "Review process followed",
                ],
            ),
        ),
        (
            "component_security".to_string(),
            skeleton(
                "Component Security Assurance",
                FragmentType::Security,
                &["security_scan", "dependency_check", "threat_model"],
                "Component is secure",
                "Argue through security analysis",
                &[
                    "No known vulnerabilities",
                    "Dependencies are secure",
                    "Threats are mitigated",
                ],
            ),
        ),
        (
            "integration".to_string(),
            skeleton(
                "Integration Assurance",
                FragmentType::Integration,
                &["integration_tests", "api_tests", "compatibility_tests"],
                "Components integrate correctly",
                "Argue through integration testing",
                &[
                    "APIs are compatible",
                    "Data flow is correct",
                    "Error handling works",
                ],
            ),
        ),
    ]
}

// Goal, Strategy, then one sub-goal per entry
fn skeleton(
    name: &str,
    fragment_type: FragmentType,
    evidence: &[&str],
    goal: &str,
    strategy: &str,
    sub_goals: &[&str],
) -> FragmentPattern {
    let mut structure = vec![
        PatternStep::new(NodeType::Goal, goal),
        PatternStep::new(NodeType::Strategy, strategy),
    ];
    structure.extend(sub_goals.iter().map(|s| PatternStep::new(NodeType::Goal, *s)));

    FragmentPattern {
        name: name.to_string(),
        fragment_type,
        required_evidence: evidence.iter().map(|e| e.to_string()).collect(),
        structure,
    }
}
