//! Built-in theories and defeaters

use crate::{Defeater, DefeaterType, Severity, Theory, TheoryType};

/// Theories every engine starts with
pub fn default_theories() -> Vec<Theory> {
    vec![
        Theory::new(
            "test_coverage",
            "Test Coverage Theory",
            TheoryType::Reliability,
            "code_adequately_tested",
            0.85,
        )
        .with_premise("test_coverage >= 80%")
        .with_premise("tests_pass = true")
        .with_premise("branch_coverage >= 70%")
        .with_justification("High statement and branch coverage correlates with fewer escaped defects"),
        Theory::new(
            "static_analysis",
            "Static Analysis Theory",
            TheoryType::Security,
            "code_free_of_known_vulnerabilities",
            0.75,
        )
        .with_premise("static_scan_complete = true")
        .with_premise("critical_issues = 0")
        .with_premise("high_issues <= 2")
        .with_justification("Static analysis detects common vulnerability patterns"),
        Theory::new(
            "code_review",
            "Code Review Theory",
            TheoryType::Maintainability,
            "code_meets_quality_standards",
            0.80,
        )
        .with_premise("review_completed = true")
        .with_premise("reviewer_qualified = true")
        .with_premise("issues_resolved = true")
        .with_justification("Peer review catches issues automated tools miss"),
    ]
}

/// Defeaters every engine starts with
pub fn default_defeaters() -> Vec<Defeater> {
    vec![
        Defeater::new(
            "coverage_defeater",
            "Coverage Limitation Defeater",
            DefeaterType::Undercut,
            "code_adequately_tested",
            Severity::Medium,
        )
        .with_argument("High coverage does not show that tests check edge cases")
        .with_condition("test_quality_unverified")
        .with_condition("mutation_score < 70%"),
        Defeater::new(
            "static_analysis_defeater",
            "Static Analysis Limitation Defeater",
            DefeaterType::Undercut,
            "code_free_of_known_vulnerabilities",
            Severity::High,
        )
        .with_argument("Static analysis cannot detect runtime vulnerabilities or logic flaws")
        .with_condition("no_dynamic_testing")
        .with_condition("no_penetration_testing"),
        Defeater::new(
            "dependency_defeater",
            "Untrusted Dependency Defeater",
            DefeaterType::Rebuttal,
            "system_is_secure",
            Severity::Critical,
        )
        .with_argument("System uses dependencies with known vulnerabilities")
        .with_condition("vulnerable_dependencies > 0"),
    ]
}
