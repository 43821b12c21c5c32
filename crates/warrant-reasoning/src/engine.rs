//! Defeasible reasoning over assurance cases

use crate::defaults::{default_defeaters, default_theories};
use crate::premise::EvidenceContext;
use crate::{
    ConsistencyAnalysis, ConsistencyIssue, Defeater, ReasoningConfig, ReasoningError,
    ReasoningReport, RiskLevel, RiskReport, Severity, Theory,
};
use tracing::{debug, warn};
use warrant_domain::{AssuranceCase, ContradictionStrategy, GsnNode, NodeType};

/// Scores cases against registered theories and defeaters
///
/// Each engine owns its registries; registering under an existing id
/// replaces the earlier entry in place.
#[derive(Debug, Clone)]
pub struct ReasoningEngine {
    config: ReasoningConfig,
    theories: Vec<Theory>,
    defeaters: Vec<Defeater>,
}

impl Default for ReasoningEngine {
    fn default() -> Self {
        Self::new(ReasoningConfig::default())
    }
}

impl ReasoningEngine {
    /// Engine seeded with the built-in theories and defeaters
    pub fn new(config: ReasoningConfig) -> Self {
        Self {
            config,
            theories: default_theories(),
            defeaters: default_defeaters(),
        }
    }

    /// Engine with empty registries
    pub fn empty(config: ReasoningConfig) -> Self {
        Self {
            config,
            theories: Vec::new(),
            defeaters: Vec::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ReasoningConfig {
        &self.config
    }

    /// Add or replace a theory
    pub fn register_theory(&mut self, theory: Theory) -> Result<(), ReasoningError> {
        if theory.id.is_empty() {
            return Err(ReasoningError::InvalidTheory {
                id: theory.id,
                reason: "empty id".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&theory.confidence) {
            return Err(ReasoningError::InvalidTheory {
                reason: format!("confidence {} outside [0, 1]", theory.confidence),
                id: theory.id,
            });
        }

        match self.theories.iter_mut().find(|t| t.id == theory.id) {
            Some(existing) => *existing = theory,
            None => self.theories.push(theory),
        }
        Ok(())
    }

    /// Add or replace a defeater
    pub fn register_defeater(&mut self, defeater: Defeater) -> Result<(), ReasoningError> {
        if defeater.id.is_empty() {
            return Err(ReasoningError::InvalidDefeater {
                id: defeater.id,
                reason: "empty id".to_string(),
            });
        }

        match self.defeaters.iter_mut().find(|d| d.id == defeater.id) {
            Some(existing) => *existing = defeater,
            None => self.defeaters.push(defeater),
        }
        Ok(())
    }

    /// Registered theories in registration order
    pub fn theory_library(&self) -> &[Theory] {
        &self.theories
    }

    /// Registered defeaters in registration order
    pub fn defeater_library(&self) -> &[Defeater] {
        &self.defeaters
    }

    /// Apply theories and defeaters to `case` under `context`
    pub fn reason_about_case(&self, case: &AssuranceCase, context: &EvidenceContext) -> ReasoningReport {
        let applicable_theories: Vec<Theory> = self
            .theories
            .iter()
            .filter(|t| t.applies(context))
            .cloned()
            .collect();

        let active_defeaters: Vec<Defeater> = self
            .defeaters
            .iter()
            .filter(|d| d.is_active(case, context, self.config.claim_match_threshold))
            .cloned()
            .collect();
        for defeater in &active_defeaters {
            debug!(case = %case.id, defeater = %defeater.id, severity = %defeater.severity, "Defeater active");
        }

        let (base_confidence, confidence_score) = if applicable_theories.is_empty() {
            (0.0, 0.0)
        } else {
            let base = applicable_theories.iter().map(|t| t.confidence).sum::<f64>()
                / applicable_theories.len() as f64;
            let penalty = active_defeaters.len() as f64 * self.config.defeater_penalty;
            (base, (base - penalty).max(0.0))
        };

        let mut report = ReasoningReport {
            indefeasible: active_defeaters.is_empty(),
            applicable_theories,
            active_defeaters,
            base_confidence,
            confidence_score,
            recommendations: Vec::new(),
        };
        report.recommendations = self.recommendations(&report);

        debug!(
            case = %case.id,
            theories = report.applicable_theories.len(),
            defeaters = report.active_defeaters.len(),
            confidence = report.confidence_score,
            "Reasoning complete"
        );
        report
    }

    /// Risk from base confidence and the severity of active defeaters
    pub fn estimate_risk(&self, case: &AssuranceCase, context: &EvidenceContext) -> RiskReport {
        let reasoning = self.reason_about_case(case, context);

        let count = |severity: Severity| {
            reasoning
                .active_defeaters
                .iter()
                .filter(|d| d.severity == severity)
                .count()
        };
        let critical_issues = count(Severity::Critical);
        let high_issues = count(Severity::High);

        let risk_score = ((1.0 - reasoning.base_confidence)
            + critical_issues as f64 * self.config.critical_risk_weight
            + high_issues as f64 * self.config.high_risk_weight)
            .min(1.0);

        let risk_level = if risk_score >= self.config.high_risk_threshold {
            RiskLevel::High
        } else if risk_score >= self.config.medium_risk_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        RiskReport {
            risk_score,
            risk_level,
            confidence_score: reasoning.confidence_score,
            base_confidence: reasoning.base_confidence,
            critical_issues,
            high_issues,
            indefeasible: reasoning.indefeasible,
            recommendations: reasoning.recommendations,
        }
    }

    /// Antonym-pair contradiction check over the case's goals
    pub fn analyze_consistency(&self, case: &AssuranceCase) -> ConsistencyAnalysis {
        self.analyze_consistency_with(case, ContradictionStrategy::AntonymPairs)
    }

    /// Contradiction check with a chosen heuristic
    pub fn analyze_consistency_with(
        &self,
        case: &AssuranceCase,
        strategy: ContradictionStrategy,
    ) -> ConsistencyAnalysis {
        let mut goals: Vec<&GsnNode> = case.graph().of_type(NodeType::Goal).collect();

        let limit = self.config.max_pairwise_goals;
        let goals_skipped = goals.len().saturating_sub(limit);
        if goals_skipped > 0 {
            warn!(
                case = %case.id,
                goals = goals.len(),
                limit,
                "Consistency analysis truncated"
            );
            goals.truncate(limit);
        }

        let mut issues = Vec::new();
        for (i, a) in goals.iter().enumerate() {
            for b in &goals[i + 1..] {
                if strategy.contradicts(&a.statement, &b.statement) {
                    issues.push(ConsistencyIssue {
                        goal1: a.id.clone(),
                        goal2: b.id.clone(),
                        description: format!(
                            "Goals '{}' and '{}' appear contradictory",
                            a.statement, b.statement
                        ),
                    });
                }
            }
        }

        ConsistencyAnalysis {
            consistent: issues.is_empty(),
            strategy,
            issues,
            goals_skipped,
        }
    }

    fn recommendations(&self, report: &ReasoningReport) -> Vec<String> {
        let mut out = Vec::new();

        if report.confidence_score < self.config.low_confidence_threshold {
            out.push("Confidence score is low - strengthen evidence or argument structure".to_string());
        }
        if !report.indefeasible {
            out.push("Active defeaters found - address vulnerabilities or refute defeaters".to_string());
        }
        if report.applicable_theories.is_empty() {
            out.push("No theories apply - ensure evidence meets theory premises".to_string());
        }
        for defeater in &report.active_defeaters {
            if defeater.severity == Severity::Critical {
                out.push(format!("Critical defeater: {} - immediate action required", defeater.name));
            }
        }

        out
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::TheoryType;
    use proptest::prelude::*;

    proptest! {
        /// Property: confidence and risk stay within [0, 1]
        #[test]
        fn test_scores_bounded(
            confidences in prop::collection::vec(0.0f64..=1.0, 1..6),
            defeaters in 0usize..8,
        ) {
            let mut engine = ReasoningEngine::empty(ReasoningConfig::default());
            for (i, c) in confidences.iter().enumerate() {
                engine.register_theory(Theory::new(format!("t{}", i), "T", TheoryType::Safety, "x", *c)).unwrap();
            }
            for i in 0..defeaters {
                engine.register_defeater(Defeater::new(
                    format!("d{}", i), "D", crate::DefeaterType::Rebuttal, "", Severity::Critical,
                )).unwrap();
            }

            let mut case = AssuranceCase::new("c", "C", "");
            case.add_node(GsnNode::new("G1", NodeType::Goal, "anything"));

            let risk = engine.estimate_risk(&case, &EvidenceContext::new());
            prop_assert!((0.0..=1.0).contains(&risk.confidence_score));
            prop_assert!((0.0..=1.0).contains(&risk.risk_score));
            prop_assert!(risk.confidence_score <= risk.base_confidence);
            prop_assert_eq!(risk.critical_issues, defeaters);
        }
    }
}
