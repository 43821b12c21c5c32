//! Reasoning engine configuration

use serde::Deserialize;

/// Weights and thresholds for confidence and risk scoring
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    /// Confidence subtracted per active defeater
    pub defeater_penalty: f64,

    /// Risk added per active critical defeater
    pub critical_risk_weight: f64,

    /// Risk added per active high-severity defeater
    pub high_risk_weight: f64,

    /// Share of a defeater's target tokens that must appear in a node statement
    pub claim_match_threshold: f64,

    /// Confidence below this triggers a recommendation
    pub low_confidence_threshold: f64,

    /// Risk at or above this is MEDIUM
    pub medium_risk_threshold: f64,

    /// Risk at or above this is HIGH
    pub high_risk_threshold: f64,

    /// Goals beyond this count are left out of pairwise consistency analysis
    pub max_pairwise_goals: usize,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            defeater_penalty: 0.15,
            critical_risk_weight: 0.30,
            high_risk_weight: 0.15,
            claim_match_threshold: 0.7,
            low_confidence_threshold: 0.5,
            medium_risk_threshold: 0.4,
            high_risk_threshold: 0.7,
            max_pairwise_goals: 500,
        }
    }
}

impl ReasoningConfig {
    /// Heavier penalties and lower risk bands
    pub fn strict() -> Self {
        Self {
            defeater_penalty: 0.25,
            critical_risk_weight: 0.5,
            high_risk_weight: 0.25,
            claim_match_threshold: 0.5,
            low_confidence_threshold: 0.7,
            medium_risk_threshold: 0.3,
            high_risk_threshold: 0.6,
            ..Self::default()
        }
    }
}
