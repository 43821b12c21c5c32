//! Warrant Reasoning
//!
//! Defeasible reasoning over assurance cases. Theories turn evidence facts
//! into confidence in a conclusion; defeaters are known counterarguments that
//! lower that confidence when they apply to a claim the case makes.
//!
//! ## Scoring
//!
//! - A theory applies when every `variable OP value` premise holds in the
//!   evidence context
//! - Base confidence is the mean confidence of the applicable theories
//! - Each active defeater subtracts a fixed penalty, floored at zero
//! - Risk starts at `1 - base confidence` and grows with every active
//!   critical or high-severity defeater, capped at 1
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use warrant_domain::AssuranceCaseBuilder;
//! use warrant_reasoning::{EvidenceContext, ReasoningEngine};
//!
//! let mut builder = AssuranceCaseBuilder::new("svc", "Service", "");
//! builder.add_goal("Code meets quality standards");
//! let case = builder.build();
//!
//! let mut context = EvidenceContext::new();
//! context.insert("review_completed".into(), json!(true));
//! context.insert("reviewer_qualified".into(), json!(true));
//! context.insert("issues_resolved".into(), json!(true));
//!
//! let report = ReasoningEngine::default().reason_about_case(&case, &context);
//! assert_eq!(report.applicable_theories[0].id, "code_review");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod defaults;
mod defeater;
mod engine;
mod error;
mod premise;
mod report;
mod theory;

pub use config::ReasoningConfig;
pub use defaults::{default_defeaters, default_theories};
pub use defeater::{Defeater, DefeaterType, Severity};
pub use engine::ReasoningEngine;
pub use error::ReasoningError;
pub use premise::{evaluate_premise, is_truthy, Comparison, EvidenceContext, Premise};
pub use report::{ConsistencyAnalysis, ConsistencyIssue, ReasoningReport, RiskLevel, RiskReport};
pub use theory::{Theory, TheoryType};
