//! Warrant Domain Layer
//!
//! This crate holds the argument model every other Warrant crate builds on.
//! It performs no I/O and no logging; infrastructure lives in other crates and
//! talks to the domain through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **GSN node**: a Goal, Strategy, Solution, Context, Assumption or
//!   Justification with symmetric parent/child edges and evidence links
//! - **Argument graph**: the arena that owns the nodes of one case or fragment
//! - **Assurance case**: a rooted argument graph claiming a top-level goal
//! - **Fragment**: a reusable sub-argument tracking satisfied and outstanding
//!   evidence, dependencies on other fragments and a derived strength score
//! - **Contradiction strategies**: the two keyword heuristics used to flag
//!   conflicting goals
//!
//! ## Architecture
//!
//! - Pure, synchronous, single-writer data structures
//! - Edges are stored by node id so graphs serialize and deep-copy cleanly
//! - Trait definitions for the graph-store collaborator

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod case;
pub mod error;
pub mod fragment;
pub mod graph;
pub mod gsn;
pub mod text;
pub mod traits;

// Re-exports for convenience
pub use builder::AssuranceCaseBuilder;
pub use case::{AssuranceCase, CaseValidation};
pub use error::DomainError;
pub use fragment::{
    AssuranceCaseFragment, FragmentStatus, FragmentType, StrengthAssessment, ValidationThresholds,
};
pub use graph::ArgumentGraph;
pub use gsn::{GsnNode, NodeType};
pub use text::ContradictionStrategy;
pub use traits::{GraphStore, NodeHandle};
