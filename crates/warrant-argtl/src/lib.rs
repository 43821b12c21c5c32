//! Warrant ArgTL
//!
//! Argument Transformation Language: an engine that assembles fragments from a
//! [`FragmentLibrary`](warrant_fragments::FragmentLibrary) into larger fragments
//! and complete assurance cases, plus a small line-oriented script language
//! driving it.
//!
//! ## Key Concepts
//!
//! - **Composition**: parallel, sequential or hierarchical combination of
//!   fragments into a new fragment. Source nodes are copied, never shared.
//! - **Linking**: dependencies between fragments through named interface points
//! - **Validation rules**: named predicates over a fragment and its library
//! - **History**: every compose, link and validate is recorded
//!
//! ## Error policy
//!
//! Engine methods fail fast. [`ArgTlScript`] catches failures per line and
//! keeps going.
//!
//! # Examples
//!
//! ```
//! use warrant_argtl::{ArgTlEngine, ArgTlScript};
//! use warrant_fragments::FragmentLibrary;
//!
//! let mut library = FragmentLibrary::new();
//! library.create_from_pattern_with_id("component_quality", "ui", "ui_q").unwrap();
//! library.create_from_pattern_with_id("integration", "ui", "ui_i").unwrap();
//!
//! let mut engine = ArgTlEngine::new(library);
//! let report = ArgTlScript::new(&mut engine).execute("compose ui_q ui_i -> ui\nvalidate ui");
//! assert!(report.is_success());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod error;
mod script;
mod transformation;

pub use engine::{ArgTlEngine, ValidationRule, MIN_DEPENDENCY_STRENGTH};
pub use error::ArgTlError;
pub use script::{
    ArgTlScript, CommandOutput, CommandRecord, ErrorRecord, ScriptReport, STRATEGY_VARIABLE,
};
pub use transformation::{CompositionStrategy, Transformation, TransformationKind};
