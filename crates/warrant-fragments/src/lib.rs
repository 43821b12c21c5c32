//! Warrant Fragment Library
//!
//! Keeps the fragments of one workspace and instantiates new ones from named
//! patterns. A pattern is a short list of (node type, statement) steps plus the
//! evidence types a fragment built from it must eventually supply.
//!
//! # Examples
//!
//! ```
//! use warrant_fragments::FragmentLibrary;
//!
//! let mut library = FragmentLibrary::new();
//! let fragment = library
//!     .create_from_pattern_with_id("component_quality", "auth", "auth_quality")
//!     .unwrap();
//! assert_eq!(fragment.node_count(), 5);
//! assert_eq!(fragment.required_evidence_types.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod library;
mod pattern;

pub use error::FragmentError;
pub use library::FragmentLibrary;
pub use pattern::{default_patterns, FragmentPattern, PatternStep};
