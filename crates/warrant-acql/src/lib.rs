//! Warrant ACQL
//!
//! Assurance Case Query Language: structural and heuristic checks over a case
//! or fragment, plus a line-oriented script runner.
//!
//! ## Query types
//!
//! | Query | Looks at |
//! |-------|----------|
//! | consistency | goal pairs, via a [`ContradictionStrategy`](warrant_domain::ContradictionStrategy) |
//! | completeness | element kinds, orphans, unsupported leaves |
//! | soundness | childless strategies, unsupported leaf goals |
//! | coverage | evidenced leaves / leaves |
//! | traceability | root-to-evidence paths |
//! | weaknesses | every failing check above |
//! | dependencies | fragment dependencies or case edges |
//! | defeaters | absolute and unsupported security claims |
//!
//! Results are always structured values; a failing check is data, not an
//! error. Script lines that cannot be understood are skipped.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod engine;
mod error;
mod query;
mod results;
mod script;

pub use config::AcqlConfig;
pub use engine::AcqlEngine;
pub use error::AcqlError;
pub use query::{AcqlQuery, QueryTarget, QueryType};
pub use results::{
    CompletenessReport, ConsistencyReport, Contradiction, CoverageReport, DefeaterReport,
    DependencyEdge, DependencyReport, PotentialDefeater, QueryResult, SoundnessReport,
    TraceabilityReport, Weakness, WeaknessKind, WeaknessReport,
};
pub use script::{parse_line, ParsedLine, ScriptResult};
