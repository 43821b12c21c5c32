//! Warrant Dependency Tracker
//!
//! Keeps a registry of resources owned by different tools (source files,
//! requirements, tests, evidence, fragments, cases) and the typed links
//! between them, so that a change to one resource can be traced to every
//! argument that relies on it.
//!
//! ## Operations
//!
//! - Register resources with stable derived ids
//! - Link a resource to its dependents
//! - Update a resource, notifying listeners on it and on its dependents
//! - Expand dependency chains and run breadth-first impact analysis
//! - Map design requirements onto implementation components, reporting
//!   discrepancies, coverage and a traceability matrix

#![warn(missing_docs)]
#![warn(clippy::all)]

mod architecture;
mod error;
mod resource;
mod tracker;

pub use architecture::{
    ArchitectureComponent, ArchitectureMapper, ArchitectureSummary, ComponentKind, CoverageMapping,
    DesignMapping, DesignRequirement, Discrepancy, DiscrepancyKind, ImplementingComponent, Interface,
    RequirementType, Severity, TraceabilityMatrix, TraceabilityRow, LOW_COVERAGE_PERCENT,
};
pub use error::TrackerError;
pub use resource::{Dependency, DependencyType, NewResource, Resource, ResourceType};
pub use tracker::{
    ChainLink, DependencyChain, DependencyTracker, Direction, ImpactReport, ImpactedResource,
    Listener, TrackerStatistics, UpdateKind,
};
