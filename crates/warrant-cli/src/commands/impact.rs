//! Impact command implementation.

use crate::cli::ImpactArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use warrant_tracker::{DependencyTracker, DependencyType, NewResource, ResourceType};

/// Tool name recorded on tracked resources.
const TOOL: &str = "warrant";

/// Execute the impact command.
///
/// Configured fragments and their evidence become tracked resources. A
/// fragment depends on the fragments named in `depends_on` and is validated
/// by its evidence.
pub fn execute_impact(args: ImpactArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let tracker = build_tracker(config)?;
    let report = tracker.impact_analysis(&args.fragment)?;
    let chain = args
        .depth
        .map(|depth| tracker.dependency_chain(&args.fragment, depth));
    formatter.format_impact(&report, chain.as_ref())
}

/// Tracker populated from the configured fragments.
pub fn build_tracker(config: &Config) -> Result<DependencyTracker> {
    let mut tracker = DependencyTracker::new();

    for entry in &config.fragments {
        tracker.register_resource(
            NewResource::new(ResourceType::Fragment, &entry.id, &entry.component, TOOL)
                .with_id(&entry.id)
                .with_metadata("pattern", entry.pattern.clone().into()),
        );
        for evidence in &entry.evidence {
            tracker.register_resource(
                NewResource::new(ResourceType::Evidence, &evidence.id, &evidence.evidence_type, TOOL)
                    .with_id(&evidence.id),
            );
        }
    }

    for entry in &config.fragments {
        for dependency in &entry.depends_on {
            tracker.link_resources(dependency, &entry.id, DependencyType::Requires, "declared in configuration")?;
        }
        for evidence in &entry.evidence {
            tracker.link_resources(&evidence.id, &entry.id, DependencyType::Validates, &evidence.evidence_type)?;
        }
    }

    Ok(tracker)
}
