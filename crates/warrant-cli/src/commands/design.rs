//! Design command implementation.

use super::read_file;
use crate::cli::DesignArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::collections::BTreeMap;
use tracing::debug;

/// Execute the design command.
///
/// Maps the configured components onto the configured requirements, then
/// attaches coverage when a coverage file is given.
pub fn execute_design(args: DesignArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let mut mapper = config.build_architecture_mapper();
    let mapping = mapper.map_to_design();

    let coverage = match &args.coverage {
        Some(path) => {
            let data: BTreeMap<String, f64> = serde_json::from_str(&read_file(path)?)?;
            debug!(files = data.len(), "Loaded coverage data");
            Some(mapper.track_coverage(&data))
        }
        None => None,
    };

    formatter.format_design(&mapping, &mapper.traceability_matrix(), coverage.as_ref())
}
