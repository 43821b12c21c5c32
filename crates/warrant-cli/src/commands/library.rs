//! Library command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the library command.
pub fn execute_library(config: &Config, formatter: &Formatter) -> Result<String> {
    let library = config.build_library()?;
    let reasoning = config.build_reasoning_engine()?;
    let patterns: Vec<_> = library.patterns().collect();
    formatter.format_library(&patterns, reasoning.theory_library(), reasoning.defeater_library())
}
