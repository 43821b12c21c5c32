//! Validate command implementation.

use super::load_case;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the validate command.
pub fn execute_validate(args: ValidateArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    if let Some(path) = &args.case {
        let case = load_case(path)?;
        return formatter.format_case_validation(&case.validate());
    }

    let fragment_id = args
        .fragment
        .as_deref()
        .ok_or_else(|| CliError::InvalidInput("Either --case or --fragment is required".to_string()))?;

    let mut engine = config.build_argtl_engine()?;
    let rules: Vec<&str> = args.rules.iter().map(String::as_str).collect();
    let selected = if rules.is_empty() { None } else { Some(rules.as_slice()) };
    let results = engine.validate_fragment(fragment_id, selected)?;
    formatter.format_rule_results(fragment_id, &results)
}
