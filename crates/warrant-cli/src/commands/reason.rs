//! Reason command implementation.

use super::{load_case, read_file};
use crate::cli::ReasonArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;
use warrant_reasoning::EvidenceContext;

/// Execute the reason command.
pub fn execute_reason(args: ReasonArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let case = load_case(&args.case)?;
    let engine = config.build_reasoning_engine()?;

    if let Some(strategy) = args.consistency {
        let analysis = engine.analyze_consistency_with(&case, strategy.into());
        return formatter.format_consistency(&analysis);
    }

    let context = match &args.context {
        Some(path) => load_context(path)?,
        None => EvidenceContext::new(),
    };

    if args.risk {
        formatter.format_risk(&engine.estimate_risk(&case, &context))
    } else {
        formatter.format_reasoning(&engine.reason_about_case(&case, &context))
    }
}

/// Parse an evidence context; the document must be a JSON object.
fn load_context(path: &Path) -> Result<EvidenceContext> {
    let value: serde_json::Value = serde_json::from_str(&read_file(path)?)?;
    match value {
        serde_json::Value::Object(facts) => Ok(facts.into_iter().collect()),
        _ => Err(CliError::InvalidInput(format!(
            "{} must contain a JSON object of facts",
            path.display()
        ))),
    }
}
