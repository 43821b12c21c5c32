//! Compose command implementation.

use super::read_file;
use crate::cli::ComposeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::fs;
use tracing::info;
use warrant_argtl::{ArgTlScript, CommandOutput};

/// Execute the compose command.
pub fn execute_compose(args: ComposeArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let script = read_file(&args.script)?;
    let mut engine = config.build_argtl_engine()?;
    let report = ArgTlScript::new(&mut engine).execute(&script);

    if let Some(dir) = &args.out {
        fs::create_dir_all(dir)?;
        for record in &report.commands {
            let CommandOutput::Composed { fragment_id } = &record.result else {
                continue;
            };
            if let Some(fragment) = engine.library().get_fragment(fragment_id) {
                let path = dir.join(format!("{}.json", fragment_id));
                fs::write(&path, fragment.to_json()?)?;
                info!(fragment = %fragment_id, path = %path.display(), "Wrote composed fragment");
            }
        }
    }

    formatter.format_script_report(&report)
}
