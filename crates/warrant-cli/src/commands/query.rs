//! Query command implementation.

use super::{load_case, read_file};
use crate::cli::QueryArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::collections::BTreeMap;
use warrant_acql::QueryTarget;
use warrant_domain::AssuranceCase;

/// Execute the query command.
///
/// Script lines may name any loaded case by its id or any configured fragment.
/// A case shadows a fragment with the same id.
pub fn execute_query(args: QueryArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let script = read_file(&args.script)?;
    let library = config.build_argtl_engine()?.into_library();
    let cases = args
        .cases
        .iter()
        .map(|path| load_case(path))
        .collect::<Result<Vec<AssuranceCase>>>()?;

    let mut targets: BTreeMap<String, QueryTarget<'_>> = library
        .list_fragments(None, None)
        .into_iter()
        .map(|fragment| (fragment.id.clone(), QueryTarget::Fragment(fragment)))
        .collect();
    for case in &cases {
        targets.insert(case.id.clone(), QueryTarget::Case(case));
    }

    let results = config.acql_engine().execute_script(&script, &targets);
    formatter.format_query_results(&results)
}
