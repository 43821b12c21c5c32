//! Assemble command implementation.

use super::read_file;
use crate::cli::AssembleArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use std::collections::BTreeMap;
use std::fs;
use tracing::{info, warn};
use warrant_argtl::ArgTlScript;
use warrant_domain::{AssuranceCase, AssuranceCaseBuilder};
use warrant_store::EvidenceGraph;

/// Evidence type recorded for ids the configuration does not describe.
const UNKNOWN_EVIDENCE_TYPE: &str = "unknown";

/// Execute the assemble command.
pub fn execute_assemble(args: AssembleArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let mut engine = config.build_argtl_engine()?;
    let mut lines = Vec::new();

    if let Some(path) = &args.script {
        let report = ArgTlScript::new(&mut engine).execute(&read_file(path)?);
        if !report.is_success() {
            warn!(errors = report.errors.len(), "Script finished with errors");
            for error in &report.errors {
                lines.push(formatter.warning(&format!("line {}: {}", error.line, error.error)));
            }
        }
    }

    let fragment_ids: Vec<&str> = args.fragments.iter().map(String::as_str).collect();
    let case = engine.assemble_case(&fragment_ids, &args.case_id, &args.title)?;

    if let Some(path) = &args.out {
        fs::write(path, case.to_json()?)?;
        lines.push(formatter.success(&format!("Wrote {}", path.display())));
    }

    if let Some(dir) = &args.graph {
        let mut graph = EvidenceGraph::open(dir)?;
        let known = evidence_types(config);
        for evidence_id in case_evidence(&case) {
            let evidence_type = known.get(evidence_id).copied().unwrap_or(UNKNOWN_EVIDENCE_TYPE);
            graph.add_evidence(evidence_id, evidence_type);
        }
        AssuranceCaseBuilder::from_case(case.clone()).save_to_graph(&mut graph)?;
        info!(dir = %dir.display(), nodes = graph.node_count(), "Persisted case");
        lines.push(formatter.success(&format!(
            "Stored case in {} ({} nodes, {} relationships)",
            dir.display(),
            graph.node_count(),
            graph.relationship_count()
        )));
    }

    if formatter.format() == OutputFormat::Json {
        return Ok(case.to_json()?);
    }

    lines.push(formatter.format_case_validation(&case.validate())?);
    Ok(lines.join("\n"))
}

/// Evidence ids linked anywhere in the case, deduplicated.
fn case_evidence(case: &AssuranceCase) -> Vec<&str> {
    let mut ids: Vec<&str> = case
        .graph()
        .iter()
        .flat_map(|node| node.evidence_ids.iter().map(String::as_str))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn evidence_types(config: &Config) -> BTreeMap<&str, &str> {
    config
        .fragments
        .iter()
        .flat_map(|entry| &entry.evidence)
        .map(|e| (e.id.as_str(), e.evidence_type.as_str()))
        .collect()
}
