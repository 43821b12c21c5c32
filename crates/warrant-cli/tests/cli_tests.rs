//! End-to-end tests driving the command functions with files on disk.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use warrant_cli::cli::{
    AssembleArgs, ComposeArgs, DesignArgs, ImpactArgs, QueryArgs, ReasonArgs, StrategyArg, ValidateArgs,
};
use warrant_cli::commands;
use warrant_cli::config::OutputFormat;
use warrant_cli::{CliError, Config, Formatter};
use warrant_store::{EvidenceGraph, EVIDENCE_LABEL};

const CONFIG: &str = r#"
[[patterns]]
key = "api_availability"
name = "API Availability"
fragment_type = "performance"
required_evidence = ["load_test"]
structure = [
    { node_type = "goal", statement = "API stays available under load" },
    { node_type = "strategy", statement = "Argue over load test results" },
    { node_type = "solution", statement = "Load test report" },
]

[[fragments]]
id = "web_quality"
pattern = "component_quality"
component = "web"
evidence = [{ id = "ev-lint", type = "static_analysis" }]

[[fragments]]
id = "web_security"
pattern = "component_security"
component = "web"
evidence = [{ id = "ev-scan", type = "security_scan" }]

[[fragments]]
id = "api_load"
pattern = "api_availability"
component = "api"
depends_on = ["web_security"]

[[components]]
name = "web.auth"
file_path = "src/web/auth.rs"
interfaces = [{ kind = "function", name = "login" }]

[[components]]
name = "web.admin_console"
file_path = "src/web/admin_console.rs"
interfaces = [{ kind = "function", name = "shell" }]

[[requirements]]
id = "REQ-AUTH"
description = "Users authenticate before access"
component = "auth"
type = "functional"

[[requirements]]
id = "REQ-TLS"
description = "Traffic is encrypted"
component = "tls"
type = "security"
"#;

fn config() -> Config {
    Config::from_toml_str(CONFIG).unwrap()
}

fn json() -> Formatter {
    Formatter::new(OutputFormat::Json, false)
}

fn text() -> Formatter {
    Formatter::new(OutputFormat::Text, false)
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn assemble_args(out: Option<PathBuf>, graph: Option<PathBuf>) -> AssembleArgs {
    AssembleArgs {
        fragments: vec!["web_quality".into(), "web_security".into()],
        case_id: "web".into(),
        title: "Web application".into(),
        script: None,
        out,
        graph,
    }
}

/// Assemble the two web fragments and return the case file path.
fn assembled_case(dir: &Path) -> PathBuf {
    let path = dir.join("web.json");
    commands::execute_assemble(assemble_args(Some(path.clone()), None), &config(), &text()).unwrap();
    path
}

#[test]
fn test_compose_writes_composed_fragments() {
    let dir = TempDir::new().unwrap();
    let script = write(
        dir.path(),
        "build.argtl",
        "set strategy = sequential\ncompose web_quality web_security -> web_all\nvalidate web_all\n",
    );
    let out = dir.path().join("out");

    let output = commands::execute_compose(
        ComposeArgs {
            script,
            out: Some(out.clone()),
        },
        &config(),
        &text(),
    )
    .unwrap();

    assert!(output.contains("composed web_all"));
    assert!(output.contains("3 command(s) succeeded, 0 failed"));
    let written = fs::read_to_string(out.join("web_all.json")).unwrap();
    let fragment: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(fragment["id"], "web_all");
}

#[test]
fn test_compose_reports_failed_lines() {
    let dir = TempDir::new().unwrap();
    let script = write(dir.path(), "bad.argtl", "compose web_quality ghost -> x\nvalidate api_load\n");

    let output = commands::execute_compose(ComposeArgs { script, out: None }, &config(), &json()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(report["errors"][0]["line"], 1);
    assert_eq!(report["commands"][0]["result"]["kind"], "validated");
    assert_eq!(report["commands"][0]["result"]["results"]["dependencies"], true);
}

#[test]
fn test_assemble_then_query() {
    let dir = TempDir::new().unwrap();
    let case_path = assembled_case(dir.path());
    let script = write(
        dir.path(),
        "checks.acql",
        "coverage on web with threshold=0.5\ndependencies on api_load\nbogus line\ncompleteness on nowhere\n",
    );

    let output = commands::execute_query(
        QueryArgs {
            script,
            cases: vec![case_path],
        },
        &config(),
        &json(),
    )
    .unwrap();
    let results: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["target"], "web");
    assert_eq!(results[0]["result"]["coverage"]["threshold"], 0.5);
    assert_eq!(results[1]["target"], "api_load");
    assert_eq!(results[1]["result"]["dependencies"]["dependencies"][0], "web_security");
}

#[test]
fn test_query_text_table() {
    let dir = TempDir::new().unwrap();
    let case_path = assembled_case(dir.path());
    let script = write(dir.path(), "checks.acql", "soundness on web\n");

    let output = commands::execute_query(
        QueryArgs {
            script,
            cases: vec![case_path],
        },
        &config(),
        &text(),
    )
    .unwrap();

    assert!(output.contains("soundness"));
    assert!(output.contains("web"));
}

#[test]
fn test_reason_risk_and_consistency() {
    let dir = TempDir::new().unwrap();
    let case_path = assembled_case(dir.path());
    let context = write(dir.path(), "context.json", r#"{ "test_coverage": 85 }"#);

    let output = commands::execute_reason(
        ReasonArgs {
            case: case_path.clone(),
            context: Some(context),
            risk: true,
            consistency: None,
        },
        &config(),
        &json(),
    )
    .unwrap();
    let risk: serde_json::Value = serde_json::from_str(&output).unwrap();
    let score = risk["risk_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));

    let output = commands::execute_reason(
        ReasonArgs {
            case: case_path,
            context: None,
            risk: false,
            consistency: Some(StrategyArg::Negation),
        },
        &config(),
        &json(),
    )
    .unwrap();
    let analysis: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert!(analysis["issues"].is_array());
}

#[test]
fn test_reason_rejects_non_object_context() {
    let dir = TempDir::new().unwrap();
    let case_path = assembled_case(dir.path());
    let context = write(dir.path(), "context.json", "[1, 2, 3]");

    let result = commands::execute_reason(
        ReasonArgs {
            case: case_path,
            context: Some(context),
            risk: false,
            consistency: None,
        },
        &config(),
        &text(),
    );
    assert!(matches!(result, Err(CliError::InvalidInput(_))));
}

#[test]
fn test_validate_fragment_rules() {
    let output = commands::execute_validate(
        ValidateArgs {
            case: None,
            fragment: Some("web_security".into()),
            rules: vec!["structure".into(), "completeness".into(), "bogus".into()],
        },
        &config(),
        &json(),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["results"]["structure"], true);
    assert_eq!(value["results"]["completeness"], false);
    assert!(value["results"]["bogus"].is_null());
}

#[test]
fn test_validate_case_file() {
    let dir = TempDir::new().unwrap();
    let case_path = assembled_case(dir.path());

    let output = commands::execute_validate(
        ValidateArgs {
            case: Some(case_path),
            fragment: None,
            rules: Vec::new(),
        },
        &config(),
        &json(),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["orphan_nodes"], 0);
}

#[test]
fn test_assemble_persists_into_graph() {
    let dir = TempDir::new().unwrap();
    let graph_dir = dir.path().join("graph");

    let output =
        commands::execute_assemble(assemble_args(None, Some(graph_dir.clone())), &config(), &text()).unwrap();
    assert!(output.contains("Stored case in"));

    let graph = EvidenceGraph::open(&graph_dir).unwrap();
    let evidence: Vec<&str> = graph
        .find_nodes(Some(EVIDENCE_LABEL))
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(evidence, vec!["ev-lint", "ev-scan"]);
    assert!(graph.node("web").is_some());
    assert!(!graph.relationships(None, Some("ev-scan"), Some("EVIDENCED_BY")).is_empty());
}

#[test]
fn test_assemble_unknown_fragment() {
    let mut args = assemble_args(None, None);
    args.fragments.push("ghost".into());

    let result = commands::execute_assemble(args, &config(), &text());
    assert!(matches!(result, Err(CliError::ArgTl(_))));
}

#[test]
fn test_impact_follows_dependents() {
    let output = commands::execute_impact(
        ImpactArgs {
            fragment: "ev-scan".into(),
            depth: Some(3),
        },
        &config(),
        &json(),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["impact"]["impacted_count"], 2);
    assert_eq!(value["impact"]["impacted_resources"][0]["resource"]["id"], "web_security");
    assert_eq!(value["impact"]["impacted_resources"][1]["resource"]["id"], "api_load");
    assert_eq!(value["impact"]["impacted_resources"][1]["depth"], 2);
    assert_eq!(value["chain"]["dependencies"][0]["children"][0]["resource"]["id"], "api_load");
}

#[test]
fn test_impact_unknown_resource() {
    let result = commands::execute_impact(
        ImpactArgs {
            fragment: "ghost".into(),
            depth: None,
        },
        &config(),
        &text(),
    );
    assert!(matches!(result, Err(CliError::Tracker(_))));
}

#[test]
fn test_library_lists_configured_pattern() {
    let output = commands::execute_library(&config(), &json()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert!(value["patterns"]["api_availability"].is_object());
    assert!(value["patterns"]["component_quality"].is_object());
    assert!(value["theories"].as_array().unwrap().len() >= 3);
}

#[test]
fn test_design_maps_requirements_and_coverage() {
    let dir = TempDir::new().unwrap();
    let coverage = write(
        dir.path(),
        "coverage.json",
        r#"{"web/auth.rs": 92.0, "web/admin_console.rs": 35.5}"#,
    );

    let output = commands::execute_design(
        DesignArgs {
            coverage: Some(coverage),
        },
        &config(),
        &json(),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["mapping"]["requirements_satisfied"], 1);
    assert_eq!(value["mapping"]["critical_issues"], 1);
    assert_eq!(value["mapping"]["discrepancies"][0]["type"], "missing");
    assert_eq!(value["mapping"]["discrepancies"][1]["type"], "extra");
    assert_eq!(value["mapping"]["discrepancies"][1]["component"], "web.admin_console");
    assert_eq!(
        value["matrix"]["traceability_matrix"][0]["implementing_components"][0]["coverage"],
        92.0
    );
    assert_eq!(value["coverage"]["low_coverage_components"][0]["name"], "web.admin_console");
}

#[test]
fn test_design_text_without_coverage() {
    let output = commands::execute_design(DesignArgs { coverage: None }, &config(), &text()).unwrap();

    assert!(output.contains("1/2 requirements satisfied, 2 discrepancy(ies)"));
    assert!(output.contains("REQ-TLS"));
    assert!(output.contains("Requirement not met: Traffic is encrypted"));
    assert!(!output.contains("Average coverage"));
}
