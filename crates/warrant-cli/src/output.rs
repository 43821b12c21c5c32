//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use warrant_acql::{DependencyReport, QueryResult, ScriptResult};
use warrant_argtl::{CommandOutput, ScriptReport};
use warrant_domain::CaseValidation;
use warrant_fragments::FragmentPattern;
use warrant_reasoning::{ConsistencyAnalysis, Defeater, ReasoningReport, RiskLevel, RiskReport, Theory};
use warrant_tracker::{
    ChainLink, CoverageMapping, DependencyChain, DesignMapping, ImpactReport, TraceabilityMatrix,
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Pretty JSON for any serializable value.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// Format an ArgTL script report.
    pub fn format_script_report(&self, report: &ScriptReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(report);
        }

        let mut lines = Vec::new();
        for record in &report.commands {
            let detail = match &record.result {
                CommandOutput::Composed { fragment_id } => format!("composed {}", fragment_id),
                CommandOutput::Linked { message } => message.clone(),
                CommandOutput::Validated { results } => format_rule_results(results),
                CommandOutput::Assigned { name, value } => format!("{} = {}", name, value),
            };
            lines.push(self.success(&format!("line {}: {}", record.line, detail)));
        }
        for error in &report.errors {
            lines.push(self.error(&format!("line {}: {} ({})", error.line, error.error, error.command)));
        }
        lines.push(self.summary(report.errors.is_empty(), &format!(
            "{} command(s) succeeded, {} failed",
            report.commands.len(),
            report.errors.len()
        )));
        Ok(lines.join("\n"))
    }

    /// Format ACQL script results.
    pub fn format_query_results(&self, results: &[ScriptResult]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(results);
        }
        if results.is_empty() {
            return Ok(self.warning("No queries were executed."));
        }

        let mut builder = Builder::default();
        builder.push_record(["Line", "Target", "Query", "Result", "Details"]);
        for result in results {
            let verdict = if result.result.passed() { "PASS" } else { "FAIL" };
            builder.push_record([
                result.line.to_string(),
                result.target.clone(),
                result.result.query_type().to_string(),
                verdict.to_string(),
                summarize_query(&result.result),
            ]);
        }
        Ok(self.table(builder))
    }

    /// Format a reasoning report.
    pub fn format_reasoning(&self, report: &ReasoningReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(report);
        }

        let mut lines = vec![format!(
            "Confidence: {:.2} (base {:.2})",
            report.confidence_score, report.base_confidence
        )];
        let theories: Vec<&str> = report.applicable_theories.iter().map(|t| t.id.as_str()).collect();
        lines.push(format!("Applicable theories: {}", list_or_none(&theories)));
        let defeaters: Vec<&str> = report.active_defeaters.iter().map(|d| d.id.as_str()).collect();
        lines.push(format!("Active defeaters: {}", list_or_none(&defeaters)));
        lines.push(self.summary(report.indefeasible, if report.indefeasible {
            "Indefeasible"
        } else {
            "Defeasible"
        }));
        lines.extend(report.recommendations.iter().map(|r| self.info(r)));
        Ok(lines.join("\n"))
    }

    /// Format a risk report.
    pub fn format_risk(&self, report: &RiskReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(report);
        }

        let level = match report.risk_level {
            RiskLevel::Low => self.colorize("LOW", "green"),
            RiskLevel::Medium => self.colorize("MEDIUM", "yellow"),
            RiskLevel::High => self.colorize("HIGH", "red"),
        };
        let mut lines = vec![
            format!("Risk: {:.2} ({})", report.risk_score, level),
            format!(
                "Confidence: {:.2} (base {:.2})",
                report.confidence_score, report.base_confidence
            ),
            format!(
                "Critical defeaters: {}, high defeaters: {}",
                report.critical_issues, report.high_issues
            ),
        ];
        lines.extend(report.recommendations.iter().map(|r| self.info(r)));
        Ok(lines.join("\n"))
    }

    /// Format a goal consistency analysis.
    pub fn format_consistency(&self, analysis: &ConsistencyAnalysis) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(analysis);
        }

        let mut lines = vec![self.summary(
            analysis.consistent,
            &format!(
                "{} contradiction(s) found ({} heuristic)",
                analysis.issues.len(),
                analysis.strategy
            ),
        )];
        for issue in &analysis.issues {
            lines.push(self.warning(&format!("{} / {}: {}", issue.goal1, issue.goal2, issue.description)));
        }
        if analysis.goals_skipped > 0 {
            lines.push(self.warning(&format!(
                "{} goal(s) not compared (pairwise limit)",
                analysis.goals_skipped
            )));
        }
        Ok(lines.join("\n"))
    }

    /// Format a case validation result.
    pub fn format_case_validation(&self, validation: &CaseValidation) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(validation);
        }

        let mut lines = vec![self.summary(
            validation.valid,
            &format!(
                "{} nodes, {} connected, {} orphaned",
                validation.node_count, validation.connected_nodes, validation.orphan_nodes
            ),
        )];
        lines.extend(validation.errors.iter().map(|e| self.error(e)));
        lines.extend(validation.warnings.iter().map(|w| self.warning(w)));
        Ok(lines.join("\n"))
    }

    /// Format fragment validation rule outcomes.
    pub fn format_rule_results(&self, fragment_id: &str, results: &BTreeMap<String, Option<bool>>) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(&serde_json::json!({ "fragment": fragment_id, "results": results }));
        }

        let mut lines = Vec::new();
        for (rule, outcome) in results {
            lines.push(match outcome {
                Some(true) => self.success(&format!("{}: {}", fragment_id, rule)),
                Some(false) => self.error(&format!("{}: {}", fragment_id, rule)),
                None => self.warning(&format!("{}: {} (unknown rule)", fragment_id, rule)),
            });
        }
        Ok(lines.join("\n"))
    }

    /// Format the pattern, theory and defeater registries.
    pub fn format_library(
        &self,
        patterns: &[(&str, &FragmentPattern)],
        theories: &[Theory],
        defeaters: &[Defeater],
    ) -> Result<String> {
        if self.format == OutputFormat::Json {
            let patterns: BTreeMap<&str, &FragmentPattern> = patterns.iter().copied().collect();
            return self.json(&serde_json::json!({
                "patterns": patterns,
                "theories": theories,
                "defeaters": defeaters,
            }));
        }

        let mut pattern_table = Builder::default();
        pattern_table.push_record(["Pattern", "Name", "Type", "Nodes", "Required evidence"]);
        for (key, pattern) in patterns {
            pattern_table.push_record([
                key.to_string(),
                pattern.name.clone(),
                pattern.fragment_type.to_string(),
                pattern.structure.len().to_string(),
                pattern.required_evidence.join(", "),
            ]);
        }

        let mut theory_table = Builder::default();
        theory_table.push_record(["Theory", "Type", "Confidence", "Conclusion", "Premises"]);
        for theory in theories {
            theory_table.push_record([
                theory.id.clone(),
                theory.theory_type.to_string(),
                format!("{:.2}", theory.confidence),
                theory.conclusion.clone(),
                theory.premises.join("; "),
            ]);
        }

        let mut defeater_table = Builder::default();
        defeater_table.push_record(["Defeater", "Type", "Severity", "Target", "Conditions"]);
        for defeater in defeaters {
            defeater_table.push_record([
                defeater.id.clone(),
                defeater.defeater_type.to_string(),
                defeater.severity.to_string(),
                defeater.target_claim.clone(),
                defeater.conditions.join("; "),
            ]);
        }

        Ok([
            self.table(pattern_table),
            self.table(theory_table),
            self.table(defeater_table),
        ]
        .join("\n\n"))
    }

    /// Format an impact analysis with an optional dependency chain.
    pub fn format_impact(&self, report: &ImpactReport, chain: Option<&DependencyChain>) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(&serde_json::json!({ "impact": report, "chain": chain }));
        }

        let mut out = vec![self.info(&format!(
            "A change to {} reaches {} resource(s)",
            report.resource.name, report.impacted_count
        ))];
        if !report.impacted_resources.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Resource", "Type", "Via", "Depth"]);
            for impacted in &report.impacted_resources {
                builder.push_record([
                    impacted.resource.name.clone(),
                    impacted.resource.resource_type.to_string(),
                    impacted.dependency_type.to_string(),
                    impacted.depth.to_string(),
                ]);
            }
            out.push(self.table(builder));
        }
        if let Some(chain) = chain {
            let mut lines = vec![chain.resource_id.clone()];
            render_chain(&chain.dependencies, 1, &mut lines);
            out.push(lines.join("\n"));
        }
        Ok(out.join("\n"))
    }

    /// Format a design mapping with its traceability matrix.
    pub fn format_design(
        &self,
        mapping: &DesignMapping,
        matrix: &TraceabilityMatrix,
        coverage: Option<&CoverageMapping>,
    ) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(&serde_json::json!({
                "mapping": mapping,
                "matrix": matrix,
                "coverage": coverage,
            }));
        }

        let mut out = vec![self.summary(
            mapping.discrepancy_count == 0,
            &format!(
                "{}/{} requirements satisfied, {} discrepancy(ies)",
                mapping.requirements_satisfied, mapping.requirements_total, mapping.discrepancy_count
            ),
        )];

        if !mapping.discrepancies.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Type", "Severity", "Component", "Description"]);
            for discrepancy in &mapping.discrepancies {
                builder.push_record([
                    discrepancy.kind.to_string(),
                    discrepancy.severity.to_string(),
                    discrepancy.component.clone(),
                    discrepancy.description.clone(),
                ]);
            }
            out.push(self.table(builder));
        }

        if !matrix.rows.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Requirement", "Satisfied", "Components", "Evidence"]);
            for row in &matrix.rows {
                let components: Vec<&str> = row
                    .implementing_components
                    .iter()
                    .map(|c| c.component_name.as_str())
                    .collect();
                let evidence: Vec<&str> = row.evidence.iter().map(String::as_str).collect();
                builder.push_record([
                    row.requirement_id.clone(),
                    if row.satisfied { "yes" } else { "no" }.to_string(),
                    list_or_none(&components),
                    list_or_none(&evidence),
                ]);
            }
            out.push(self.table(builder));
        }

        if let Some(coverage) = coverage {
            out.push(self.info(&format!(
                "Average coverage {:.1}% over {}/{} components",
                coverage.average_coverage, coverage.components_with_coverage, coverage.components_total
            )));
            for component in &coverage.low_coverage_components {
                out.push(self.warning(&format!(
                    "Low coverage: {} ({:.1}%)",
                    component.name,
                    component.coverage.unwrap_or_default()
                )));
            }
        }

        Ok(out.join("\n"))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn summary(&self, ok: bool, message: &str) -> String {
        if ok {
            self.success(message)
        } else {
            self.error(message)
        }
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn list_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn format_rule_results(results: &BTreeMap<String, Option<bool>>) -> String {
    let parts: Vec<String> = results
        .iter()
        .map(|(rule, outcome)| {
            let verdict = match outcome {
                Some(true) => "pass",
                Some(false) => "fail",
                None => "unknown",
            };
            format!("{}={}", rule, verdict)
        })
        .collect();
    format!("validated {}", parts.join(", "))
}

fn render_chain(links: &[ChainLink], depth: usize, lines: &mut Vec<String>) {
    for link in links {
        lines.push(format!(
            "{}└─ {} ({})",
            "   ".repeat(depth - 1),
            link.resource.name,
            link.dependency_type
        ));
        render_chain(&link.children, depth + 1, lines);
    }
}

/// One-line digest of a query result.
pub fn summarize_query(result: &QueryResult) -> String {
    match result {
        QueryResult::Consistency(r) => format!("{} contradiction(s)", r.contradictions.len()),
        QueryResult::Completeness(r) => {
            if r.missing_elements.is_empty() {
                "nothing missing".to_string()
            } else {
                r.missing_elements.join("; ")
            }
        }
        QueryResult::Soundness(r) => format!("{} issue(s)", r.issues.len()),
        QueryResult::Coverage(r) => format!(
            "{}/{} leaves evidenced ({:.0}%, threshold {:.0}%)",
            r.supported_leaves,
            r.total_leaves,
            r.coverage_ratio * 100.0,
            r.threshold * 100.0
        ),
        QueryResult::Traceability(r) => match &r.reason {
            Some(reason) => reason.clone(),
            None => format!("{} path(s), mean length {:.1}", r.paths_count, r.average_path_length),
        },
        QueryResult::Weaknesses(r) => format!("{} weakness(es)", r.weakness_count),
        QueryResult::Dependencies(DependencyReport::Fragment { dependency_count, provides_to, .. }) => {
            format!("{} dependency(ies), {} consumer(s)", dependency_count, provides_to.len())
        }
        QueryResult::Dependencies(DependencyReport::Case { chain_count, .. }) => {
            format!("{} edge(s)", chain_count)
        }
        QueryResult::Defeaters(r) => format!("{} potential defeater(s)", r.defeater_count),
    }
}
