//! ACQL query scripts
//!
//! Each line reads `TYPE on TARGET [with key=value,key=value]`. Lines that do
//! not match, name an unknown query type or an unknown target are skipped
//! without being reported.

use crate::{AcqlEngine, AcqlError, AcqlQuery, QueryResult, QueryTarget, QueryType};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Result of one executed script line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptResult {
    /// 1-based line number
    pub line: usize,
    /// The line as written (trimmed)
    pub query: String,
    /// Target name the line referred to
    pub target: String,
    /// Query outcome
    pub result: QueryResult,
}

/// A parsed script line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// Query to run
    pub query: AcqlQuery,
    /// Target name
    pub target: String,
}

/// Parse one `TYPE on TARGET [with k=v,...]` line
pub fn parse_line(line: &str) -> Result<ParsedLine, AcqlError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 || parts[1] != "on" {
        return Err(AcqlError::Parse(format!("expected 'TYPE on TARGET': {}", line)));
    }
    if parts.len() > 3 && parts[3] != "with" {
        return Err(AcqlError::Parse(format!("expected 'with' after target: {}", line)));
    }

    let mut query = AcqlQuery::new(parts[0].parse::<QueryType>()?);
    if parts.len() > 4 {
        for pair in parts[4..].join(" ").split(',') {
            if let Some((key, value)) = pair.split_once('=') {
                query = query.with_param(key.trim(), value.trim());
            }
        }
    }

    Ok(ParsedLine {
        query,
        target: parts[2].to_string(),
    })
}

impl AcqlEngine {
    /// Run every line of `script` against the named targets
    pub fn execute_script(&self, script: &str, targets: &BTreeMap<String, QueryTarget<'_>>) -> Vec<ScriptResult> {
        let mut results = Vec::new();

        for (index, raw) in script.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parsed = match parse_line(line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!(line = index + 1, error = %e, "Skipping ACQL line");
                    continue;
                }
            };
            let Some(target) = targets.get(&parsed.target) else {
                debug!(line = index + 1, target = %parsed.target, "Skipping ACQL line with unknown target");
                continue;
            };

            match self.execute_query(&parsed.query, *target) {
                Ok(result) => results.push(ScriptResult {
                    line: index + 1,
                    query: line.to_string(),
                    target: parsed.target,
                    result,
                }),
                Err(e) => warn!(line = index + 1, error = %e, "ACQL query failed"),
            }
        }

        results
    }
}
