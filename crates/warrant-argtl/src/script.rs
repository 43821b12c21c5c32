//! ArgTL script interpreter
//!
//! One command per line:
//!
//! ```text
//! compose <id>... -> <id>
//! link <id> to <id> via "<interface text>"
//! validate <id>
//! set <name> = <value>
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A failing line is
//! recorded in the report and execution moves on to the next line.
//! `set strategy = <name>` selects the composition strategy for later
//! `compose` lines.

use crate::{ArgTlEngine, ArgTlError, CompositionStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Variable that selects the composition strategy
pub const STRATEGY_VARIABLE: &str = "strategy";

/// Result of one successful command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutput {
    /// A new fragment was composed
    Composed {
        /// Id of the composed fragment
        fragment_id: String,
    },
    /// Two fragments were linked
    Linked {
        /// Human-readable summary
        message: String,
    },
    /// Validation rules ran
    Validated {
        /// Rule name to outcome
        results: BTreeMap<String, Option<bool>>,
    },
    /// A variable was set
    Assigned {
        /// Variable name
        name: String,
        /// New value
        value: String,
    },
}

/// A successfully executed line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// 1-based line number
    pub line: usize,
    /// The line as written (trimmed)
    pub command: String,
    /// What the command produced
    pub result: CommandOutput,
}

/// A line that failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// 1-based line number
    pub line: usize,
    /// The line as written (trimmed)
    pub command: String,
    /// Error message
    pub error: String,
}

/// Outcome of running a script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptReport {
    /// Lines that succeeded, in order
    pub commands: Vec<CommandRecord>,
    /// Lines that failed, in order
    pub errors: Vec<ErrorRecord>,
}

impl ScriptReport {
    /// True if no line failed
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Line-oriented interpreter driving an [`ArgTlEngine`]
#[derive(Debug)]
pub struct ArgTlScript<'a> {
    engine: &'a mut ArgTlEngine,
    variables: BTreeMap<String, String>,
}

impl<'a> ArgTlScript<'a> {
    /// Create an interpreter with no variables set
    pub fn new(engine: &'a mut ArgTlEngine) -> Self {
        Self {
            engine,
            variables: BTreeMap::new(),
        }
    }

    /// Current variable bindings
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Run every line of `script`
    pub fn execute(&mut self, script: &str) -> ScriptReport {
        let mut report = ScriptReport::default();

        for (index, raw) in script.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match self.execute_line(line) {
                Ok(result) => report.commands.push(CommandRecord {
                    line: index + 1,
                    command: line.to_string(),
                    result,
                }),
                Err(e) => {
                    warn!(line = index + 1, command = line, error = %e, "ArgTL command failed");
                    report.errors.push(ErrorRecord {
                        line: index + 1,
                        command: line.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    fn execute_line(&mut self, line: &str) -> Result<CommandOutput, ArgTlError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts[0] {
            "compose" => {
                let n = parts.len();
                if n < 4 || parts[n - 2] != "->" {
                    return Err(ArgTlError::Parse(
                        "expected: compose <id>... -> <id>".to_string(),
                    ));
                }
                let strategy = match self.variables.get(STRATEGY_VARIABLE) {
                    Some(name) => name.parse::<CompositionStrategy>()?,
                    None => CompositionStrategy::default(),
                };
                let composed = self.engine.compose(&parts[1..n - 2], parts[n - 1], strategy)?;
                Ok(CommandOutput::Composed {
                    fragment_id: composed.id.clone(),
                })
            }
            "link" => {
                if parts.len() < 6 || parts[2] != "to" || parts[4] != "via" {
                    return Err(ArgTlError::Parse(
                        "expected: link <id> to <id> via \"<text>\"".to_string(),
                    ));
                }
                let (source, target) = (parts[1], parts[3]);
                let interface = parts[5..].join(" ");
                self.engine
                    .link_fragments(source, target, interface.trim_matches('"'))?;
                Ok(CommandOutput::Linked {
                    message: format!("Linked {} to {}", source, target),
                })
            }
            "validate" => {
                if parts.len() != 2 {
                    return Err(ArgTlError::Parse("expected: validate <id>".to_string()));
                }
                let results = self.engine.validate_fragment(parts[1], None)?;
                Ok(CommandOutput::Validated { results })
            }
            "set" => {
                if parts.len() < 3 || parts[2] != "=" {
                    return Err(ArgTlError::Parse(
                        "expected: set <name> = <value>".to_string(),
                    ));
                }
                let name = parts[1].to_string();
                let value = parts[3..].join(" ");
                self.variables.insert(name.clone(), value.clone());
                Ok(CommandOutput::Assigned { name, value })
            }
            other => Err(ArgTlError::Parse(format!("Unknown command: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warrant_fragments::FragmentLibrary;

    fn engine() -> ArgTlEngine {
        let mut library = FragmentLibrary::new();
        library
            .create_from_pattern_with_id("component_quality", "web", "f1")
            .unwrap();
        library
            .create_from_pattern_with_id("component_security", "web", "f2")
            .unwrap();
        ArgTlEngine::new(library)
    }

    #[test]
    fn test_compose_then_validate() {
        let mut engine = engine();
        let report = ArgTlScript::new(&mut engine).execute("compose f1 f2 -> f3\nvalidate f3");

        assert_eq!(report.commands.len(), 2);
        assert!(report.errors.is_empty());
        assert_eq!(
            report.commands[0].result,
            CommandOutput::Composed {
                fragment_id: "f3".into()
            }
        );
        assert_eq!(report.commands[1].line, 2);
        assert!(engine.library().contains("f3"));
    }

    #[test]
    fn test_errors_are_collected_and_execution_continues() {
        let mut engine = engine();
        let script = r#"
# comment
Compose f1 f2 -> f9
compose f1 ghost -> f4
link f1 to f2 via "shared session store"
link f1 f2
validate f1
"#;
        let report = ArgTlScript::new(&mut engine).execute(script);

        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.errors[0].line, 3);
        assert!(report.errors[0].error.contains("Unknown command: Compose"));
        assert_eq!(report.errors[1].line, 4);
        assert_eq!(report.errors[2].line, 6);

        assert_eq!(report.commands.len(), 2);
        let f1 = engine.library().get_fragment("f1").unwrap();
        assert_eq!(f1.interface_points["f2"], "shared session store");
    }

    #[test]
    fn test_strategy_variable() {
        let mut engine = engine();
        let mut script = ArgTlScript::new(&mut engine);
        let report = script.execute("set strategy = sequential\ncompose f1 f2 -> chain");
        assert!(report.is_success());
        assert_eq!(script.variables()["strategy"], "sequential");

        let report = script.execute("set strategy = diagonal\ncompose f1 f2 -> nope");
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].error.contains("diagonal"));

        let chain = engine.library().get_fragment("chain").unwrap();
        assert_eq!(chain.root_goal_id(), Some("f1_node_1"));
    }

    #[test]
    fn test_malformed_lines() {
        let mut engine = engine();
        let report = ArgTlScript::new(&mut engine).execute("compose f1 f2 f3\nset x 1\nvalidate");
        assert_eq!(report.errors.len(), 3);
        assert!(report
            .errors
            .iter()
            .all(|e| e.error.starts_with("Parse error")));
    }
}
