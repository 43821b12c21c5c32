//! Premise evaluation against an evidence context
//!
//! A premise reads `variable OP value` with OP one of `=`, `==`, `>=`, `<=`,
//! `>` or `<`. Equality compares lowercased string forms; the ordering
//! operators compare numbers and accept a trailing `%` on the expected
//! value. Anything that cannot be evaluated is false.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Evidence facts keyed by variable name
pub type EvidenceContext = BTreeMap<String, Value>;

static PREMISE_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s*(>=|<=|==|=|>|<)\s*(.+)"));

/// Comparison operator of a premise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `=` or `==`
    Equal,
    /// `>=`
    AtLeast,
    /// `<=`
    AtMost,
    /// `>`
    Greater,
    /// `<`
    Less,
}

impl Comparison {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" | "==" => Some(Comparison::Equal),
            ">=" => Some(Comparison::AtLeast),
            "<=" => Some(Comparison::AtMost),
            ">" => Some(Comparison::Greater),
            "<" => Some(Comparison::Less),
            _ => None,
        }
    }
}

/// A parsed `variable OP value` premise
#[derive(Debug, Clone, PartialEq)]
pub struct Premise {
    /// Context key
    pub variable: String,
    /// Operator
    pub comparison: Comparison,
    /// Right-hand side as written
    pub expected: String,
}

impl Premise {
    /// Parse a premise; `None` if it does not follow the grammar
    pub fn parse(text: &str) -> Option<Self> {
        let pattern = PREMISE_PATTERN.as_ref().ok()?;
        let caps = pattern.captures(text.trim())?;
        Some(Self {
            variable: caps[1].to_string(),
            comparison: Comparison::from_symbol(&caps[2])?,
            expected: caps[3].trim().to_string(),
        })
    }

    /// Evaluate against `context`
    pub fn evaluate(&self, context: &EvidenceContext) -> bool {
        let actual = match context.get(&self.variable) {
            None | Some(Value::Null) => return false,
            Some(value) => value,
        };

        if self.comparison == Comparison::Equal {
            return string_form(actual).to_lowercase() == self.expected.to_lowercase();
        }

        let (Some(actual), Ok(expected)) = (
            numeric_value(actual),
            self.expected.trim_end_matches('%').trim().parse::<f64>(),
        ) else {
            return false;
        };

        match self.comparison {
            Comparison::AtLeast => actual >= expected,
            Comparison::AtMost => actual <= expected,
            Comparison::Greater => actual > expected,
            Comparison::Less => actual < expected,
            Comparison::Equal => false,
        }
    }
}

/// Parse and evaluate in one step
pub fn evaluate_premise(premise: &str, context: &EvidenceContext) -> bool {
    Premise::parse(premise).is_some_and(|p| p.evaluate(context))
}

/// Truthiness of a context value: null, false, zero and empty are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(pairs: &[(&str, Value)]) -> EvidenceContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_parse() {
        let p = Premise::parse("test_coverage >= 80%").unwrap();
        assert_eq!(p.variable, "test_coverage");
        assert_eq!(p.comparison, Comparison::AtLeast);
        assert_eq!(p.expected, "80%");

        assert_eq!(Premise::parse("a==b").unwrap().comparison, Comparison::Equal);
        assert!(Premise::parse("just words").is_none());
        assert!(Premise::parse(">= 3").is_none());
    }

    #[test]
    fn test_numeric_comparisons() {
        let ctx = context(&[("cov", json!(85)), ("issues", json!("2")), ("ratio", json!(0.5))]);
        assert!(evaluate_premise("cov >= 80%", &ctx));
        assert!(!evaluate_premise("cov < 80", &ctx));
        assert!(evaluate_premise("issues <= 2", &ctx));
        assert!(evaluate_premise("ratio > 0.4", &ctx));
        assert!(!evaluate_premise("ratio >= abc", &ctx));
    }

    #[test]
    fn test_equality_ignores_case() {
        let ctx = context(&[("tests_pass", json!(true)), ("mode", json!("Strict")), ("n", json!(0))]);
        assert!(evaluate_premise("tests_pass = true", &ctx));
        assert!(evaluate_premise("tests_pass == TRUE", &ctx));
        assert!(evaluate_premise("mode = strict", &ctx));
        assert!(evaluate_premise("n = 0", &ctx));
        assert!(!evaluate_premise("mode = lax", &ctx));
    }

    #[test]
    fn test_missing_or_null_is_false() {
        let ctx = context(&[("gone", Value::Null)]);
        assert!(!evaluate_premise("gone = null", &ctx));
        assert!(!evaluate_premise("absent >= 0", &ctx));
        assert!(!evaluate_premise("not a premise", &ctx));
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([1])));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!({})));
        assert!(!is_truthy(&Value::Null));
    }
}
