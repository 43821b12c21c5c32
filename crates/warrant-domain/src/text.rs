//! Keyword heuristics over claim statements
//!
//! Contradiction and defeater detection deliberately avoid any language
//! understanding. Statements are lowercased and split into tokens on every
//! non-alphanumeric character (so `code_adequately_tested` and
//! "code adequately tested" tokenize the same way) and the heuristics below
//! match whole tokens. The results are fully reproducible.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Words that mark a statement as negated
pub const NEGATION_WORDS: [&str; 3] = ["no", "not", "never"];

/// Words that mark a statement as affirmed
pub const AFFIRMATION_WORDS: [&str; 3] = ["has", "is", "always"];

/// Words that make a claim absolute (and therefore easy to defeat)
pub const ABSOLUTE_WORDS: [&str; 5] = ["always", "never", "all", "none", "completely"];

/// Positive/negative antonym pairs
pub const ANTONYM_PAIRS: [(&str, &str); 5] = [
    ("secure", "insecure"),
    ("safe", "unsafe"),
    ("reliable", "unreliable"),
    ("correct", "incorrect"),
    ("complete", "incomplete"),
];

/// Lowercased alphanumeric tokens, in order
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Distinct tokens of a statement
pub fn token_set(text: &str) -> BTreeSet<String> {
    tokens(text).into_iter().collect()
}

/// True if any of `words` appears as a whole token
pub fn contains_any_word(text: &str, words: &[&str]) -> bool {
    let set = token_set(text);
    words.iter().any(|w| set.contains(*w))
}

/// Number of distinct tokens two statements share
pub fn common_token_count(a: &str, b: &str) -> usize {
    token_set(a).intersection(&token_set(b)).count()
}

/// True if the statement makes an absolute claim
pub fn is_absolute_claim(text: &str) -> bool {
    contains_any_word(text, &ABSOLUTE_WORDS)
}

/// True if the statement talks about security or safety
///
/// Substring match, so "security" and "safety" count as well.
pub fn is_security_claim(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("secure") || lower.contains("safe")
}

/// Named contradiction heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContradictionStrategy {
    /// One statement negated, the other affirmed, sharing at least two tokens
    #[default]
    #[serde(rename = "negation", alias = "negation_overlap")]
    NegationOverlap,

    /// One statement uses a positive word, the other its antonym
    #[serde(rename = "antonym", alias = "antonym_pairs")]
    AntonymPairs,
}

impl ContradictionStrategy {
    /// Check whether two statements contradict under this strategy
    pub fn contradicts(&self, a: &str, b: &str) -> bool {
        match self {
            ContradictionStrategy::NegationOverlap => negation_overlap(a, b),
            ContradictionStrategy::AntonymPairs => antonym_pairs(a, b),
        }
    }

    /// Name used in configuration and query parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            ContradictionStrategy::NegationOverlap => "negation",
            ContradictionStrategy::AntonymPairs => "antonym",
        }
    }
}

impl fmt::Display for ContradictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContradictionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "negation" | "negation_overlap" => Ok(ContradictionStrategy::NegationOverlap),
            "antonym" | "antonym_pairs" => Ok(ContradictionStrategy::AntonymPairs),
            other => Err(format!("Unknown contradiction strategy: {}", other)),
        }
    }
}

fn negation_overlap(a: &str, b: &str) -> bool {
    let ta = token_set(a);
    let tb = token_set(b);
    let has = |set: &BTreeSet<String>, words: &[&str]| words.iter().any(|w| set.contains(*w));

    let opposed = (has(&ta, &NEGATION_WORDS) && has(&tb, &AFFIRMATION_WORDS))
        || (has(&tb, &NEGATION_WORDS) && has(&ta, &AFFIRMATION_WORDS));

    opposed && ta.intersection(&tb).count() >= 2
}

fn antonym_pairs(a: &str, b: &str) -> bool {
    let ta = token_set(a);
    let tb = token_set(b);
    ANTONYM_PAIRS.iter().any(|(pos, neg)| {
        (ta.contains(*pos) && tb.contains(*neg)) || (ta.contains(*neg) && tb.contains(*pos))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_split_on_underscores() {
        assert_eq!(
            tokens("Code_Adequately tested!"),
            vec!["code", "adequately", "tested"]
        );
    }

    #[test]
    fn test_negation_overlap() {
        let s = ContradictionStrategy::NegationOverlap;
        assert!(s.contradicts("System has no vulnerabilities", "System has vulnerabilities"));
        assert!(!s.contradicts("System is fast", "Database is never down"));
        // "is" inside "this" must not count
        assert!(!s.contradicts("this system works", "not this system"));
    }

    #[test]
    fn test_antonym_pairs_match_whole_words() {
        let s = ContradictionStrategy::AntonymPairs;
        assert!(s.contradicts("The API is secure", "The API is insecure"));
        assert!(s.contradicts("unsafe defaults", "safe defaults"));
        assert!(!s.contradicts("The API is insecure", "The cache is insecure"));
    }

    #[test]
    fn test_claim_keywords() {
        assert!(is_absolute_claim("All inputs are validated"));
        assert!(!is_absolute_claim("Inputs are usually validated"));
        assert!(is_security_claim("Network security is adequate"));
        assert!(is_security_claim("Failsafe mode works"));
        assert!(!is_security_claim("Tests pass"));
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(
            "antonym".parse::<ContradictionStrategy>().unwrap(),
            ContradictionStrategy::AntonymPairs
        );
        assert_eq!(ContradictionStrategy::default().as_str(), "negation");
        assert!("sarcasm".parse::<ContradictionStrategy>().is_err());
        assert_eq!(
            serde_json::to_value(ContradictionStrategy::AntonymPairs).unwrap(),
            "antonym"
        );
    }
}
