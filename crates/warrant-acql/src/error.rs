//! ACQL error types

use thiserror::Error;

/// Errors raised when parsing or executing ACQL queries
#[derive(Error, Debug)]
pub enum AcqlError {
    /// Unknown query type or malformed query line
    #[error("Parse error: {0}")]
    Parse(String),

    /// A query parameter has an unusable value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// What was wrong with it
        reason: String,
    },
}
