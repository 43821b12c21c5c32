//! Reasoning error types

use thiserror::Error;

/// Errors raised when registering theories or defeaters
#[derive(Error, Debug)]
pub enum ReasoningError {
    /// Theory definition rejected
    #[error("Invalid theory '{id}': {reason}")]
    InvalidTheory {
        /// Theory id
        id: String,
        /// What was wrong with it
        reason: String,
    },

    /// Defeater definition rejected
    #[error("Invalid defeater '{id}': {reason}")]
    InvalidDefeater {
        /// Defeater id
        id: String,
        /// What was wrong with it
        reason: String,
    },
}
