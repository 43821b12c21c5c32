//! Domain error types

use thiserror::Error;

/// Errors raised by direct operations on cases, fragments and graphs
#[derive(Error, Debug)]
pub enum DomainError {
    /// A referenced node, case or fragment id does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Shorthand for a missing node
    pub fn node_not_found(id: &str) -> Self {
        Self::NotFound(format!("node '{}'", id))
    }
}
