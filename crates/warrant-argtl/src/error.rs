//! ArgTL error types

use thiserror::Error;
use warrant_domain::DomainError;
use warrant_fragments::FragmentError;

/// Errors raised by the ArgTL engine and script interpreter
#[derive(Error, Debug)]
pub enum ArgTlError {
    /// A referenced fragment does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The transformation cannot be applied
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed script line or unknown strategy name
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error from the argument model
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Error from the fragment library
    #[error("Fragment error: {0}")]
    Fragment(#[from] FragmentError),
}
