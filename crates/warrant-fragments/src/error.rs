//! Fragment library error types

use thiserror::Error;
use warrant_domain::DomainError;

/// Errors that can occur in the fragment library
#[derive(Error, Debug)]
pub enum FragmentError {
    /// Unknown pattern or fragment
    #[error("Not found: {0}")]
    NotFound(String),

    /// A pattern definition was rejected
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Error from the argument model
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
