//! Tracker error types

use thiserror::Error;

/// Errors raised by the dependency tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Unknown resource id
    #[error("Resource not found: {0}")]
    NotFound(String),
}
