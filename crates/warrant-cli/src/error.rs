//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Argument model error
    #[error("Domain error: {0}")]
    Domain(#[from] warrant_domain::DomainError),

    /// Fragment library error
    #[error("Fragment error: {0}")]
    Fragment(#[from] warrant_fragments::FragmentError),

    /// ArgTL error
    #[error("ArgTL error: {0}")]
    ArgTl(#[from] warrant_argtl::ArgTlError),

    /// Reasoning registry error
    #[error("Reasoning error: {0}")]
    Reasoning(#[from] warrant_reasoning::ReasoningError),

    /// Graph store error
    #[error("Store error: {0}")]
    Store(#[from] warrant_store::StoreError),

    /// Dependency tracker error
    #[error("Tracker error: {0}")]
    Tracker(#[from] warrant_tracker::TrackerError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
