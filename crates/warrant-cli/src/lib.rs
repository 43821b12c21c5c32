//! Warrant CLI library.
//!
//! Configuration loading, command execution and output formatting for the
//! `warrant` command-line tool. Commands return their rendered output so
//! they can be driven from tests as well as from `main`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
