//! CLI command definitions and argument parsing.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use warrant_domain::ContradictionStrategy;

/// Warrant CLI - Build, query and reason about assurance cases.
#[derive(Debug, Parser)]
#[command(name = "warrant")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "WARRANT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Human-readable text and tables (default)
    Text,
    /// JSON format
    Json,
}

/// Contradiction heuristic options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StrategyArg {
    /// Negated and affirmed statements sharing words
    Negation,
    /// Positive word against its antonym
    Antonym,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run an ArgTL script against the configured fragments
    Compose(ComposeArgs),

    /// Run an ACQL script against cases and configured fragments
    Query(QueryArgs),

    /// Score a case against theories and defeaters
    Reason(ReasonArgs),

    /// Check a case or a configured fragment
    Validate(ValidateArgs),

    /// Assemble configured fragments into an assurance case
    Assemble(AssembleArgs),

    /// Show which fragments a change to one fragment reaches
    Impact(ImpactArgs),

    /// Compare configured components with design requirements
    Design(DesignArgs),

    /// List patterns, theories and defeaters
    Library,
}

/// Arguments for the compose command.
#[derive(Debug, Parser)]
pub struct ComposeArgs {
    /// ArgTL script file
    pub script: PathBuf,

    /// Directory to write composed fragments to (one JSON file each)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the query command.
#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// ACQL script file
    pub script: PathBuf,

    /// Case JSON file; referenced in the script by its case id
    #[arg(long = "case")]
    pub cases: Vec<PathBuf>,
}

/// Arguments for the reason command.
#[derive(Debug, Parser)]
pub struct ReasonArgs {
    /// Case JSON file
    #[arg(long)]
    pub case: PathBuf,

    /// Evidence context JSON file (an object of facts)
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Report risk instead of confidence
    #[arg(long)]
    pub risk: bool,

    /// Report goal consistency with the given heuristic instead
    #[arg(long, value_enum, conflicts_with = "risk")]
    pub consistency: Option<StrategyArg>,
}

/// Arguments for the validate command.
#[derive(Debug, Parser)]
#[command(group(ArgGroup::new("target").required(true).args(["case", "fragment"])))]
pub struct ValidateArgs {
    /// Case JSON file
    #[arg(long)]
    pub case: Option<PathBuf>,

    /// Configured fragment id
    #[arg(long)]
    pub fragment: Option<String>,

    /// Validation rule to run (repeatable; default: all)
    #[arg(long = "rule", requires = "fragment")]
    pub rules: Vec<String>,
}

/// Arguments for the assemble command.
#[derive(Debug, Parser)]
pub struct AssembleArgs {
    /// Fragment id to include (repeatable, in order)
    #[arg(long = "fragment", required = true)]
    pub fragments: Vec<String>,

    /// Id of the assembled case
    #[arg(long)]
    pub case_id: String,

    /// Title of the assembled case
    #[arg(long)]
    pub title: String,

    /// ArgTL script to run before assembling
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Write the case JSON to this file
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Persist the case into the evidence graph stored in this directory
    #[arg(long)]
    pub graph: Option<PathBuf>,
}

/// Arguments for the impact command.
#[derive(Debug, Parser)]
pub struct ImpactArgs {
    /// Configured fragment or evidence id
    pub fragment: String,

    /// Also print the dependency chain up to this depth
    #[arg(long)]
    pub depth: Option<usize>,
}

/// Arguments for the design command.
#[derive(Debug, Parser)]
pub struct DesignArgs {
    /// Coverage JSON file (an object of file path to percentage)
    #[arg(long)]
    pub coverage: Option<PathBuf>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Text => crate::config::OutputFormat::Text,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<StrategyArg> for ContradictionStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Negation => ContradictionStrategy::NegationOverlap,
            StrategyArg::Antonym => ContradictionStrategy::AntonymPairs,
        }
    }
}
