//! Warrant CLI - Build, query and reason about assurance cases.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use warrant_cli::commands;
use warrant_cli::{Cli, Command, Config, Formatter};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> warrant_cli::Result<String> {
    let config = Config::load(cli.config.as_deref())?;

    let format = cli.format.map(Into::into).unwrap_or(config.output.format);
    let color_enabled = !cli.no_color && config.output.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Compose(args) => commands::execute_compose(args, &config, &formatter),
        Command::Query(args) => commands::execute_query(args, &config, &formatter),
        Command::Reason(args) => commands::execute_reason(args, &config, &formatter),
        Command::Validate(args) => commands::execute_validate(args, &config, &formatter),
        Command::Assemble(args) => commands::execute_assemble(args, &config, &formatter),
        Command::Impact(args) => commands::execute_impact(args, &config, &formatter),
        Command::Design(args) => commands::execute_design(args, &config, &formatter),
        Command::Library => commands::execute_library(&config, &formatter),
    }
}
