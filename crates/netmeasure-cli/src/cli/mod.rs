//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Text);

    // Create context for commands
    let ctx = commands::Context {
        output_format,
        explain: cli.explain || config.explain_by_default,
        verbose: cli.verbose,
        config_path: cli.config.clone(),
        config,
    };

    // Dispatch to appropriate command
    match (cli.command, cli.domain) {
        (Some(Commands::Run(args)), _) => commands::measure::execute(ctx, &args.domain).await,
        (Some(Commands::ValidateIp(args)), _) => commands::validate_ip::execute(ctx, args).await,
        (Some(Commands::IpInfo(args)), _) => commands::ip_info::execute(ctx, args).await,
        (Some(Commands::Config(args)), _) => commands::config::execute(ctx, args),
        (None, Some(domain)) => commands::measure::execute(ctx, &domain).await,
        (None, None) => anyhow::bail!(
            "a domain to measure is required\n\n\
             Usage: measure <DOMAIN>\n\
             Try 'measure --help' for more information."
        ),
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
