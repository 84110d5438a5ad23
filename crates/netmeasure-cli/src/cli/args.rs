//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Network interference classifier
///
/// Probes the local network for censorship of one domain with three
/// independent tests (DNS, HTTP, TLS/SNI) and prints one verdict per test.
/// Use --explain to learn what each test does.
///
/// Exits with status 1 when offline or behind a captive portal.
///
/// A domain spelled like a subcommand (`config`, `ip-info`, ...) is measured
/// with `measure run <DOMAIN>`.
#[derive(Parser, Debug)]
#[command(name = "measure")]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Domain to measure, e.g. example.org (same as `measure run <DOMAIN>`)
    pub domain: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Configuration file (TOML)
    #[arg(short, long, env = "MEASURE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Explain what this command does (educational mode)
    #[arg(long, global = true)]
    pub explain: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure a domain, including one named like a subcommand
    Run(RunArgs),

    /// Prove with a certificate whether addresses can serve a domain
    ValidateIp(ValidateIpArgs),

    /// Show country, AS and routability of an address
    IpInfo(IpInfoArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Run command
// ============================================================================

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Domain to measure
    pub domain: String,
}

// ============================================================================
// Validate-ip command
// ============================================================================

#[derive(Args, Debug)]
pub struct ValidateIpArgs {
    /// Domain the addresses should serve
    pub domain: String,

    /// Addresses to validate
    #[arg(required = true)]
    pub ips: Vec<IpAddr>,
}

// ============================================================================
// Ip-info command
// ============================================================================

#[derive(Args, Debug)]
pub struct IpInfoArgs {
    /// Address to look up
    pub ip: IpAddr,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show the config file path
    Path,
}
