//! Command implementations.

pub mod config;
pub mod ip_info;
pub mod measure;
pub mod validate_ip;

use netmeasure::{Measurer, NetClient};
use std::path::PathBuf;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output format
    pub output_format: OutputFormat,

    /// Whether to show educational explanations
    pub explain: bool,

    /// Verbose output
    pub verbose: bool,

    /// Configuration file given on the command line or in the environment
    pub config_path: Option<PathBuf>,

    /// Loaded configuration
    pub config: Config,
}

impl Context {
    /// Create a measurer backed by real network operations.
    pub fn measurer(&self) -> anyhow::Result<Measurer> {
        let client = NetClient::builder()
            .config(self.config.probe_config())
            .build()?;
        Ok(Measurer::from_client(client))
    }
}
