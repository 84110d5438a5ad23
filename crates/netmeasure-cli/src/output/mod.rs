//! Output formatting for different formats.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Available output formats.
///
/// Parsed by clap for `--output` and by serde for the config file.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-oriented `key: value` text
    #[default]
    Text,
    /// JSON output
    Json,
}
