//! measure - Network interference classifier
//!
//! Tells you whether the network in front of you tampers with a domain.

use anyhow::Result;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    netmeasure_cli::run().await
}
