//! `measure <domain>` - Classify interference with one domain.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use netmeasure::render_report;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::time::Duration;

use super::Context;
use crate::education::Explain;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, domain: &str) -> Result<ExitCode> {
    let measurer = ctx.measurer()?;

    if ctx.explain {
        Explain::measure(domain, measurer.config()).print();
    }

    let spinner = spinner(&ctx, domain);
    let outcome = measurer.run(domain).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = outcome?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            print!("{}", render_report(&report));
        }
    }

    // Verdicts are reported, not turned into a failing status.
    Ok(ExitCode::SUCCESS)
}

/// Progress indicator on stderr, only for an interactive, non-verbose run.
fn spinner(ctx: &Context, domain: &str) -> Option<ProgressBar> {
    if ctx.verbose || !std::io::stderr().is_terminal() {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Measuring {domain}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}
