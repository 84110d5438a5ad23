//! `measure validate-ip` - Certificate-based address validation.

use anyhow::Result;
use colored::Colorize;
use netmeasure::normalize_domain;
use netmeasure::probes::IpValidation;
use std::process::ExitCode;

use super::Context;
use crate::cli::args::ValidateIpArgs;
use crate::education::Explain;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: ValidateIpArgs) -> Result<ExitCode> {
    let domain = normalize_domain(&args.domain)?;

    if ctx.explain {
        Explain::validate_ip(&domain).print();
    }

    let measurer = ctx.measurer()?;
    let outcomes = measurer.validate_ips(&domain, &args.ips).await;

    match ctx.output_format {
        OutputFormat::Json => {
            let rows: Vec<_> = outcomes
                .iter()
                .map(|(ip, outcome)| {
                    serde_json::json!({
                        "ip": ip,
                        "valid": outcome.is_valid(),
                        "detail": outcome.to_string(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            for (ip, outcome) in &outcomes {
                println!("IP {ip} is {}", colorize(outcome));
            }
        }
    }

    let all_valid = outcomes.iter().all(|(_, outcome)| outcome.is_valid());
    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn colorize(outcome: &IpValidation) -> String {
    let text = outcome.to_string();
    if outcome.is_valid() {
        text.green().bold().to_string()
    } else {
        text.yellow().to_string()
    }
}
