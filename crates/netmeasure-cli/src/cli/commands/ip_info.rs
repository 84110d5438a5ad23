//! `measure ip-info` - Country, AS and routability of an address.

use anyhow::Result;
use colored::Colorize;
use netmeasure::NetworkContext;
use std::process::ExitCode;
use tracing::warn;

use super::Context;
use crate::cli::args::IpInfoArgs;
use crate::education::Explain;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: IpInfoArgs) -> Result<ExitCode> {
    if ctx.explain {
        Explain::ip_info(&args.ip.to_string()).print();
    }

    let measurer = ctx.measurer()?;
    let (metadata, bogon) = measurer.ip_info(args.ip).await;
    let info = metadata.unwrap_or_else(|e| {
        warn!(ip = %args.ip, error = %e, "IP metadata lookup failed");
        NetworkContext {
            ip: args.ip.to_string(),
            ..NetworkContext::unknown()
        }
    });

    match ctx.output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "ip": args.ip,
                    "country": info.country,
                    "as": info.autonomous_system,
                    "global": bogon.is_none(),
                    "bogon": bogon.map(|kind| kind.as_str()),
                }))?
            );
        }
        OutputFormat::Text => {
            println!("ip: {}", args.ip);
            println!("country: {}", info.country);
            println!("as: {}", info.autonomous_system);
            match bogon {
                None => println!("global: yes"),
                Some(kind) => println!("global: {}", format!("no ({kind})").yellow()),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
