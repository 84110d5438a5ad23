//! `measure config` - CLI configuration inspection.

use anyhow::Result;
use std::process::ExitCode;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<ExitCode> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx)?,
        ConfigCommands::Path => show_path(&ctx)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn show_config(ctx: &Context) -> Result<()> {
    let effective = ctx.config.effective();

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&effective)?);
        }
        OutputFormat::Text => {
            print!("{}", toml::to_string(&effective)?);
        }
    }

    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    let path = Config::path(ctx.config_path.as_deref())?;
    println!("{}", path.display());
    Ok(())
}
