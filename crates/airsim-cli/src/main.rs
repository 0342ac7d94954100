use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod format;
mod util;

use cli::{Cli, Commands};
use commands::{cmd_classify, cmd_compose, cmd_config, cmd_simulate};
use config::Config;
use format::FormatOptions;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = Config::resolve_path(cli.config.as_deref());
    let config = Config::load(&config_path);
    let opts = FormatOptions::new(cli.no_color || config.no_color);
    let output = cli.output.as_ref();

    match cli.command {
        Commands::Simulate(args) => cmd_simulate(&args, &config, output, &opts)?,
        Commands::Classify { score, format } => {
            cmd_classify(score, config.resolve_format(format), output, &opts)?;
        }
        Commands::Compose {
            oxygen,
            co2,
            humidity,
            temperature,
            comfort,
            format,
        } => {
            cmd_compose(
                oxygen,
                co2,
                humidity,
                temperature,
                comfort,
                config.resolve_format(format),
                output,
                &opts,
            )?;
        }
        Commands::Config { action } => cmd_config(action, &config_path, cli.quiet)?,
    }

    Ok(())
}
