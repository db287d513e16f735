use anyhow::Context;
use clap::Parser;
use cmdfy::cli::{Cli, Commands};
use cmdfy::commands;
use cmdfy::config::Config;
use colored::*;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let default_level = if debug { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    if let Some(Commands::Config { action }) = &cli.command {
        return commands::config::run(action, &config_path)
            .context("config command failed");
    }

    let config = Config::load_from(&config_path)?;
    commands::generate::run(&cli, &config).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "[X]".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
