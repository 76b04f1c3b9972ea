mod cli;
mod commands;
mod config;
mod display;
mod input;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

fn main() -> Result<()> {
    // Logs go to stderr so they do not interleave with judgement output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hitsync=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Command::Play { chart, level } => commands::play::run(&config, &chart, level.as_deref()),
        Command::Autoplay {
            chart,
            level,
            offset_ms,
            skip_every,
        } => commands::autoplay::run(&config, &chart, level.as_deref(), offset_ms, skip_every),
        Command::Check { chart, strict } => commands::check::run(&config, &chart, strict),
        Command::Scores { level } => commands::scores::run(&config, level.as_deref()),
    }
}
