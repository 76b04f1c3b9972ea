//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hitsync")]
#[command(version, about = "Rhythm-action timing engine")]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, default_value = "hitsync.toml", env = "HITSYNC_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Play a chart with the keyboard
    Play {
        /// Chart file (JSON)
        chart: PathBuf,

        /// Level id scores are stored under (defaults to the chart file name)
        #[arg(short, long)]
        level: Option<String>,
    },

    /// Play a chart with a scripted player
    Autoplay {
        /// Chart file (JSON)
        chart: PathBuf,

        /// Level id scores are stored under (defaults to the chart file name)
        #[arg(short, long)]
        level: Option<String>,

        /// Press every note this many milliseconds after its hit time
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset_ms: i64,

        /// Leave every K-th note unpressed so it expires
        #[arg(long)]
        skip_every: Option<usize>,
    },

    /// Load and validate a chart without playing it
    Check {
        /// Chart file (JSON)
        chart: PathBuf,

        /// Also require notes to be listed in hit-time order
        #[arg(long)]
        strict: bool,
    },

    /// Show stored score records
    Scores {
        /// Only show this level
        level: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_autoplay_negative_offset() {
        let cli = Cli::try_parse_from([
            "hitsync",
            "autoplay",
            "levels/sakura.json",
            "--offset-ms",
            "-30",
            "--skip-every",
            "4",
        ])
        .unwrap();

        match cli.command {
            Command::Autoplay {
                chart,
                offset_ms,
                skip_every,
                level,
            } => {
                assert_eq!(chart, PathBuf::from("levels/sakura.json"));
                assert_eq!(offset_ms, -30);
                assert_eq!(skip_every, Some(4));
                assert_eq!(level, None);
            }
            _ => panic!("expected autoplay"),
        }
        assert_eq!(cli.config, PathBuf::from("hitsync.toml"));
    }
}
