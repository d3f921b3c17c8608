//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Biathlon race results.
///
/// Replays a timing-system event log, printing one line per event followed
/// by the final classification.
#[derive(Debug, Parser)]
#[command(name = "biathlon", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the race configuration (JSON, or TOML with a .toml extension).
    #[arg(short, long, env = "BIATHLON_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Path to the event log; `-` or omitted reads stdin.
    #[arg(short, long, env = "BIATHLON_EVENTS")]
    pub events: Option<PathBuf>,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// How the final report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One bracketed result line per competitor.
    Text,
    /// One JSON object per competitor.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "biathlon", "-v", "--config", "race.toml", "--events", "events.log", "--output",
            "out.txt", "--format", "json",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("race.toml"));
        assert_eq!(cli.events, Some(PathBuf::from("events.log")));
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
        assert_eq!(cli.format, ReportFormat::Json);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["biathlon", "--format", "html"]).is_err());
    }
}
