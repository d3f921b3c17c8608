//! Replays an event log and prints the classification.
//!
//! The event log and the report share one buffered output: every event line
//! first, then one result line per competitor.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use biathlon_core::{RaceConfig, Summary, WriterSink, generate_report, write_report};
use tokio::io::{AsyncBufRead, BufReader};

use crate::cli::{Cli, ReportFormat};
use crate::config::load_config;

/// Boxed line source for the event log.
pub type EventReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Runs the whole race replay described by `cli`.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(&cli.config).with_context(|| {
        format!(
            "failed to load race configuration from {}",
            cli.config.display()
        )
    })?;
    tracing::debug!(?config, "loaded configuration");

    let events = open_events(cli.events.as_deref()).await?;
    let mut out = open_output(cli.output.as_deref())?;

    replay(events, &config, cli.format, &mut out).await?;
    out.flush().context("failed to flush output")?;
    Ok(())
}

/// Writes the event log for `events` followed by the report.
pub async fn replay<W: Write>(
    events: EventReader,
    config: &RaceConfig,
    format: ReportFormat,
    out: &mut W,
) -> Result<()> {
    let summary = biathlon_core::run(events, config, WriterSink::new(&mut *out))
        .await
        .context("failed to write event log")?;

    match format {
        ReportFormat::Text => {
            write_report(out, config, summary).context("failed to write report")?;
        }
        ReportFormat::Json => write_json_report(out, config, summary)?,
    }
    Ok(())
}

fn write_json_report<W: Write>(
    out: &mut W,
    config: &RaceConfig,
    summary: Summary,
) -> Result<()> {
    for line in generate_report(config, summary) {
        serde_json::to_writer(&mut *out, &line).context("failed to serialize result")?;
        writeln!(out).context("failed to write report")?;
    }
    Ok(())
}

async fn open_events(path: Option<&Path>) -> Result<EventReader> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open event log {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

fn open_output(path: Option<&Path>) -> Result<BufWriter<Box<dyn Write>>> {
    let writer: Box<dyn Write> = match path {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    Ok(BufWriter::new(writer))
}
