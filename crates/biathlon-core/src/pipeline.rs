//! Producer/consumer wiring: event source → processor.

use std::io;

use tokio::io::AsyncBufRead;

use crate::config::RaceConfig;
use crate::processor::Processor;
use crate::sink::Sink;
use crate::source::{DEFAULT_CAPACITY, SourceItem, spawn_event_source};
use crate::state::Summary;

/// Reads a whole timing log and returns the resulting summary.
///
/// Events, malformed lines and read failures all go to `sink` in arrival
/// order. Only sink I/O failures end the run early.
pub async fn run<R, S>(reader: R, config: &RaceConfig, sink: S) -> io::Result<Summary>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    S: Sink,
{
    let (mut items, producer) = spawn_event_source(reader, DEFAULT_CAPACITY);
    let mut processor = Processor::new(config, sink);

    while let Some(item) = items.recv().await {
        match item {
            SourceItem::Event(event) => processor.process(event)?,
            SourceItem::Malformed(err) => processor.report_error("parse", &err)?,
            SourceItem::ReadFailed(err) => processor.report_error("read", &err)?,
        }
    }

    producer.await.map_err(io::Error::other)?;

    let summary = processor.into_summary();
    tracing::info!(competitors = summary.len(), "event log consumed");
    Ok(summary)
}
