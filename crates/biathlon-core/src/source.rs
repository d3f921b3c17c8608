//! Event producer feeding the processor through a bounded channel.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::event::Event;
use crate::parser::{ParseError, parse_event_line};

/// Number of items buffered between the reader and the processor.
pub const DEFAULT_CAPACITY: usize = 100;

/// One unit handed from the source to the consumer.
#[derive(Debug)]
pub enum SourceItem {
    Event(Event),
    /// A line that could not be parsed; the source keeps going.
    Malformed(ParseError),
    /// Reading failed; this is the last item the source sends.
    ReadFailed(io::Error),
}

/// Spawns a task that reads `reader` line by line and sends the parsed
/// results. The sender is dropped when input is exhausted, which closes the
/// channel. Blank lines are skipped.
pub fn spawn_event_source<R>(
    reader: R,
    capacity: usize,
) -> (mpsc::Receiver<SourceItem>, JoinHandle<()>)
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handle = tokio::spawn(async move {
        let mut lines = reader.lines();
        let mut count = 0usize;
        loop {
            let item = match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => match parse_event_line(&line) {
                    Ok(event) => SourceItem::Event(event),
                    Err(err) => SourceItem::Malformed(err),
                },
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(error = %err, "reading event log failed");
                    if tx.send(SourceItem::ReadFailed(err)).await.is_err() {
                        tracing::debug!("event consumer went away before the read failure");
                    }
                    break;
                }
            };

            count += 1;
            if tx.send(item).await.is_err() {
                tracing::debug!("event consumer went away, stopping source");
                break;
            }
        }
        tracing::debug!(lines = count, "event source exhausted");
    });

    (rx, handle)
}
