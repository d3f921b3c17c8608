//! Append-only event log output.

use std::error::Error;
use std::io::{self, Write};

use crate::event::Event;

/// Receives every consumed or synthesized event and every ignored error.
pub trait Sink {
    fn log_event(&mut self, event: &Event) -> io::Result<()>;

    /// Records a non-fatal error; `context` names the stage that failed.
    fn log_error(&mut self, context: &str, err: &dyn Error) -> io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn log_event(&mut self, event: &Event) -> io::Result<()> {
        (**self).log_event(event)
    }

    fn log_error(&mut self, context: &str, err: &dyn Error) -> io::Result<()> {
        (**self).log_error(context, err)
    }
}

/// Writes one line per event to any [`Write`].
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn log_event(&mut self, event: &Event) -> io::Result<()> {
        writeln!(self.writer, "{event}")
    }

    fn log_error(&mut self, context: &str, err: &dyn Error) -> io::Result<()> {
        writeln!(self.writer, "[ERROR] {context} failed, event ignored: {err}")
    }
}
