//! Core logic for biathlon race results.
//!
//! This crate turns a timing-system event log into a classification:
//! - Event model and the line parser for timing logs
//! - Competitor state machine applying race rules per event
//! - Report generation: sectioned, sorted result lines
//! - A bounded producer/consumer pipeline tying them together

pub mod config;
pub mod event;
pub mod parser;
pub mod pipeline;
pub mod processor;
pub mod report;
pub mod sink;
pub mod source;
pub mod state;
pub mod time;

pub use config::{ConfigError, RaceConfig};
pub use event::{CompetitorId, Event, EventKind};
pub use parser::{ParseError, parse_event_line};
pub use pipeline::run;
pub use processor::{Processor, StateError, process_events};
pub use report::{Outcome, ResultLine, Split, generate_report, write_report};
pub use sink::{Sink, WriterSink};
pub use state::{CompetitorState, Lap, Penalty, Status, Summary, TARGETS_PER_LINE};
