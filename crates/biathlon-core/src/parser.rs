//! Line parser for timing logs.
//!
//! Each line has the shape `[HH:MM:SS[.mmm]] <eventCode> <competitorId> [details...]`.

use thiserror::Error;

use crate::event::{CompetitorId, Event, EventKind};
use crate::time::{TimeFormatError, parse_clock};

/// Why a log line could not be turned into an [`Event`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected timestamp, event id and competitor id, got {line:?}")]
    TooFewFields { line: String },

    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] TimeFormatError),

    #[error("invalid event id {0:?}")]
    InvalidEventId(String),

    #[error("unknown event id {0}")]
    UnknownEventId(u32),

    /// Disqualified/finished events are derived, never read.
    #[error("event id {0} is reserved for synthesized events")]
    OutgoingEventId(u32),

    #[error("invalid competitor id {0:?}")]
    InvalidCompetitorId(String),
}

/// Parses one line of a timing log.
pub fn parse_event_line(line: &str) -> Result<Event, ParseError> {
    let mut fields = line.split_whitespace();
    let (Some(ts), Some(code), Some(competitor)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(ParseError::TooFewFields {
            line: line.to_string(),
        });
    };

    let timestamp = parse_clock(ts.trim_matches(['[', ']']))?;

    let code: u32 = code
        .parse()
        .map_err(|_| ParseError::InvalidEventId(code.to_string()))?;
    let kind = EventKind::from_code(code).ok_or(ParseError::UnknownEventId(code))?;
    if kind.is_outgoing() {
        return Err(ParseError::OutgoingEventId(code));
    }

    let competitor = competitor
        .parse()
        .map(CompetitorId)
        .map_err(|_| ParseError::InvalidCompetitorId(competitor.to_string()))?;

    Ok(Event::new(timestamp, kind, competitor).with_details(fields))
}
