//! Timing-system events, incoming and synthesized.

use std::fmt;

use chrono::NaiveTime;
use serde::Serialize;

use crate::time::format_clock;

/// Identifies a competitor. Assigned by the timing system, never validated
/// against a roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CompetitorId(pub u32);

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of event kinds.
///
/// The numeric codes used in timing logs are a boundary concern; see
/// [`EventKind::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Registered,
    SetStartTime,
    OnStartLine,
    StartedRace,
    StartedFiringRange,
    ShotHit,
    FinishedFiringRange,
    StartedPenaltyLaps,
    FinishedPenaltyLaps,
    FinishedLap,
    CantContinue,
    /// Synthesized when a competitor is disqualified.
    Disqualified,
    /// Synthesized when a competitor closes their final lap.
    FinishedRace,
}

impl EventKind {
    /// Wire code to kind mapping.
    const CODES: [(u32, Self); 13] = [
        (1, Self::Registered),
        (2, Self::SetStartTime),
        (3, Self::OnStartLine),
        (4, Self::StartedRace),
        (5, Self::StartedFiringRange),
        (6, Self::ShotHit),
        (7, Self::FinishedFiringRange),
        (8, Self::StartedPenaltyLaps),
        (9, Self::FinishedPenaltyLaps),
        (10, Self::FinishedLap),
        (11, Self::CantContinue),
        (32, Self::Disqualified),
        (33, Self::FinishedRace),
    ];

    /// Looks up the kind for a wire code.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, kind)| *kind)
    }

    /// True for kinds the processor synthesizes rather than reads.
    pub const fn is_outgoing(self) -> bool {
        matches!(self, Self::Disqualified | Self::FinishedRace)
    }
}

/// A timestamped fact about one competitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Time of day the event was recorded.
    pub timestamp: NaiveTime,
    pub kind: EventKind,
    pub competitor: CompetitorId,
    /// Extra tokens; their meaning depends on `kind`.
    pub details: Vec<String>,
}

impl Event {
    pub const fn new(timestamp: NaiveTime, kind: EventKind, competitor: CompetitorId) -> Self {
        Self {
            timestamp,
            kind,
            competitor,
            details: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_details<I, T>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.details = details.into_iter().map(Into::into).collect();
        self
    }

    /// The first detail token, or an empty string.
    pub fn first_detail(&self) -> &str {
        self.details.first().map_or("", String::as_str)
    }
}

/// Renders the canonical event log line.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = format_clock(self.timestamp);
        let id = self.competitor;
        match self.kind {
            EventKind::Registered => write!(f, "[{ts}] The competitor({id}) registered"),
            EventKind::SetStartTime => write!(
                f,
                "[{ts}] The start time for the competitor({id}) was set by a draw to {}",
                self.first_detail()
            ),
            EventKind::OnStartLine => write!(f, "[{ts}] The competitor({id}) is on the start line"),
            EventKind::StartedRace => write!(f, "[{ts}] The competitor({id}) has started"),
            EventKind::StartedFiringRange => write!(
                f,
                "[{ts}] The competitor({id}) is on the firing range({})",
                self.first_detail()
            ),
            EventKind::ShotHit => write!(
                f,
                "[{ts}] The target({}) has been hit by competitor({id})",
                self.first_detail()
            ),
            EventKind::FinishedFiringRange => {
                write!(f, "[{ts}] The competitor({id}) left the firing range")
            }
            EventKind::StartedPenaltyLaps => {
                write!(f, "[{ts}] The competitor({id}) entered the penalty laps")
            }
            EventKind::FinishedPenaltyLaps => {
                write!(f, "[{ts}] The competitor({id}) left the penalty laps")
            }
            EventKind::FinishedLap => write!(f, "[{ts}] The competitor({id}) ended the main lap"),
            EventKind::CantContinue => write!(
                f,
                "[{ts}] The competitor({id}) can't continue: {}",
                self.details.join(" ")
            ),
            EventKind::Disqualified => write!(f, "[{ts}] The competitor({id}) is disqualified"),
            EventKind::FinishedRace => write!(f, "[{ts}] The competitor({id}) has finished"),
        }
    }
}
