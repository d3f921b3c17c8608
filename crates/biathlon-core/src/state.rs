//! Per-competitor racing state and the summary that owns it.

use std::collections::BTreeMap;

use chrono::{NaiveTime, TimeDelta};

use crate::event::CompetitorId;

/// Targets on each firing line.
pub const TARGETS_PER_LINE: u32 = 5;

/// Where a competitor stands. Every variant except `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Active,
    Disqualified,
    CantContinue,
    Finished,
}

impl Status {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// One main lap attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lap {
    pub start: NaiveTime,
    /// `None` while the lap is still open.
    pub finish: Option<NaiveTime>,
    /// Elapsed lap time. The first lap also carries the offset between the
    /// drawn and the actual start.
    pub duration: TimeDelta,
}

impl Lap {
    pub const fn open(start: NaiveTime, duration: TimeDelta) -> Self {
        Self {
            start,
            finish: None,
            duration,
        }
    }

    pub const fn is_closed(&self) -> bool {
        self.finish.is_some()
    }

    /// True once any time is on the lap. An open first lap can already
    /// carry the start offset.
    pub fn has_time(&self) -> bool {
        !self.duration.is_zero()
    }
}

/// One completed penalty-loop interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Penalty {
    pub start: NaiveTime,
    pub finish: NaiveTime,
    pub duration: TimeDelta,
}

/// Everything known about one competitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitorState {
    pub competitor: CompetitorId,
    /// Start time assigned by the draw.
    pub scheduled_start: Option<NaiveTime>,
    /// Time the competitor crossed the start line.
    pub actual_start: Option<NaiveTime>,
    /// Main laps; the last one is open until its `finish` is set.
    pub laps: Vec<Lap>,
    /// Start of the penalty loop currently being skied.
    pub current_penalty: Option<NaiveTime>,
    pub penalties: Vec<Penalty>,
    pub total_penalty_time: TimeDelta,
    /// Signed because a malformed log can report more hits than targets.
    pub total_penalty_laps: i64,
    /// Hits since the last penalty loop started.
    pub current_hits: u32,
    pub total_hits: u32,
    pub status: Status,
    /// When the competitor dropped out.
    pub last_seen: Option<NaiveTime>,
    /// Sum of all lap durations, set when the final lap closes.
    pub total_race_duration: TimeDelta,
}

impl CompetitorState {
    pub fn new(competitor: CompetitorId) -> Self {
        Self {
            competitor,
            scheduled_start: None,
            actual_start: None,
            laps: Vec::new(),
            current_penalty: None,
            penalties: Vec::new(),
            total_penalty_time: TimeDelta::zero(),
            total_penalty_laps: 0,
            current_hits: 0,
            total_hits: 0,
            status: Status::Active,
            last_seen: None,
            total_race_duration: TimeDelta::zero(),
        }
    }

    pub fn closed_laps(&self) -> usize {
        self.laps.iter().filter(|lap| lap.is_closed()).count()
    }
}

/// Final (or in-progress) state of every competitor seen in the log.
///
/// Iteration is in ascending competitor id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    competitors: BTreeMap<CompetitorId, CompetitorState>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the competitor's state, creating it on first sight.
    pub fn get_or_insert(&mut self, competitor: CompetitorId) -> &mut CompetitorState {
        self.competitors
            .entry(competitor)
            .or_insert_with(|| CompetitorState::new(competitor))
    }

    pub fn get(&self, competitor: CompetitorId) -> Option<&CompetitorState> {
        self.competitors.get(&competitor)
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }
}

impl IntoIterator for Summary {
    type Item = CompetitorState;
    type IntoIter = std::collections::btree_map::IntoValues<CompetitorId, CompetitorState>;

    fn into_iter(self) -> Self::IntoIter {
        self.competitors.into_values()
    }
}
