//! Final classification.
//!
//! Competitors are split into three sections, each sorted on its own key:
//!
//! | Section       | Status         | Sorted by          |
//! |---------------|----------------|--------------------|
//! | `NotStarted`  | disqualified   | drawn start time   |
//! | `NotFinished` | can't continue | time they dropped  |
//! | finished      | finished       | total race time    |
//!
//! Competitors still racing when the log ends are left out. Sorting is
//! stable over ascending competitor ids, so ties are listed by id.

use std::fmt;
use std::io::{self, Write};

use chrono::TimeDelta;
use serde::Serialize;

use crate::config::RaceConfig;
use crate::event::CompetitorId;
use crate::state::{CompetitorState, Status, Summary, TARGETS_PER_LINE};
use crate::time::{average_speed, duration_serde, format_duration};

/// How a competitor's race ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    NotStarted,
    NotFinished,
    Finished {
        #[serde(with = "duration_serde")]
        time: TimeDelta,
    },
}

/// Time and average speed over one timed segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Split {
    #[serde(with = "duration_serde")]
    pub duration: TimeDelta,
    /// Meters per second.
    pub speed: f64,
}

impl Split {
    fn new(distance: i64, duration: TimeDelta) -> Self {
        Self {
            duration,
            speed: average_speed(distance, duration),
        }
    }
}

/// One row of the final report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultLine {
    pub competitor: CompetitorId,
    pub outcome: Outcome,
    /// One entry per lap started; `None` for a lap with no time on it.
    pub laps: Vec<Option<Split>>,
    /// Combined penalty loops, `None` when no penalty time was recorded.
    pub penalty: Option<Split>,
    pub hits: u32,
    pub max_hits: u32,
}

impl ResultLine {
    fn from_state(config: &RaceConfig, state: &CompetitorState, outcome: Outcome) -> Self {
        let laps = state
            .laps
            .iter()
            .map(|lap| {
                lap.has_time()
                    .then(|| Split::new(i64::from(config.lap_len), lap.duration))
            })
            .collect();

        let penalty = (!state.total_penalty_time.is_zero()).then(|| {
            Split::new(
                i64::from(config.penalty_len) * state.total_penalty_laps,
                state.total_penalty_time,
            )
        });

        Self {
            competitor: state.competitor,
            outcome,
            laps,
            penalty,
            hits: state.total_hits,
            max_hits: config.firing_lines.saturating_mul(TARGETS_PER_LINE),
        }
    }
}

fn write_split(f: &mut fmt::Formatter<'_>, split: Option<&Split>) -> fmt::Result {
    match split {
        Some(split) => write!(
            f,
            "{{{}, {:.3}}}",
            format_duration(split.duration),
            split.speed
        ),
        None => f.write_str("{,}"),
    }
}

/// `[<status-or-time>] <id> [<laps>] <penalty> <hits>/<max>`
impl fmt::Display for ResultLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::NotStarted => f.write_str("[NotStarted]")?,
            Outcome::NotFinished => f.write_str("[NotFinished]")?,
            Outcome::Finished { time } => write!(f, "[{}]", format_duration(time))?,
        }
        write!(f, " {} [", self.competitor)?;
        for (i, lap) in self.laps.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_split(f, lap.as_ref())?;
        }
        f.write_str("] ")?;
        write_split(f, self.penalty.as_ref())?;
        write!(f, " {}/{}", self.hits, self.max_hits)
    }
}

/// Builds the ordered report. Takes ownership of the summary: the report is
/// the last stage to see competitor state.
pub fn generate_report(config: &RaceConfig, summary: Summary) -> Vec<ResultLine> {
    let mut not_started = Vec::new();
    let mut not_finished = Vec::new();
    let mut finished = Vec::new();

    for state in summary {
        match state.status {
            Status::Disqualified => not_started.push(state),
            Status::CantContinue => not_finished.push(state),
            Status::Finished => finished.push(state),
            Status::Active => {
                tracing::debug!(competitor = %state.competitor, "still racing, left out of report");
            }
        }
    }

    not_started.sort_by_key(|state| state.scheduled_start);
    not_finished.sort_by_key(|state| state.last_seen);
    finished.sort_by_key(|state| state.total_race_duration);

    tracing::info!(
        not_started = not_started.len(),
        not_finished = not_finished.len(),
        finished = finished.len(),
        "report generated"
    );

    let not_started = not_started
        .iter()
        .map(|state| ResultLine::from_state(config, state, Outcome::NotStarted));
    let not_finished = not_finished
        .iter()
        .map(|state| ResultLine::from_state(config, state, Outcome::NotFinished));
    let finished = finished.iter().map(|state| {
        let outcome = Outcome::Finished {
            time: state.total_race_duration,
        };
        ResultLine::from_state(config, state, outcome)
    });

    not_started.chain(not_finished).chain(finished).collect()
}

/// Writes the report, one line per competitor.
pub fn write_report<W: Write>(
    writer: &mut W,
    config: &RaceConfig,
    summary: Summary,
) -> io::Result<()> {
    for line in generate_report(config, summary) {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
