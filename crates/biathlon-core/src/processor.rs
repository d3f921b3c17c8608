//! Competitor state machine.
//!
//! Events are consumed strictly in arrival order. For each event:
//!
//! 1. The event is logged to the [`Sink`].
//! 2. The competitor's state is fetched or created.
//! 3. Competitors that are no longer active are frozen; the event stops here.
//! 4. [`apply`] runs the handler for the event kind. A handler error is
//!    reported and the event's effect is dropped.
//! 5. [`follow_up`] checks the resulting status and, if the competitor was
//!    just disqualified or finished, the synthesized event is logged.

use std::io;

use chrono::TimeDelta;
use thiserror::Error;

use crate::config::RaceConfig;
use crate::event::{Event, EventKind};
use crate::sink::Sink;
use crate::state::{CompetitorState, Lap, Penalty, Status, Summary, TARGETS_PER_LINE};
use crate::time::parse_clock;

/// A single event could not be applied to competitor state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid event data: {0}")]
    InvalidEventData(String),
}

impl StateError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidEventData(message.into())
    }
}

/// Applies one event to an active competitor's state.
pub fn apply(
    config: &RaceConfig,
    event: &Event,
    state: &mut CompetitorState,
) -> Result<(), StateError> {
    match event.kind {
        EventKind::SetStartTime => set_start_time(event, state),
        EventKind::StartedRace => start_race(config, event, state),
        EventKind::ShotHit => {
            record_hit(state);
            Ok(())
        }
        EventKind::StartedPenaltyLaps => {
            start_penalty(event, state);
            Ok(())
        }
        EventKind::FinishedPenaltyLaps => finish_penalty(event, state),
        EventKind::FinishedLap => finish_lap(config, event, state),
        EventKind::CantContinue => {
            state.status = Status::CantContinue;
            state.last_seen = Some(event.timestamp);
            Ok(())
        }
        EventKind::Registered
        | EventKind::OnStartLine
        | EventKind::StartedFiringRange
        | EventKind::FinishedFiringRange
        | EventKind::Disqualified
        | EventKind::FinishedRace => Ok(()),
    }
}

/// Returns the event to synthesize after `event` left `state` as it is now.
pub fn follow_up(event: &Event, state: &CompetitorState) -> Option<Event> {
    let kind = match state.status {
        Status::Disqualified => EventKind::Disqualified,
        Status::Finished => EventKind::FinishedRace,
        Status::Active | Status::CantContinue => return None,
    };
    Some(Event {
        kind,
        ..event.clone()
    })
}

fn set_start_time(event: &Event, state: &mut CompetitorState) -> Result<(), StateError> {
    let Some(value) = event.details.first() else {
        return Err(StateError::invalid("start time missing"));
    };
    let scheduled = parse_clock(value).map_err(|err| StateError::invalid(err.to_string()))?;
    state.scheduled_start = Some(scheduled);
    Ok(())
}

fn start_race(
    config: &RaceConfig,
    event: &Event,
    state: &mut CompetitorState,
) -> Result<(), StateError> {
    if !state.laps.is_empty() {
        return Err(StateError::invalid("competitor has already started"));
    }

    let started = event.timestamp;
    state.actual_start = Some(started);

    // Lateness relative to the draw; the deadline itself is still on time.
    let offset = state.scheduled_start.map(|scheduled| started - scheduled);
    let on_time = offset
        .is_some_and(|offset| offset >= TimeDelta::zero() && offset <= config.start_delta);
    if !on_time {
        tracing::debug!(
            competitor = %event.competitor,
            ?offset,
            "start outside the allowed window"
        );
        state.status = Status::Disqualified;
    }

    state
        .laps
        .push(Lap::open(started, offset.unwrap_or_else(TimeDelta::zero)));
    Ok(())
}

fn record_hit(state: &mut CompetitorState) {
    state.current_hits += 1;
    state.total_hits += 1;
}

fn start_penalty(event: &Event, state: &mut CompetitorState) {
    if state.current_hits > TARGETS_PER_LINE {
        tracing::warn!(
            competitor = %event.competitor,
            hits = state.current_hits,
            "more hits than targets since the last penalty loop"
        );
    }
    if let Some(open) = state.current_penalty {
        tracing::debug!(competitor = %event.competitor, %open, "penalty loop restarted before finishing");
    }

    state.total_penalty_laps += i64::from(TARGETS_PER_LINE) - i64::from(state.current_hits);
    state.current_hits = 0;
    state.current_penalty = Some(event.timestamp);
}

fn finish_penalty(event: &Event, state: &mut CompetitorState) -> Result<(), StateError> {
    let Some(start) = state.current_penalty.take() else {
        return Err(StateError::invalid("finishing a penalty loop never started"));
    };

    let duration = event.timestamp - start;
    state.total_penalty_time += duration;
    state.penalties.push(Penalty {
        start,
        finish: event.timestamp,
        duration,
    });
    Ok(())
}

fn finish_lap(
    config: &RaceConfig,
    event: &Event,
    state: &mut CompetitorState,
) -> Result<(), StateError> {
    let Some(lap) = state.laps.last_mut().filter(|lap| !lap.is_closed()) else {
        return Err(StateError::invalid("finishing a lap never started"));
    };

    lap.finish = Some(event.timestamp);
    lap.duration += event.timestamp - lap.start;

    let required = usize::try_from(config.laps).unwrap_or(usize::MAX);
    if state.laps.len() >= required {
        state.status = Status::Finished;
        state.total_race_duration = state
            .laps
            .iter()
            .fold(TimeDelta::zero(), |total, lap| total + lap.duration);
    } else {
        state.laps.push(Lap::open(event.timestamp, TimeDelta::zero()));
    }
    Ok(())
}

/// Incremental driver that owns the [`Summary`] while a log is consumed.
#[derive(Debug)]
pub struct Processor<'a, S> {
    config: &'a RaceConfig,
    sink: S,
    summary: Summary,
}

impl<'a, S: Sink> Processor<'a, S> {
    pub fn new(config: &'a RaceConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            summary: Summary::new(),
        }
    }

    /// Consumes one event. Only sink I/O failures are returned; rule
    /// violations are reported to the sink and skipped.
    pub fn process(&mut self, event: Event) -> io::Result<()> {
        self.sink.log_event(&event)?;

        let state = self.summary.get_or_insert(event.competitor);
        if !state.status.is_active() {
            tracing::debug!(
                competitor = %event.competitor,
                kind = ?event.kind,
                status = ?state.status,
                "ignoring event for competitor no longer racing"
            );
            return Ok(());
        }

        if let Err(err) = apply(self.config, &event, state) {
            tracing::warn!(
                competitor = %event.competitor,
                kind = ?event.kind,
                error = %err,
                "event rejected"
            );
            self.sink.log_error("update", &err)?;
        }

        if let Some(derived) = follow_up(&event, state) {
            self.sink.log_event(&derived)?;
        }
        Ok(())
    }

    /// Reports an error from outside the state machine, e.g. a bad log line.
    pub fn report_error(&mut self, context: &str, err: &dyn std::error::Error) -> io::Result<()> {
        self.sink.log_error(context, err)
    }

    pub const fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn into_summary(self) -> Summary {
        self.summary
    }
}

/// Runs a whole sequence of events through a fresh [`Processor`].
pub fn process_events<I, S>(events: I, config: &RaceConfig, sink: S) -> io::Result<Summary>
where
    I: IntoIterator<Item = Event>,
    S: Sink,
{
    let mut processor = Processor::new(config, sink);
    for event in events {
        processor.process(event)?;
    }
    Ok(processor.into_summary())
}
