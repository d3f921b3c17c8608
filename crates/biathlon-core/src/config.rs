//! Race parameters, consumed read-only by the processor and the report.

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{clock_serde, duration_serde};

/// Invalid race parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("laps must be at least 1")]
    NoLaps,

    #[error("startDelta must not be negative")]
    NegativeStartDelta,
}

/// Parameters of one race. Keys are camelCase (`lapLen`, `startDelta`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceConfig {
    /// Number of main laps.
    pub laps: u32,

    /// Length of one main lap in meters.
    pub lap_len: u32,

    /// Length of one penalty loop in meters.
    pub penalty_len: u32,

    /// Number of shooting stages.
    pub firing_lines: u32,

    /// Planned start of the race.
    #[serde(with = "clock_serde")]
    pub start: NaiveTime,

    /// How late after the drawn start time a competitor may cross the line.
    #[serde(with = "duration_serde")]
    pub start_delta: TimeDelta,
}

impl RaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.laps == 0 {
            return Err(ConfigError::NoLaps);
        }
        if self.start_delta < TimeDelta::zero() {
            return Err(ConfigError::NegativeStartDelta);
        }
        Ok(())
    }
}
