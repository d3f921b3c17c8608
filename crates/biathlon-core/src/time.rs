//! Clock parsing and duration formatting.
//!
//! Timing logs carry wall-clock times without a date (`HH:MM:SS[.mmm]`).
//! Durations are rendered zero-padded as `HH:MM:SS.mmm`.

use chrono::{NaiveTime, TimeDelta, Timelike};
use thiserror::Error;

/// Accepts an optional fractional part after the seconds.
const CLOCK_FORMAT: &str = "%H:%M:%S%.f";

/// A clock value that is not `HH:MM:SS[.mmm]`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid clock value {value:?}, expected HH:MM:SS[.mmm]")]
pub struct TimeFormatError {
    pub value: String,
}

/// Parses a time of day such as `09:30:00` or `09:30:00.500`.
pub fn parse_clock(value: &str) -> Result<NaiveTime, TimeFormatError> {
    NaiveTime::parse_from_str(value, CLOCK_FORMAT).map_err(|_| TimeFormatError {
        value: value.to_string(),
    })
}

/// Parses a duration written as a clock value, e.g. `00:00:30` for 30 seconds.
pub fn parse_clock_duration(value: &str) -> Result<TimeDelta, TimeFormatError> {
    let clock = parse_clock(value)?;
    Ok(TimeDelta::seconds(i64::from(clock.num_seconds_from_midnight()))
        + TimeDelta::nanoseconds(i64::from(clock.nanosecond())))
}

/// Formats a time of day with millisecond precision.
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M:%S%.3f").to_string()
}

/// Formats a duration as `HH:MM:SS.mmm`. Negative durations get a leading `-`.
pub fn format_duration(duration: TimeDelta) -> String {
    let sign = if duration < TimeDelta::zero() { "-" } else { "" };
    let total_ms = duration.num_milliseconds().unsigned_abs();

    let hours = total_ms / 3_600_000;
    let minutes = total_ms % 3_600_000 / 60_000;
    let seconds = total_ms % 60_000 / 1_000;
    let millis = total_ms % 1_000;

    format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Average speed in distance units per second. Zero for a zero duration.
#[expect(
    clippy::cast_precision_loss,
    reason = "race distances and millisecond counts are far below 2^52"
)]
pub fn average_speed(distance: i64, duration: TimeDelta) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    distance as f64 / (duration.num_milliseconds() as f64 / 1_000.0)
}

/// Serde adapter for times of day written as `HH:MM:SS[.mmm]`.
pub mod clock_serde {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_clock(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_clock(&value).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for durations written as `HH:MM:SS[.mmm]`.
pub mod duration_serde {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let value = String::deserialize(deserializer)?;
        super::parse_clock_duration(&value).map_err(serde::de::Error::custom)
    }
}
