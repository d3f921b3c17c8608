//! Race configuration loading.

use std::path::{Path, PathBuf};

use biathlon_core::time::{TimeFormatError, parse_clock, parse_clock_duration};
use biathlon_core::{ConfigError, RaceConfig};
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml};
use serde::Deserialize;
use thiserror::Error;

/// Prefix for environment overrides, e.g. `BIATHLON_LAPS=3`.
const ENV_PREFIX: &str = "BIATHLON_";

/// Why the race configuration could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Figment(#[from] figment::Error),

    #[error("invalid {key} override: {source}")]
    Override {
        key: &'static str,
        source: TimeFormatError,
    },

    #[error("invalid race configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Race parameters set through the environment.
///
/// Env keys arrive lowercased (`BIATHLON_LAP_LEN` → `lap_len`), so they are
/// read separately from the camelCase file keys and applied on top.
#[derive(Debug, Default, Deserialize)]
struct Overrides {
    laps: Option<u32>,
    lap_len: Option<u32>,
    penalty_len: Option<u32>,
    firing_lines: Option<u32>,
    start: Option<String>,
    start_delta: Option<String>,
}

impl Overrides {
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    fn apply(self, config: &mut RaceConfig) -> Result<(), LoadError> {
        if let Some(laps) = self.laps {
            config.laps = laps;
        }
        if let Some(lap_len) = self.lap_len {
            config.lap_len = lap_len;
        }
        if let Some(penalty_len) = self.penalty_len {
            config.penalty_len = penalty_len;
        }
        if let Some(firing_lines) = self.firing_lines {
            config.firing_lines = firing_lines;
        }
        if let Some(start) = self.start {
            config.start = parse_clock(&start).map_err(|source| LoadError::Override {
                key: "start",
                source,
            })?;
        }
        if let Some(delta) = self.start_delta {
            config.start_delta =
                parse_clock_duration(&delta).map_err(|source| LoadError::Override {
                    key: "start_delta",
                    source,
                })?;
        }
        Ok(())
    }
}

/// Loads the race configuration from `path`, then applies `BIATHLON_*`
/// environment overrides.
///
/// Files ending in `.toml` are read as TOML, everything else as JSON.
#[expect(
    clippy::result_large_err,
    reason = "figment::Error is large but only returned at startup"
)]
pub fn load_config(path: &Path) -> Result<RaceConfig, LoadError> {
    load_with_env(path, Env::prefixed(ENV_PREFIX))
}

#[expect(
    clippy::result_large_err,
    reason = "figment::Error is large but only returned at startup"
)]
fn load_with_env(path: &Path, env: Env) -> Result<RaceConfig, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let is_toml = path.extension().is_some_and(|ext| ext == "toml");
    let file = if is_toml {
        Figment::from(Toml::file(path))
    } else {
        Figment::from(Json::file(path))
    };
    let mut config: RaceConfig = file.extract()?;

    let overrides: Overrides = Figment::from(env).extract()?;
    tracing::debug!(?overrides, "environment overrides");
    overrides.apply(&mut config)?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::{NaiveTime, TimeDelta};

    use super::*;

    const JSON: &str = r#"{
        "laps": 2,
        "lapLen": 3651,
        "penaltyLen": 50,
        "firingLines": 1,
        "start": "09:30:00",
        "startDelta": "00:00:30"
    }"#;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    /// An env provider whose prefix no test sets.
    fn no_env() -> Env {
        Env::prefixed("BIATHLON_TEST_UNSET_")
    }

    #[test]
    fn loads_json_config() {
        let file = write_temp(".json", JSON);

        let config = load_with_env(file.path(), no_env()).unwrap();

        assert_eq!(config.laps, 2);
        assert_eq!(config.lap_len, 3651);
        assert_eq!(config.penalty_len, 50);
        assert_eq!(config.firing_lines, 1);
        assert_eq!(config.start, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(config.start_delta, TimeDelta::seconds(30));
    }

    #[test]
    fn loads_toml_config() {
        let file = write_temp(
            ".toml",
            r#"
            laps = 3
            lapLen = 1000
            penaltyLen = 25
            firingLines = 2
            start = "12:34:56.789"
            startDelta = "00:02:03"
            "#,
        );

        let config = load_with_env(file.path(), no_env()).unwrap();

        assert_eq!(config.laps, 3);
        assert_eq!(config.firing_lines, 2);
        assert_eq!(config.start_delta, TimeDelta::seconds(123));
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("race.json", JSON)?;
            jail.set_env("BIATHLON_LAPS", "5");
            jail.set_env("BIATHLON_LAP_LEN", "4000");
            jail.set_env("BIATHLON_START_DELTA", "00:01:00");

            let config = load_config(Path::new("race.json")).expect("config should load");
            assert_eq!(config.laps, 5);
            assert_eq!(config.lap_len, 4000);
            assert_eq!(config.penalty_len, 50);
            assert_eq!(config.start_delta, TimeDelta::minutes(1));
            Ok(())
        });
    }

    #[test]
    fn bad_env_clock_is_reported() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("race.json", JSON)?;
            jail.set_env("BIATHLON_START", "soon");

            let err = load_config(Path::new("race.json")).unwrap_err();
            assert!(matches!(err, LoadError::Override { key: "start", .. }));
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_with_env(Path::new("does/not/exist.json"), no_env()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let file = write_temp(".json", r#"{ "laps": 2, "lapLen="invalid"; }"#);
        let err = load_with_env(file.path(), no_env()).unwrap_err();
        assert!(matches!(err, LoadError::Figment(_)));
    }

    #[test]
    fn invalid_clock_is_rejected() {
        let file = write_temp(".json", &JSON.replace("09:30:00", "invalid_time"));
        assert!(load_with_env(file.path(), no_env()).is_err());
    }

    #[test]
    fn zero_laps_fails_validation() {
        let file = write_temp(".json", &JSON.replace("\"laps\": 2", "\"laps\": 0"));
        let err = load_with_env(file.path(), no_env()).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::NoLaps)));
    }
}
