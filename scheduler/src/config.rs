use std::{env, fmt, fs};

use serde::Deserialize;

use crate::errors::{ConfigError, PluginError};
use crate::framework::{MAX_NODE_SCORE, MIN_NODE_SCORE, ScoreRange};

const LEAST_MODE: &str = "Least";
const MOST_MODE: &str = "Most";

const DEFAULT_SNAPSHOT: &str = "snapshot.json";

// --- Plugin args ---

/// Which end of the memory headroom ranking gets the higher raw score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoreMode {
    /// Raw score is the negated headroom
    #[default]
    Least,
    /// Raw score is the headroom
    Most,
}

impl ScoreMode {
    /// Decodes the optional args blob handed over by the host.
    ///
    /// No blob selects `Least`. A blob must carry a `mode` of exactly
    /// `Least` or `Most`, anything else is rejected.
    pub fn from_args(raw: Option<&[u8]>) -> Result<Self, PluginError> {
        let Some(raw) = raw else {
            return Ok(ScoreMode::default());
        };
        let args: PluginArgs = serde_json::from_slice(raw)
            .map_err(|e| PluginError::MalformedArgs(e.to_string()))?;
        args.mode.parse()
    }
}

impl std::str::FromStr for ScoreMode {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            LEAST_MODE => Ok(ScoreMode::Least),
            MOST_MODE => Ok(ScoreMode::Most),
            other => Err(PluginError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for ScoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreMode::Least => write!(f, "{}", LEAST_MODE),
            ScoreMode::Most => write!(f, "{}", MOST_MODE),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PluginArgs {
    mode: String,
}

// --- Binary config ---

/// Dry-run configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON plugin args, `None` runs with defaults
    pub args_path: Option<String>,
    pub snapshot_path: String,
    pub score_range: ScoreRange,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when applicable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let args_path = env::var("CR8S_SCHED_ARGS").ok().filter(|p| !p.is_empty());

        let snapshot_path =
            env::var("CR8S_SCHED_SNAPSHOT").unwrap_or_else(|_| DEFAULT_SNAPSHOT.to_string());

        let min = score_var("CR8S_SCHED_MIN_SCORE", MIN_NODE_SCORE)?;
        let max = score_var("CR8S_SCHED_MAX_SCORE", MAX_NODE_SCORE)?;
        if min >= max {
            return Err(ConfigError::InvalidVar(
                "CR8S_SCHED_MAX_SCORE".to_string(),
                format!("{} (must exceed {})", max, min),
            ));
        }

        Ok(Config {
            args_path,
            snapshot_path,
            score_range: ScoreRange { min, max },
        })
    }

    /// Raw plugin args, if a file was configured.
    pub fn load_args(&self) -> Result<Option<Vec<u8>>, ConfigError> {
        self.args_path
            .as_deref()
            .map(|path| fs::read(path).map_err(|e| ConfigError::Io(path.to_string(), e)))
            .transpose()
    }
}

fn score_var(var: &str, default: i64) -> Result<i64, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidVar(var.to_string(), value)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {

    //! - test_mode_defaults_to_least
    //!     no args blob selects `Least`.
    //! - test_mode_accepts_exact_values
    //!     `Least` and `Most` decode to their variant.
    //! - test_mode_rejects_other_values
    //!     case variants, empty mode, missing field and broken JSON all fail.

    use super::*;

    #[test]
    fn test_mode_defaults_to_least() {
        assert_eq!(ScoreMode::from_args(None), Ok(ScoreMode::Least));
    }

    #[test]
    fn test_mode_accepts_exact_values() {
        assert_eq!(
            ScoreMode::from_args(Some(r#"{"mode": "Least"}"#.as_bytes())),
            Ok(ScoreMode::Least)
        );
        assert_eq!(
            ScoreMode::from_args(Some(r#"{"mode": "Most"}"#.as_bytes())),
            Ok(ScoreMode::Most)
        );
    }

    #[test]
    fn test_mode_rejects_other_values() {
        for mode in ["most", "LEAST", "", "Balanced", " Most"] {
            let raw = format!(r#"{{"mode": "{}"}}"#, mode);
            assert_eq!(
                ScoreMode::from_args(Some(raw.as_bytes())),
                Err(PluginError::InvalidMode(mode.to_string()))
            );
        }

        assert!(matches!(
            ScoreMode::from_args(Some("{}".as_bytes())),
            Err(PluginError::MalformedArgs(_))
        ));
        assert!(matches!(
            ScoreMode::from_args(Some("mode: Most".as_bytes())),
            Err(PluginError::MalformedArgs(_))
        ));
        assert!(matches!(
            ScoreMode::from_args(Some(r#"{"mode": 1}"#.as_bytes())),
            Err(PluginError::MalformedArgs(_))
        ));
    }

    #[test]
    fn test_mode_display_round_trips() {
        assert_eq!(ScoreMode::Most.to_string().parse(), Ok(ScoreMode::Most));
    }
}
