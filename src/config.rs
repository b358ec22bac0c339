//! Typed session configuration.
//!
//! Configuration is declarative and schema-driven: serde structs with
//! explicit fields, validated once at startup. Bad values are fatal
//! configuration errors, wrapped with context and never retried.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duration '{field}' must be positive, got {value}")]
    NonPositiveDuration { field: &'static str, value: f64 },

    #[error("TTL port name must not be empty when hardware output is enabled")]
    MissingPortName,
}

/// TTL marker configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    /// Serial-like port name handed to the channel opener.
    pub port_name: String,
    pub baud_rate: u32,
    /// When true, hardware-enabled events are logged but never written.
    pub test_mode: bool,
    /// Directory receiving the append-only event log.
    pub log_dir: PathBuf,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            port_name: "COM3".to_string(),
            baud_rate: 115_200,
            test_mode: false,
            log_dir: PathBuf::from("LOGS"),
        }
    }
}

/// Per-state durations, in seconds.
///
/// These mirror the tunable durations the experimenter adjusts between
/// blocks; the sequencer reads them through its duration sources.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub min_object_touch_s: f64,
    pub max_object_touch_s: f64,
    /// Search window; doubles as the watchdog max duration.
    pub select_object_s: f64,
    pub display_sample_s: f64,
    pub display_distractors_s: f64,
    pub feedback_s: f64,
    pub token_reveal_s: f64,
    pub token_update_s: f64,
    pub token_flashing_s: f64,
    pub iti_s: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_object_touch_s: 0.1,
            max_object_touch_s: 1.0,
            select_object_s: 5.0,
            display_sample_s: 1.0,
            display_distractors_s: 1.0,
            feedback_s: 1.0,
            token_reveal_s: 0.5,
            token_update_s: 0.5,
            token_flashing_s: 0.5,
            iti_s: 2.0,
        }
    }
}

impl TimingConfig {
    /// Full token feedback span: reveal + update + flashing.
    pub fn token_feedback_s(&self) -> f64 {
        self.token_reveal_s + self.token_update_s + self.token_flashing_s
    }
}

/// Top-level configuration for one experiment run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub ttl: TtlConfig,
    pub timing: TimingConfig,
}

impl SessionConfig {
    /// Parse from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate from a file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Validate field constraints. Fatal at startup on failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("min_object_touch_s", self.timing.min_object_touch_s),
            ("max_object_touch_s", self.timing.max_object_touch_s),
            ("select_object_s", self.timing.select_object_s),
            ("display_sample_s", self.timing.display_sample_s),
            ("display_distractors_s", self.timing.display_distractors_s),
            ("feedback_s", self.timing.feedback_s),
            ("token_reveal_s", self.timing.token_reveal_s),
            ("token_update_s", self.timing.token_update_s),
            ("token_flashing_s", self.timing.token_flashing_s),
            ("iti_s", self.timing.iti_s),
        ];
        for (field, value) in durations {
            if value <= 0.0 || !value.is_finite() {
                return Err(ConfigError::NonPositiveDuration { field, value });
            }
        }

        if !self.ttl.test_mode && self.ttl.port_name.is_empty() {
            return Err(ConfigError::MissingPortName);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ttl.port_name, "COM3");
        assert_eq!(config.ttl.baud_rate, 115_200);
    }

    #[test]
    fn parses_partial_json() {
        let config = SessionConfig::from_json_str(
            r#"{
                "ttl": { "test_mode": true },
                "timing": { "select_object_s": 8.0 }
            }"#,
        )
        .unwrap();

        assert!(config.ttl.test_mode);
        assert_eq!(config.timing.select_object_s, 8.0);
        // Unspecified fields keep their defaults.
        assert_eq!(config.timing.iti_s, 2.0);
    }

    #[test]
    fn rejects_non_positive_duration() {
        let result = SessionConfig::from_json_str(r#"{ "timing": { "iti_s": 0.0 } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::NonPositiveDuration { field: "iti_s", .. })
        ));
    }

    #[test]
    fn rejects_empty_port_without_test_mode() {
        let result = SessionConfig::from_json_str(r#"{ "ttl": { "port_name": "" } }"#);
        assert!(matches!(result, Err(ConfigError::MissingPortName)));
    }

    #[test]
    fn empty_port_is_fine_in_test_mode() {
        let config = SessionConfig::from_json_str(
            r#"{ "ttl": { "port_name": "", "test_mode": true } }"#,
        )
        .unwrap();
        assert!(config.ttl.test_mode);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = SessionConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn token_feedback_sums_phases() {
        let timing = TimingConfig::default();
        assert!((timing.token_feedback_s() - 1.5).abs() < f64::EPSILON);
    }
}
