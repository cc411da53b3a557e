//! Checker configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Library version, stamped into audit exports.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "rx_interactions_core=info".to_string()
}

fn default_suggestion_threshold() -> f64 {
    0.85
}

fn default_max_suggestions() -> usize {
    3
}

/// Runtime settings for an interaction checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Identifier of this installation, stamped into audit exports
    #[serde(default)]
    pub system_id: Option<String>,
    /// Tracing filter directive
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Minimum Jaro-Winkler similarity for drug-name suggestions
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
    /// Maximum suggestions returned per name
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            system_id: None,
            log_filter: default_log_filter(),
            suggestion_threshold: default_suggestion_threshold(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl CheckerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.suggestion_threshold) {
            return Err(ConfigError::Invalid(format!(
                "suggestion_threshold must be within [0, 1], got {}",
                self.suggestion_threshold
            )));
        }
        if self.max_suggestions == 0 {
            return Err(ConfigError::Invalid(
                "max_suggestions must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CheckerConfig::default();
        assert_eq!(config.log_filter, "rx_interactions_core=info");
        assert_eq!(config.suggestion_threshold, 0.85);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CheckerConfig::from_json(r#"{"system_id": "pharmacy-01"}"#).unwrap();
        assert_eq!(config.system_id, Some("pharmacy-01".into()));
        assert_eq!(config.max_suggestions, 3);
    }

    #[test]
    fn test_invalid_threshold() {
        let result = CheckerConfig::from_json(r#"{"suggestion_threshold": 1.5}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_suggestions() {
        let result = CheckerConfig::from_json(r#"{"max_suggestions": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"system_id": "store-7", "log_filter": "debug"}}"#).unwrap();

        let config = CheckerConfig::load(file.path()).unwrap();
        assert_eq!(config.system_id, Some("store-7".into()));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let result = CheckerConfig::load("/nonexistent/rx-config.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
