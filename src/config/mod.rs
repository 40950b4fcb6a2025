//! Configuration module
//!
//! Handles finding, loading and validating configuration, with environment
//! variable overrides on top.

mod env;

pub use env::EnvConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::output::OutputFormat;
use crate::utils::LogLevel;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./test-harness.yaml",
    "./test-harness.yml",
    "./.test-harness.yaml",
    "~/.config/test-harness/config.yaml",
];

/// Harness configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Give up on a run after this many seconds; unset waits forever
    pub run_timeout_secs: Option<u64>,

    /// Buffered events per subscriber
    pub event_capacity: usize,

    /// Output format (table, json, json-pretty, csv, summary)
    pub output_format: String,

    /// Colorize table output
    pub colorize: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            run_timeout_secs: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            output_format: "table".to_string(),
            colorize: true,
        }
    }
}

impl HarnessConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location, or defaults if none exists
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if LogLevel::from_str(&self.log_level).is_none() {
            anyhow::bail!("Unknown log level: {}", self.log_level);
        }
        if OutputFormat::from_str(&self.output_format).is_none() {
            anyhow::bail!("Unknown output format: {}", self.output_format);
        }
        if self.event_capacity == 0 {
            anyhow::bail!("event_capacity must be at least 1");
        }
        if self.run_timeout_secs == Some(0) {
            anyhow::bail!("run_timeout_secs must be positive when set");
        }
        Ok(())
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_str(&self.log_level).unwrap_or(LogLevel::Info)
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_str(&self.output_format).unwrap_or(OutputFormat::Table)
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(config.run_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = HarnessConfig {
            run_timeout_secs: Some(5),
            output_format: "json".to_string(),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = HarnessConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.run_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(loaded.output_format(), OutputFormat::Json);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log_level": "debug"}"#).unwrap();

        let loaded = HarnessConfig::load(&path).unwrap();
        assert_eq!(loaded.log_level(), LogLevel::Debug);
        assert_eq!(loaded.event_capacity, DEFAULT_EVENT_CAPACITY);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_level = HarnessConfig {
            log_level: "loud".to_string(),
            ..Default::default()
        };
        assert!(bad_level.validate().is_err());

        let zero_timeout = HarnessConfig {
            run_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(HarnessConfig::load("/definitely/not/here.yaml").is_err());
    }

    #[test]
    fn test_expand_path() {
        let path = expand_path("./test.yaml");
        assert_eq!(path, PathBuf::from("./test.yaml"));
    }
}
