//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

use super::HarnessConfig;

/// Environment variable prefix
const ENV_PREFIX: &str = "TEST_HARNESS";

/// Overrides read from environment variables
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvConfig {
    /// Log level from TEST_HARNESS_LOG_LEVEL
    pub log_level: Option<String>,
    /// Run timeout in seconds from TEST_HARNESS_TIMEOUT
    pub timeout: Option<u64>,
    /// Output format from TEST_HARNESS_FORMAT
    pub format: Option<String>,
    /// Config file from TEST_HARNESS_CONFIG
    pub config_file: Option<String>,
    /// Colorized output from TEST_HARNESS_COLOR
    pub color: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            log_level: get_env("LOG_LEVEL"),
            timeout: get_env_parse("TIMEOUT"),
            format: get_env("FORMAT"),
            config_file: get_env("CONFIG"),
            color: get_env_bool("COLOR"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.log_level.is_some()
            || self.timeout.is_some()
            || self.format.is_some()
            || self.config_file.is_some()
            || self.color.is_some()
    }

    /// Apply the overrides that are set
    pub fn apply_to(&self, config: &mut HarnessConfig) {
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(timeout) = self.timeout {
            config.run_timeout_secs = Some(timeout);
        }
        if let Some(format) = &self.format {
            config.output_format = format.clone();
        }
        if let Some(color) = self.color {
            config.colorize = color;
        }
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| parse_bool(&v))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(!config.has_any());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("on"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("nope"));
    }

    #[test]
    fn test_apply_to() {
        let overrides = EnvConfig {
            log_level: Some("debug".to_string()),
            timeout: Some(9),
            color: Some(false),
            ..Default::default()
        };
        assert!(overrides.has_any());

        let mut config = HarnessConfig::default();
        overrides.apply_to(&mut config);

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.run_timeout_secs, Some(9));
        assert!(!config.colorize);
        assert_eq!(config.output_format, "table");
    }
}
