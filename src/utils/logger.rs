//! Logging setup
//!
//! Harness lifecycle lines and sandbox log lines both go through `tracing`.
//! Only this crate's targets follow the configured level; dependencies stay
//! at `warn`.

use std::fmt;
use tracing_subscriber::EnvFilter;

/// Harness verbosity, ordered from quietest to noisiest
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub fn directive(self) -> String {
        format!("warn,test_harness={}", self.as_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
pub fn init_logger(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));

    // Tests and embedding binaries may have installed one already
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!(LogLevel::from_str(" DEBUG "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("loud"), None);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_directive_scopes_crate_only() {
        assert_eq!(LogLevel::Debug.directive(), "warn,test_harness=debug");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_verbose_never_lowers_level() {
        assert_eq!(LogLevel::Trace.max(LogLevel::Debug), LogLevel::Trace);
        assert_eq!(LogLevel::Warn.max(LogLevel::Debug), LogLevel::Debug);
    }

    #[test]
    fn test_init_logger_twice() {
        init_logger(LogLevel::Warn);
        init_logger(LogLevel::Debug);
    }
}
