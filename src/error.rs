//! Suite error types
//!
//! Unknown names and definitions without a `run` hook are not errors: `run`
//! quietly returns `Ok(None)` for them. Everything here is surfaced to the
//! immediate caller of `run` and never retried.

use std::fmt;
use thiserror::Error;

/// Lifecycle hook that raised an error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
    Prepare,
    Run,
    Cleanup,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::Prepare => write!(f, "prepare"),
            HookStage::Run => write!(f, "run"),
            HookStage::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// Errors raised by a test run
#[derive(Error, Debug)]
pub enum SuiteError {
    /// A test hook returned an error. No cleanup or archival happened.
    #[error("tests[\"{name}\"] {stage} hook failed: {source}")]
    Hook {
        name: String,
        stage: HookStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("Cannot run \"{0}\": another run is already in flight on this suite")]
    RunInProgress(String),

    #[error("tests[\"{name}\"] did not complete within {after_ms}ms")]
    TimedOut { name: String, after_ms: u64 },

    #[error("tests[\"{0}\"] sandbox closed before completion")]
    SandboxClosed(String),
}

impl SuiteError {
    pub(crate) fn hook(name: &str, stage: HookStage, source: anyhow::Error) -> Self {
        SuiteError::Hook {
            name: name.to_string(),
            stage,
            source,
        }
    }

    /// Name of the test the error belongs to
    pub fn test_name(&self) -> &str {
        match self {
            SuiteError::Hook { name, .. } | SuiteError::TimedOut { name, .. } => name,
            SuiteError::RunInProgress(name) | SuiteError::SandboxClosed(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_error_message() {
        let err = SuiteError::hook("Echo", HookStage::Prepare, anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "tests[\"Echo\"] prepare hook failed: boom");
        assert_eq!(err.test_name(), "Echo");
    }

    #[test]
    fn test_timeout_message() {
        let err = SuiteError::TimedOut {
            name: "Slow".to_string(),
            after_ms: 250,
        };
        assert!(err.to_string().contains("250ms"));
    }
}
