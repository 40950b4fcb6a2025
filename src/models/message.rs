//! Sandbox message protocol
//!
//! Typed messages passed from a running test to the suite, and the
//! disposition a caller-supplied handler returns for each of them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A message emitted by a sandbox during a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "lowercase")]
pub enum Message {
    /// Progress status; the latest one is the fallback final result
    Status(Value),
    /// Free-form log line
    Log(String),
    /// Verdict: `true` from `pass`, `false` from `fail`
    Result(bool),
}

impl Message {
    /// Wire name of the message type, also used as the forwarded event name
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Status(_) => "status",
            Message::Log(_) => "log",
            Message::Result(_) => "result",
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Status(value) => write!(f, "{}", display_payload(value)),
            Message::Log(line) => write!(f, "{line}"),
            Message::Result(passed) => write!(f, "{passed}"),
        }
    }
}

/// What the suite should do with a message after the caller's handler saw it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Disposition {
    /// Emit the default log line and forward the message as a suite event
    #[default]
    Forward,
    /// Neither log nor forward this message
    Suppress,
}

/// Whether a payload counts as present.
///
/// `null`, `false`, `0` and `""` are empty; anything else, including empty
/// arrays and objects, is not.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a payload for log lines: strings unquoted, everything else as JSON
pub fn display_payload(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
