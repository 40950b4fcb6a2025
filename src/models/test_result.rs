//! Run outcome models
//!
//! Defines verdicts, per-run outcomes, archived results and round summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::message::display_payload;

/// How a completed run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The test called `pass`
    Pass,
    /// The test called `fail`
    Fail,
    /// The test called `done` without a verdict
    Done,
}

impl Verdict {
    pub fn from_passed(passed: Option<bool>) -> Self {
        match passed {
            Some(true) => Verdict::Pass,
            Some(false) => Verdict::Fail,
            None => Verdict::Done,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Verdict::Pass => "✓",
            Verdict::Fail => "✗",
            Verdict::Done => "○",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
            Verdict::Done => write!(f, "DONE"),
        }
    }
}

/// Result of one completed run, as delivered to the `on_finish` callback
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Display name of the test
    pub name: String,
    /// Final result: explicit results, else sandbox results, else last status
    pub result: Option<Value>,
    /// `Some(true)` after `pass`, `Some(false)` after `fail`, `None` otherwise
    pub passed: Option<bool>,
    pub duration_ms: u64,
}

impl RunOutcome {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_passed(self.passed)
    }

    /// Final result rendered for display
    pub fn result_text(&self) -> String {
        self.result
            .as_ref()
            .map(display_payload)
            .unwrap_or_default()
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = self.verdict();
        write!(
            f,
            "{} {} {} [{}ms]",
            verdict.symbol(),
            self.name,
            verdict,
            self.duration_ms
        )?;
        if self.result.is_some() {
            write!(f, " - {}", self.result_text())?;
        }
        Ok(())
    }
}

/// One archived entry in a test's history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchivedResult {
    pub time: DateTime<Utc>,
    pub results: Value,
}

impl ArchivedResult {
    pub fn now(results: Value) -> Self {
        Self {
            time: Utc::now(),
            results,
        }
    }
}

/// Summary of a sequential pass over every registered test
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Completed without calling `pass` or `fail`
    pub done: usize,
    /// Registered but not runnable
    pub skipped: Vec<String>,
    pub total_duration_ms: u64,
    pub outcomes: Vec<RunOutcome>,
}

impl RoundSummary {
    pub fn new(outcomes: Vec<RunOutcome>, skipped: Vec<String>) -> Self {
        let count = |verdict: Verdict| outcomes.iter().filter(|o| o.verdict() == verdict).count();
        let passed = count(Verdict::Pass);
        let failed = count(Verdict::Fail);
        let done = count(Verdict::Done);
        let total_duration_ms = outcomes.iter().map(|o| o.duration_ms).sum();

        Self {
            total: outcomes.len() + skipped.len(),
            passed,
            failed,
            done,
            skipped,
            total_duration_ms,
            outcomes,
        }
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for outcome in &self.outcomes {
            writeln!(f, "  {outcome}")?;
        }
        for name in &self.skipped {
            writeln!(f, "  - {name} SKIP (no run hook)")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Done: {} | Skip: {}",
            self.total,
            self.passed,
            self.failed,
            self.done,
            self.skipped.len()
        )?;
        writeln!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}
