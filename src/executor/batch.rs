//! Sequential batch execution
//!
//! Runs every registered test one after another and summarizes the round.

use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::runner::{RunOptions, TestSuite};
use crate::error::SuiteError;
use crate::models::RoundSummary;

/// Runs all tests of a suite in name order
pub struct BatchRunner<'a> {
    suite: &'a TestSuite,
    timeout: Option<Duration>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(suite: &'a TestSuite) -> Self {
        Self {
            suite,
            timeout: None,
        }
    }

    /// Per-test timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run every registered test. Tests without a run hook are reported as
    /// skipped; the first run error aborts the round.
    pub async fn run_all(&self) -> Result<RoundSummary, SuiteError> {
        let mut names = self.suite.get_list();
        names.sort();

        info!("Starting round over {} tests", names.len());
        let start = Instant::now();

        let mut outcomes = Vec::new();
        let mut skipped = Vec::new();

        for name in names {
            let mut options = RunOptions::new();
            if let Some(timeout) = self.timeout {
                options = options.timeout(timeout);
            }

            match self.suite.run(&name, options).await? {
                Some(outcome) => outcomes.push(outcome),
                None => {
                    warn!("tests[{:?}] skipped: no run hook", name);
                    skipped.push(name);
                }
            }
        }

        let summary = RoundSummary::new(outcomes, skipped);

        info!(
            "Round completed in {}ms - Pass: {}/{} ({:.1}%)",
            start.elapsed().as_millis(),
            summary.passed,
            summary.total,
            summary.pass_rate()
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestDefinition;
    use serde_json::Value;

    fn suite() -> TestSuite {
        let suite = TestSuite::new();
        suite.add("b pass", TestDefinition::with_run(|s| {
            s.pass("ok");
            Ok(())
        }));
        suite.add("a fail", TestDefinition::with_run(|s| {
            s.fail("bad");
            Ok(())
        }));
        suite.add("c done", TestDefinition::with_run(|s| {
            s.done(Value::Null);
            Ok(())
        }));
        suite.add("d malformed", TestDefinition::new());
        suite
    }

    #[tokio::test]
    async fn test_run_all_summary() {
        let suite = suite();
        let summary = BatchRunner::new(&suite).run_all().await.unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.skipped, vec!["d malformed"]);

        let order: Vec<_> = summary.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(order, vec!["a fail", "b pass", "c done"]);
    }

    #[tokio::test]
    async fn test_run_all_timeout_aborts() {
        let suite = suite();
        suite.add("e hang", TestDefinition::with_run(|_| Ok(())));

        let result = BatchRunner::new(&suite)
            .with_timeout(Duration::from_millis(10))
            .run_all()
            .await;
        assert!(matches!(result, Err(SuiteError::TimedOut { .. })));
    }

    #[tokio::test]
    async fn test_empty_suite() {
        let suite = TestSuite::new();
        let summary = BatchRunner::new(&suite).run_all().await.unwrap();
        assert_eq!(summary.total, 0);
        assert!(summary.outcomes.is_empty());
    }
}
