//! Built-in sample tests
//!
//! A small suite used by the CLI to exercise the harness end to end.
//!
//! - Echo: passes immediately with `"ok"`
//! - Status Fallback: reports a status and completes without results
//! - Failing Check: logs, then fails with a reason
//! - Async Countdown: counts down on a spawned task, then passes
//! - Malformed: has no run hook and is never executed

use serde_json::{json, Value};
use std::time::Duration;

use crate::executor::TestSuite;
use crate::models::TestDefinition;

/// Countdown start for the async sample
const COUNTDOWN_FROM: u64 = 3;

/// Register every sample test on `suite`
pub fn register_all(suite: &TestSuite) {
    suite.add("Echo", echo());
    suite.add("Status Fallback", status_fallback());
    suite.add("Failing Check", failing_check());
    suite.add("Async Countdown", async_countdown(Duration::from_millis(50)));
    suite.add("Malformed", TestDefinition::new());
}

pub fn echo() -> TestDefinition {
    TestDefinition::with_run(|sandbox| {
        sandbox.pass("ok");
        Ok(())
    })
}

pub fn status_fallback() -> TestDefinition {
    TestDefinition::with_run(|sandbox| {
        sandbox.status("working");
        sandbox.done(Value::Null);
        Ok(())
    })
}

pub fn failing_check() -> TestDefinition {
    TestDefinition::with_run(|sandbox| {
        sandbox.log("comparing 2 + 2 against 5");
        sandbox.fail(json!({ "expected": 5, "actual": 4 }));
        Ok(())
    })
}

/// Needs a running tokio runtime: the body completes on a spawned task.
pub fn async_countdown(tick: Duration) -> TestDefinition {
    TestDefinition::new()
        .on_prepare(|sandbox| {
            sandbox.status(format!("counting down from {COUNTDOWN_FROM}"));
            Ok(())
        })
        .on_run(move |sandbox| {
            let sandbox = sandbox.clone();
            tokio::spawn(async move {
                for remaining in (1..=COUNTDOWN_FROM).rev() {
                    sandbox.status(format!("{remaining}..."));
                    tokio::time::sleep(tick).await;
                }
                sandbox.pass(json!({ "ticks": COUNTDOWN_FROM }));
            });
            Ok(())
        })
        .on_cleanup(|sandbox| {
            sandbox.log("countdown finished");
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{BatchRunner, RunOptions};

    #[test]
    fn test_register_all() {
        let suite = TestSuite::new();
        register_all(&suite);

        let mut names = suite.get_list();
        names.sort();
        assert_eq!(
            names,
            vec![
                "Async Countdown",
                "Echo",
                "Failing Check",
                "Malformed",
                "Status Fallback"
            ]
        );
    }

    #[tokio::test]
    async fn test_async_countdown_passes() {
        let suite = TestSuite::new();
        suite.add("Countdown", async_countdown(Duration::from_millis(1)));

        let outcome = suite.run("Countdown", RunOptions::new()).await.unwrap().unwrap();
        assert_eq!(outcome.passed, Some(true));
        assert_eq!(outcome.result, Some(json!({ "ticks": 3 })));
    }

    #[tokio::test]
    async fn test_samples_round() {
        let suite = TestSuite::new();
        register_all(&suite);

        let summary = BatchRunner::new(&suite).run_all().await.unwrap();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.skipped, vec!["Malformed"]);
    }
}
