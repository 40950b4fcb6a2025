//! Test Harness - sandboxed test execution with message relay
//!
//! Registers named tests, runs one at a time inside a fresh [`Sandbox`],
//! relays status/log/verdict messages to observers and archives results
//! per test in memory.
//!
//! ## Example
//!
//! ```no_run
//! use test_harness::{RunOptions, TestDefinition, TestSuite};
//!
//! # async fn demo() -> Result<(), test_harness::SuiteError> {
//! let suite = TestSuite::new();
//! suite.add("Echo", TestDefinition::with_run(|sandbox| {
//!     sandbox.pass("ok");
//!     Ok(())
//! }));
//!
//! let outcome = suite.run("echo", RunOptions::new()).await?;
//! assert_eq!(outcome.and_then(|o| o.passed), Some(true));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod models;
pub mod output;
pub mod registry;
pub mod samples;
pub mod utils;

pub use error::{HookStage, SuiteError};
pub use events::{EventBus, EventSink, LogSink, SuiteEvent};
pub use executor::{BatchRunner, RunOptions, Sandbox, TestSuite};
pub use models::{Disposition, Message, RunOutcome, TestDefinition, Verdict};
pub use registry::{normalize_id, Registry, RegistryEntry};
