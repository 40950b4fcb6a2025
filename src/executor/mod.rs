//! Test execution engine
//!
//! Provides the per-run sandbox, the single-run lifecycle and sequential
//! batch execution.

mod batch;
mod runner;
mod sandbox;

pub use batch::BatchRunner;
pub use runner::{FinishCallback, RunOptions, TestSuite};
pub use sandbox::{MessageHandler, Sandbox, VerdictHook};
