//! Data models for the test harness
//!
//! This module contains the data structures shared by the registry, the
//! executor and the output layer.

mod definition;
mod message;
mod test_result;

pub use definition::{Hook, TestDefinition};
pub use message::{display_payload, is_present, Disposition, Message};
pub use test_result::{ArchivedResult, RoundSummary, RunOutcome, Verdict};
