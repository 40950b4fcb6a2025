//! Output formatting module
//!
//! Provides various output formats for run outcomes and history.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
