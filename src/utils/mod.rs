//! Utility helpers
//!
//! Logging setup.

mod logger;

pub use logger::{init_logger, LogLevel};
