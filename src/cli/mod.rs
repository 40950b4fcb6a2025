//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Sandboxed test-execution harness
#[derive(Parser, Debug)]
#[command(name = "test-harness")]
#[command(version)]
#[command(about = "Run registered tests in isolated sandboxes and inspect their results")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered tests
    List(ListArgs),

    /// Run a single test
    Run(RunArgs),

    /// Run every registered test in sequence
    RunAll(RunAllArgs),

    /// Run a test repeatedly and show its archived results
    History(HistoryArgs),
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show normalized ids and hooks
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Test name (case and punctuation are ignored)
    pub name: String,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print every message the test emits
    #[arg(short, long)]
    pub messages: bool,
}

/// Arguments for run-all command
#[derive(Parser, Debug)]
pub struct RunAllArgs {
    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Per-test timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for history command
#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Test name
    pub name: String,

    /// Number of runs before showing history
    #[arg(short, long, default_value = "3")]
    pub runs: u32,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let args = Args::parse_from(["test-harness", "run", "Echo", "--timeout", "5", "-m"]);
        match args.command {
            Command::Run(run) => {
                assert_eq!(run.name, "Echo");
                assert_eq!(run.timeout, Some(5));
                assert!(run.messages);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_history_defaults() {
        let args = Args::parse_from(["test-harness", "-v", "history", "echo"]);
        assert!(args.verbose);
        match args.command {
            Command::History(history) => assert_eq!(history.runs, 3),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_all() {
        let args = Args::parse_from(["test-harness", "run-all", "--format", "csv"]);
        assert!(matches!(
            args.command,
            Command::RunAll(RunAllArgs { format: Some(ref f), .. }) if f == "csv"
        ));
    }
}
