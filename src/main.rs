//! Test Harness CLI
//!
//! Runs the built-in sample suite through the harness.
//!
//! ## Usage
//!
//! ```bash
//! # List available tests
//! test-harness list --detailed
//!
//! # Run one test, printing every message it emits
//! test-harness run echo --messages
//!
//! # Run everything in sequence
//! test-harness run-all --format summary
//!
//! # Run a test several times and show its archive
//! test-harness history "failing check" --runs 5
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use test_harness::cli::{self, Args};
use test_harness::config::{EnvConfig, HarnessConfig};
use test_harness::events::EventBus;
use test_harness::output::{OutputFormat, ResultFormatter};
use test_harness::utils::{init_logger, LogLevel};
use test_harness::{normalize_id, samples, BatchRunner, Disposition, RunOptions, TestSuite};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let level = if args.verbose {
        config.log_level().max(LogLevel::Debug)
    } else {
        config.log_level()
    };
    init_logger(level);

    let suite = TestSuite::from_config(&config)
        .with_event_sink(Arc::new(EventBus::new(config.event_capacity)));
    samples::register_all(&suite);

    match args.command {
        cli::Command::List(list_args) => list_tests(&suite, list_args),
        cli::Command::Run(run_args) => run_test(&suite, &config, run_args).await?,
        cli::Command::RunAll(run_all_args) => run_all(&suite, &config, run_all_args).await?,
        cli::Command::History(history_args) => show_history(&suite, &config, history_args).await?,
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<HarnessConfig> {
    let env = EnvConfig::load();
    let path = args.config.clone().or_else(|| env.config_file.clone());

    let mut config = match path {
        Some(path) => HarnessConfig::load(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => HarnessConfig::load_default()?,
    };

    if env.has_any() {
        debug!("Applying environment overrides");
        env.apply_to(&mut config);
        config.validate()?;
    }

    Ok(config)
}

fn formatter(config: &HarnessConfig, format: Option<&str>) -> Result<ResultFormatter> {
    let format = match format {
        Some(f) => OutputFormat::from_str(f).ok_or_else(|| anyhow::anyhow!("Unknown format: {f}"))?,
        None => config.output_format(),
    };
    let formatter = ResultFormatter::new(format);
    Ok(if config.colorize {
        formatter
    } else {
        formatter.no_color()
    })
}

fn list_tests(suite: &TestSuite, args: cli::ListArgs) {
    let mut names = suite.get_list();
    names.sort();

    println!("\nRegistered tests ({} total)\n", names.len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for name in names {
        if args.detailed {
            let hooks = suite
                .get(&name)
                .map(|entry| format!("{:?}", entry.test))
                .unwrap_or_default();
            println!("  {:20} id={:18} {}", name, normalize_id(&name), hooks);
        } else {
            println!("  {name}");
        }
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

async fn run_test(suite: &TestSuite, config: &HarnessConfig, args: cli::RunArgs) -> Result<()> {
    let formatter = formatter(config, args.format.as_deref())?;

    let mut options = RunOptions::new();
    if args.messages {
        options = options.on_message(|message| {
            println!("  [{}] {}", message.kind(), message);
            Disposition::Suppress
        });
    }
    if let Some(secs) = args.timeout {
        options = options.timeout(Duration::from_secs(secs));
    }

    match suite.run(&args.name, options).await? {
        Some(outcome) => println!("{}", formatter.format_outcome(&outcome)),
        None => println!("No runnable test named {:?}", args.name),
    }

    Ok(())
}

async fn run_all(suite: &TestSuite, config: &HarnessConfig, args: cli::RunAllArgs) -> Result<()> {
    let formatter = formatter(config, args.format.as_deref())?;

    let mut runner = BatchRunner::new(suite);
    if let Some(timeout) = args.timeout.map(Duration::from_secs).or(config.run_timeout()) {
        runner = runner.with_timeout(timeout);
    }

    let summary = runner.run_all().await?;
    println!("{}", formatter.format_summary(&summary));

    Ok(())
}

async fn show_history(
    suite: &TestSuite,
    config: &HarnessConfig,
    args: cli::HistoryArgs,
) -> Result<()> {
    let formatter = formatter(config, args.format.as_deref())?;

    let Some(entry) = suite.get(&args.name) else {
        println!("No test named {:?}", args.name);
        return Ok(());
    };

    info!("Running {} {} times", entry.name, args.runs);
    for _ in 0..args.runs {
        if suite.run(&entry.name, RunOptions::new()).await?.is_none() {
            println!("{} has no run hook", entry.name);
            return Ok(());
        }
    }

    println!("{}", formatter.format_history(&entry.name, &suite.history(&entry.name)));
    Ok(())
}
