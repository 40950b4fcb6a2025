//! Output formatters for run outcomes
//!
//! Provides table, JSON, CSV and summary output formats.

use serde_json::json;

use crate::models::{display_payload, ArchivedResult, RoundSummary, RunOutcome, Verdict};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> String {
        if self.format == OutputFormat::JsonPretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }

    /// Format a single run outcome
    pub fn format_outcome(&self, outcome: &RunOutcome) -> String {
        match self.format {
            OutputFormat::Table => self.format_outcome_table(outcome),
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(outcome),
            OutputFormat::Csv => format!("name,verdict,duration_ms,result\n{}", csv_row(outcome)),
            OutputFormat::Summary => format!(
                "{} {} ({}ms)",
                outcome.verdict().symbol(),
                outcome.name,
                outcome.duration_ms
            ),
        }
    }

    fn verdict_label(&self, verdict: Verdict) -> String {
        let plain = format!("{} {}", verdict.symbol(), verdict);
        if !self.colorize {
            return plain;
        }
        match verdict {
            Verdict::Pass => format!("\x1b[32m{plain}\x1b[0m"),
            Verdict::Fail => format!("\x1b[31m{plain}\x1b[0m"),
            Verdict::Done => format!("\x1b[33m{plain}\x1b[0m"),
        }
    }

    fn format_outcome_table(&self, outcome: &RunOutcome) -> String {
        format!(
            "{:24} {} [{:>6}ms] {}",
            outcome.name,
            self.verdict_label(outcome.verdict()),
            outcome.duration_ms,
            outcome.result_text()
        )
    }

    /// Format a round summary
    pub fn format_summary(&self, summary: &RoundSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json | OutputFormat::JsonPretty => self.to_json(summary),
            OutputFormat::Csv => {
                let mut output = String::from("name,verdict,duration_ms,result\n");
                for outcome in &summary.outcomes {
                    output.push_str(&csv_row(outcome));
                    output.push('\n');
                }
                output
            }
            OutputFormat::Summary => format!(
                "{}/{} passed ({:.1}%), {} failed, {} done, {} skipped in {}ms",
                summary.passed,
                summary.total,
                summary.pass_rate(),
                summary.failed,
                summary.done,
                summary.skipped.len(),
                summary.total_duration_ms
            ),
        }
    }

    fn format_summary_table(&self, summary: &RoundSummary) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        for outcome in &summary.outcomes {
            output.push_str(&format!("║  {}\n", self.format_outcome_table(outcome)));
        }
        for name in &summary.skipped {
            output.push_str(&format!("║  {name:24} - SKIP (no run hook)\n"));
        }
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        let pass_str = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", summary.passed)
        } else {
            summary.passed.to_string()
        };
        let fail_str = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            "║  Total: {:2} | Pass: {} | Fail: {} | Done: {:2} | Skip: {:2}\n",
            summary.total,
            pass_str,
            fail_str,
            summary.done,
            summary.skipped.len()
        ));
        output.push_str(&format!(
            "║  Pass Rate: {:5.1}% | Duration: {:6}ms\n",
            summary.pass_rate(),
            summary.total_duration_ms
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    /// Format the archived results of one test
    pub fn format_history(&self, name: &str, history: &[ArchivedResult]) -> String {
        match self.format {
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.to_json(&json!({ "name": name, "results": history }))
            }
            OutputFormat::Csv => {
                let mut output = String::from("time,results\n");
                for entry in history {
                    output.push_str(&format!(
                        "{},{}\n",
                        entry.time.to_rfc3339(),
                        csv_field(&display_payload(&entry.results))
                    ));
                }
                output
            }
            OutputFormat::Summary => format!("{name}: {} archived results", history.len()),
            OutputFormat::Table => {
                if history.is_empty() {
                    return format!("No archived results for {name}");
                }
                let mut output = format!("History for {name}\n");
                output.push_str("──────────────────────────────────────────────────────────────\n");
                for (i, entry) in history.iter().enumerate() {
                    output.push_str(&format!(
                        "  {:3}. {}  {}\n",
                        i + 1,
                        entry.time.format("%Y-%m-%d %H:%M:%S%.3f"),
                        display_payload(&entry.results)
                    ));
                }
                output
            }
        }
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_row(outcome: &RunOutcome) -> String {
    format!(
        "{},{},{},{}",
        csv_field(&outcome.name),
        outcome.verdict(),
        outcome.duration_ms,
        csv_field(&outcome.result_text())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> RunOutcome {
        RunOutcome {
            name: "Echo".to_string(),
            result: Some(json!("o\"k")),
            passed: Some(true),
            duration_ms: 3,
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("jsonpretty"), Some(OutputFormat::JsonPretty));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }

    #[test]
    fn test_table_without_color() {
        let text = ResultFormatter::new(OutputFormat::Table)
            .no_color()
            .format_outcome(&outcome());
        assert!(text.starts_with("Echo"));
        assert!(text.contains("✓ PASS"));
        assert!(!text.contains("\x1b["));
    }

    #[test]
    fn test_csv_escapes_quotes() {
        let text = ResultFormatter::new(OutputFormat::Csv).format_outcome(&outcome());
        assert!(text.ends_with("\"Echo\",PASS,3,\"o\"\"k\""));
    }

    #[test]
    fn test_json_roundtrip() {
        let text = ResultFormatter::new(OutputFormat::Json).format_outcome(&outcome());
        let parsed: RunOutcome = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, outcome());
    }

    #[test]
    fn test_summary_brief() {
        let summary = RoundSummary::new(vec![outcome()], vec!["Skipped".to_string()]);
        let text = ResultFormatter::new(OutputFormat::Summary).format_summary(&summary);
        assert!(text.starts_with("1/2 passed (50.0%)"));
    }

    #[test]
    fn test_history_table() {
        let formatter = ResultFormatter::new(OutputFormat::Table);
        assert_eq!(
            formatter.format_history("Echo", &[]),
            "No archived results for Echo"
        );

        let history = vec![ArchivedResult::now(json!("ok"))];
        let text = formatter.format_history("Echo", &history);
        assert!(text.contains("  1. "));
        assert!(text.trim_end().ends_with("ok"));
    }
}
