// src/report.rs

//! Reporting over a drained result log.
//!
//! This is where exit codes are finally interpreted: the runner only records
//! them.

use std::io::{self, Write};

use crate::engine::SessionOutcome;
use crate::runner::AggregateResult;

/// Pass/fail counts over a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

pub fn summarize(results: &[AggregateResult]) -> Summary {
    let passed = results.iter().filter(|r| r.passed()).count();
    Summary {
        total: results.len(),
        passed,
        failed: results.len() - passed,
    }
}

/// Write a human-readable report.
///
/// One line per result; failing results are followed by their combined
/// stdout and stderr. Aborted and skipped tasks are listed after that.
pub fn write_report<W: Write>(
    out: &mut W,
    results: &[AggregateResult],
    outcome: &SessionOutcome,
) -> io::Result<Summary> {
    let summary = summarize(results);

    for result in results {
        if result.passed() {
            writeln!(out, "PASS  {}", result.name)?;
        } else {
            writeln!(out, "FAIL  {} (return code {})", result.name, result.return_code)?;
            write_indented(out, "stdout", &result.stdout)?;
            write_indented(out, "stderr", &result.stderr)?;
        }
    }

    for failure in &outcome.failed {
        writeln!(out, "ERROR {}: {}", failure.task, failure.error)?;
    }

    if !outcome.skipped.is_empty() {
        writeln!(out, "skipped (up to date): {}", outcome.skipped.join(", "))?;
    }

    writeln!(
        out,
        "{} run, {} passed, {} failed, {} skipped, {} errors{}",
        summary.total,
        summary.passed,
        summary.failed,
        outcome.skipped.len(),
        outcome.failed.len(),
        if outcome.interrupted { " (interrupted)" } else { "" }
    )?;

    Ok(summary)
}

fn write_indented<W: Write>(out: &mut W, label: &str, text: &str) -> io::Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    writeln!(out, "  --- {label} ---")?;
    for line in text.lines() {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}
