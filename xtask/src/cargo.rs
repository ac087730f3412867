//! Running cargo sub-commands with uniform progress output.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output};
use std::time::Instant;

/// What a failing step does to the overall task.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the task
    Fatal,
    /// Report and carry on
    Advisory,
}

/// One cargo invocation.
pub struct Step<'a> {
    pub label: &'a str,
    pub args: &'a [&'a str],
    pub severity: Severity,
}

impl<'a> Step<'a> {
    pub const fn fatal(label: &'a str, args: &'a [&'a str]) -> Self {
        Self {
            label,
            args,
            severity: Severity::Fatal,
        }
    }

    pub const fn advisory(label: &'a str, args: &'a [&'a str]) -> Self {
        Self {
            label,
            args,
            severity: Severity::Advisory,
        }
    }
}

/// Run `step`, print its outcome and return the captured output on success.
///
/// Fatal failures bail; advisory failures return `Ok(None)`.
pub fn run(step: &Step<'_>) -> Result<Option<Output>> {
    println!("{}", format!("  {}...", step.label).cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(step.args)
        .output()
        .with_context(|| format!("Failed to run {}", step.label))?;

    if output.status.success() {
        println!(
            "{}",
            format!(
                "  ✓ {} passed in {:.2}s",
                step.label,
                start.elapsed().as_secs_f64()
            )
            .green()
        );
        println!();
        return Ok(Some(output));
    }

    match step.severity {
        Severity::Fatal => {
            eprintln!("{}", format!("  ✗ {} failed", step.label).red().bold());
            eprintln!();
            print_indented(&output.stdout);
            print_indented(&output.stderr);
            anyhow::bail!("{} failed", step.label);
        }
        Severity::Advisory => {
            eprintln!("{}", format!("  ⚠ {} reported issues", step.label).yellow().bold());
            print_indented(&output.stderr);
            println!();
            Ok(None)
        }
    }
}

fn print_indented(bytes: &[u8]) {
    for line in String::from_utf8_lossy(bytes).lines() {
        eprintln!("  {line}");
    }
}

/// Extract the summary of the first "test result:" line of `output`.
pub fn test_summary(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find_map(|line| line.split("test result:").nth(1))
        .map_or_else(
            || "(summary not available)".to_string(),
            |summary| summary.trim().to_string(),
        )
}
