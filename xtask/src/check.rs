use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::cargo::{self, Step};

/// Zynq-7000 application cores run bare-metal ARMv7-A.
pub const DEFAULT_TARGET: &str = "armv7a-none-eabi";

pub fn run(target: &str) -> Result<()> {
    println!();
    println!("{}", "🔍 Checking VDMA driver builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // no_std builds: plain and with defmt logging
    cargo::run(&Step::fatal(
        "no_std check",
        &["check", "-p", "vdma", "--target", target, "--no-default-features"],
    ))?;
    cargo::run(&Step::fatal(
        "no_std + defmt check",
        &["check", "-p", "vdma", "--target", target, "--features", "defmt"],
    ))?;

    // Host builds
    cargo::run(&Step::fatal(
        "host std + tracing check",
        &["check", "-p", "vdma", "--features", "std,tracing"],
    ))?;

    cargo::run(&Step::advisory(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    ))?;

    if cargo::run(&Step::advisory("formatting", &["fmt", "--all", "--check"]))?.is_none() {
        eprintln!("     Run 'cargo fmt --all' to fix");
    }

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
