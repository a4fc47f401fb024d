//! Build command implementation for Kiln CLI.

use std::path::Path;
use std::time::Instant;

use futures::future::join_all;
use kiln_core::{CompileResult, Orchestrator, TargetConfig};

use crate::colors;
use crate::project::{Overrides, Project};

/// Execute the build command.
pub async fn execute(config: &Path, names: &[String], overrides: Overrides) -> anyhow::Result<()> {
    let project = Project::load(config)?;
    let targets = project.select(names, overrides)?;
    if targets.is_empty() {
        println!("{}No targets configured{}", colors::DIM, colors::RESET);
        return Ok(());
    }

    let orchestrator = project.orchestrator()?;
    let failed = run_targets(&orchestrator, &targets).await;
    if failed > 0 {
        anyhow::bail!("{} of {} targets failed", failed, targets.len());
    }

    Ok(())
}

/// Compile every target concurrently and print the outcomes in order.
///
/// Returns the number of targets that failed, either because the compiler
/// exited non-zero or because it could not be run at all.
pub async fn run_targets(orchestrator: &Orchestrator, targets: &[(String, TargetConfig)]) -> usize {
    let start = Instant::now();
    let runs = targets.iter().map(|(name, config)| async move {
        let result = orchestrator.compile(name, config, &config.src).await;
        (name.as_str(), result)
    });
    let results = join_all(runs).await;

    let mut failed = 0;
    for (name, result) in results {
        match result {
            Ok(result) => {
                print_result(name, &result);
                if !result.is_success() {
                    failed += 1;
                }
            }
            Err(e) => {
                eprintln!("\n{}{}:{} {}", colors::RED, name, colors::RESET, e.with_hint());
                failed += 1;
            }
        }
    }

    println!("{}", "─".repeat(50));
    println!(
        "{}Finished{} {} targets in {:.2}s",
        if failed == 0 {
            colors::GREEN
        } else {
            colors::RED
        },
        colors::RESET,
        targets.len(),
        start.elapsed().as_secs_f64()
    );

    failed
}

fn print_result(name: &str, result: &CompileResult) {
    println!("\n{}{}{}", colors::BOLD, name, colors::RESET);

    if result.is_skipped() {
        println!("{}{}{}", colors::DIM, result.output, colors::RESET);
        return;
    }

    let output = result.output.trim_end();
    if !output.is_empty() {
        println!("{}", output);
    }

    if result.is_success() {
        println!(
            "{}Compiled{} {} files",
            colors::GREEN,
            colors::RESET,
            result.file_count
        );
    } else {
        println!(
            "{}Failed{} with exit code {} ({} files)",
            colors::RED,
            colors::RESET,
            result.code,
            result.file_count
        );
    }
}
