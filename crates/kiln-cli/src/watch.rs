//! Watch command implementation for Kiln CLI.
//!
//! Builds the selected targets once, then rebuilds them in fast mode
//! whenever one of their source files changes.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use kiln_core::{Orchestrator, TargetConfig};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer, notify::RecursiveMode};
use tokio::sync::mpsc;

use crate::build::run_targets;
use crate::colors;
use crate::project::{Overrides, Project};

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Execute the watch command.
pub async fn execute(config: &Path, names: &[String], overrides: Overrides) -> anyhow::Result<()> {
    let project = Project::load(config)?;
    let targets = project.select(
        names,
        Overrides {
            fast: true,
            ..overrides
        },
    )?;
    if targets.is_empty() {
        anyhow::bail!("No targets to watch");
    }

    let orchestrator = project.orchestrator()?;

    println!("\n{}Kiln Watch{}", colors::BOLD, colors::RESET);
    println!("{}", "─".repeat(50));

    run_targets(&orchestrator, &targets).await;

    let mut watcher = SourceWatcher::new(&targets)?;
    print_waiting();

    loop {
        tokio::select! {
            changed = watcher.recv() => {
                let Some(first) = changed else { break };
                // One build for the whole burst
                let mut changed = BTreeSet::from([first]);
                while let Some(path) = watcher.try_recv() {
                    changed.insert(path);
                }

                println!("\n{}Changed:{}", colors::YELLOW, colors::RESET);
                for path in &changed {
                    println!("  {}{}{}", colors::CYAN, path.display(), colors::RESET);
                }

                rebuild(&orchestrator, &targets, &changed).await;
                print_waiting();
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

/// Rebuild the targets that compile any of `changed`, or every target when
/// none of them matches.
async fn rebuild(
    orchestrator: &Orchestrator,
    targets: &[(String, TargetConfig)],
    changed: &BTreeSet<PathBuf>,
) {
    let affected = affected_targets(targets, changed);
    if affected.is_empty() {
        run_targets(orchestrator, targets).await;
    } else {
        run_targets(orchestrator, &affected).await;
    }
}

/// Targets with at least one source in `changed`, in configuration order.
fn affected_targets(
    targets: &[(String, TargetConfig)],
    changed: &BTreeSet<PathBuf>,
) -> Vec<(String, TargetConfig)> {
    targets
        .iter()
        .filter(|(_, config)| {
            config
                .src
                .iter()
                .any(|src| changed.iter().any(|path| same_file(src, path)))
        })
        .cloned()
        .collect()
}

fn print_waiting() {
    println!(
        "\n{}Watching for changes... (Ctrl+C to stop){}",
        colors::DIM,
        colors::RESET
    );
}

/// Watches the source files of a set of targets.
struct SourceWatcher {
    /// Debouncer handle (kept alive to maintain watcher).
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
    rx: mpsc::UnboundedReceiver<PathBuf>,
}

impl SourceWatcher {
    fn new(targets: &[(String, TargetConfig)]) -> anyhow::Result<Self> {
        let sources: HashSet<PathBuf> = targets
            .iter()
            .flat_map(|(_, config)| config.src.iter())
            .map(|src| normalize(src))
            .collect();
        let dirs: BTreeSet<PathBuf> = sources
            .iter()
            .filter_map(|src| src.parent().map(Path::to_path_buf))
            .collect();

        let (tx, rx) = mpsc::unbounded_channel();
        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| match result {
            Ok(events) => {
                for event in events {
                    let path = normalize(&event.path);
                    if sources.contains(&path) {
                        let _ = tx.send(path);
                    }
                }
            }
            Err(e) => tracing::warn!("Watch error: {}", e),
        })
        .map_err(|e| anyhow::anyhow!("Failed to create file watcher: {}", e))?;

        for dir in &dirs {
            if !dir.is_dir() {
                tracing::warn!("Not watching missing directory {}", dir.display());
                continue;
            }
            debouncer
                .watcher()
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| anyhow::anyhow!("Failed to watch {}: {}", dir.display(), e))?;
            tracing::debug!("Watching {}", dir.display());
        }

        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    async fn recv(&mut self) -> Option<PathBuf> {
        self.rx.recv().await
    }

    fn try_recv(&mut self) -> Option<PathBuf> {
        self.rx.try_recv().ok()
    }
}

/// Canonical form of `path` when it exists, so watcher events and
/// configured sources compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn same_file(a: &Path, b: &Path) -> bool {
    normalize(a) == normalize(b)
}
