//! Status command implementation for Kiln CLI.
//!
//! Reports which sources each target would recompile, without running
//! the compiler.

use std::path::Path;

use kiln_core::{ChangeCache, TargetConfig};

use crate::colors;
use crate::project::{Overrides, Project};

/// Pending work of one target.
#[derive(Debug)]
pub struct TargetStatus<'a> {
    pub name: &'a str,
    pub total: usize,
    pub changed: Vec<&'a Path>,
    /// Combined output always compiles every source.
    pub combined: bool,
}

/// Execute the status command.
pub fn execute(config: &Path, names: &[String]) -> anyhow::Result<()> {
    let project = Project::load(config)?;
    let targets = project.select(names, Overrides::default())?;
    let cache = project.cache();

    for (name, config) in &targets {
        print_status(&project.root, &collect(&cache, name, config));
    }

    Ok(())
}

/// Compare the sources of `config` against the cache records of `name`.
pub fn collect<'a>(cache: &ChangeCache, name: &'a str, config: &'a TargetConfig) -> TargetStatus<'a> {
    let changed = cache.lookup_changed(name, &config.src);
    TargetStatus {
        name,
        total: config.src.len(),
        changed: config
            .src
            .iter()
            .filter(|src| changed.contains(src))
            .map(|src| src.as_path())
            .collect(),
        combined: config.is_combined_output(),
    }
}

fn print_status(root: &Path, status: &TargetStatus<'_>) {
    let color = if status.changed.is_empty() {
        colors::GREEN
    } else {
        colors::YELLOW
    };
    println!(
        "{}{}{} {}{}/{} changed{}",
        colors::BOLD,
        status.name,
        colors::RESET,
        color,
        status.changed.len(),
        status.total,
        colors::RESET
    );
    if status.combined {
        println!(
            "  {}combined output, compiled in full{}",
            colors::DIM,
            colors::RESET
        );
    }
    for path in &status.changed {
        let shown = path.strip_prefix(root).unwrap_or(path);
        println!("  {}", shown.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_collect_reports_unrecorded_and_changed() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.ts");
        let b = temp.path().join("b.ts");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        let cache = ChangeCache::new(temp.path().join("cache"));
        let config = TargetConfig {
            src: vec![a.clone(), b.clone()],
            ..Default::default()
        };

        let status = collect(&cache, "dev", &config);
        assert_eq!(status.changed, vec![a.as_path(), b.as_path()]);
        assert!(!status.combined);

        cache.commit("dev", &[a.clone()]).unwrap();
        let status = collect(&cache, "dev", &config);
        assert_eq!(status.total, 2);
        assert_eq!(status.changed, vec![b.as_path()]);
    }

    #[test]
    fn test_collect_combined_output() {
        let temp = TempDir::new().unwrap();
        let cache = ChangeCache::new(temp.path().join("cache"));
        let config = TargetConfig {
            src: vec![PathBuf::from("missing.ts")],
            out: Some(PathBuf::from("bundle.js")),
            ..Default::default()
        };

        let status = collect(&cache, "release", &config);
        assert!(status.combined);
        assert_eq!(status.changed.len(), 1);
    }
}
