//! Clean command implementation for Kiln CLI.

use std::path::Path;

use crate::colors;
use crate::project::{Overrides, Project};

/// Execute the clean command.
///
/// With no target names every snapshot is removed, including those of
/// targets no longer in the project file.
pub fn execute(config: &Path, names: &[String]) -> anyhow::Result<()> {
    let project = Project::load(config)?;

    if names.is_empty() {
        project.dirs.clean()?;
        println!(
            "{}Cleaned{} {}",
            colors::GREEN,
            colors::RESET,
            project.dirs.cache_dir.display()
        );
        return Ok(());
    }

    let cache = project.cache();
    for (name, _) in project.select(names, Overrides::default())? {
        cache.invalidate(&name)?;
        println!("{}Cleaned{} {}", colors::GREEN, colors::RESET, name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_clean_single_target() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.ts");
        fs::write(&source, "").unwrap();
        let config = temp.path().join("kiln.json");
        fs::write(
            &config,
            r#"{ "targets": { "dev": { "src": ["a.ts"] }, "test": { "src": ["a.ts"] } } }"#,
        )
        .unwrap();

        let project = Project::load(&config).unwrap();
        let cache = project.cache();
        cache.commit("dev", &[source.clone()]).unwrap();
        cache.commit("test", &[source.clone()]).unwrap();

        execute(&config, &["dev".to_string()]).unwrap();

        assert!(cache.recorded("dev", &source).is_none());
        assert!(cache.recorded("test", &source).is_some());

        execute(&config, &[]).unwrap();
        assert!(cache.recorded("test", &source).is_none());
    }
}
