//! Picks the files a target must compile.

use std::path::PathBuf;

use crate::cache::ChangeCache;
use crate::config::TargetConfig;

use super::types::Resolution;

/// Decides between a full and an incremental file set.
pub struct FileSetResolver<'a> {
    cache: &'a ChangeCache,
}

impl<'a> FileSetResolver<'a> {
    pub fn new(cache: &'a ChangeCache) -> Self {
        Self { cache }
    }

    /// Resolve the file set of `target`.
    ///
    /// Combined output (`out`) always compiles the full list: the compiler
    /// needs every source to keep the merged output ordered.
    pub fn resolve(&self, target: &str, config: &TargetConfig, files: &[PathBuf]) -> Resolution {
        if !config.fast {
            return Resolution::Full(files.to_vec());
        }

        if config.is_combined_output() {
            tracing::info!(
                "Fast compile will not work when --out is specified. Ignoring fast compilation"
            );
            return Resolution::Full(files.to_vec());
        }

        let changed = self.cache.lookup_changed(target, files);
        if changed.is_empty() {
            tracing::info!("No file changes were detected. Skipping compile");
            return Resolution::NothingChanged;
        }

        for file in &changed {
            tracing::info!("### Fast Compile >> {}", file.display());
        }
        Resolution::Changed(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn write(dir: &std::path::Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        path
    }

    #[test]
    fn test_full_when_not_fast() {
        let dir = tempdir().unwrap();
        let cache = ChangeCache::new(dir.path().join("cache"));
        let files = vec![write(dir.path(), "a.ts"), write(dir.path(), "b.ts")];
        cache.commit("T", &files).unwrap();

        let config = TargetConfig::default();
        let resolution = FileSetResolver::new(&cache).resolve("T", &config, &files);

        assert_eq!(resolution, Resolution::Full(files));
    }

    #[test]
    fn test_full_with_combined_output() {
        let dir = tempdir().unwrap();
        let cache = ChangeCache::new(dir.path().join("cache"));
        let files = vec![write(dir.path(), "a.ts")];
        cache.commit("T", &files).unwrap();

        let config = TargetConfig {
            fast: true,
            out: Some(PathBuf::from("bundle.js")),
            ..Default::default()
        };
        let resolution = FileSetResolver::new(&cache).resolve("T", &config, &files);

        assert_eq!(resolution, Resolution::Full(files));
    }

    #[test]
    fn test_only_changed_files() {
        let dir = tempdir().unwrap();
        let cache = ChangeCache::new(dir.path().join("cache"));
        let a = write(dir.path(), "a.src");
        let b = write(dir.path(), "b.src");
        cache.commit("T", &[a.clone(), b.clone()]).unwrap();

        fs::OpenOptions::new()
            .write(true)
            .open(&b)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(30))
            .unwrap();

        let config = TargetConfig {
            fast: true,
            ..Default::default()
        };
        let resolution = FileSetResolver::new(&cache).resolve("T", &config, &[a, b.clone()]);

        assert_eq!(resolution, Resolution::Changed(vec![b]));
    }

    #[test]
    fn test_nothing_changed() {
        let dir = tempdir().unwrap();
        let cache = ChangeCache::new(dir.path().join("cache"));
        let files = vec![write(dir.path(), "a.ts")];
        cache.commit("T", &files).unwrap();

        let config = TargetConfig {
            fast: true,
            ..Default::default()
        };
        let resolution = FileSetResolver::new(&cache).resolve("T", &config, &files);

        assert_eq!(resolution, Resolution::NothingChanged);
    }
}
