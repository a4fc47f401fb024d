//! Per-target change detection.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use rayon::prelude::*;

use super::fingerprint::Fingerprint;
use super::persistence::TargetSnapshot;
use crate::error::Result;

/// File states captured at one point in time, not yet persisted.
#[derive(Debug, Clone, Default)]
pub struct Observation(Vec<(String, Option<Fingerprint>)>);

/// Persistent store of (target, file) → fingerprint at the last successful compile.
///
/// Every operation takes the target name explicitly. Records of different
/// targets live in different snapshot files and never influence each other.
#[derive(Debug, Clone)]
pub struct ChangeCache {
    cache_dir: PathBuf,
}

impl ChangeCache {
    /// Create a cache rooted at `cache_dir`. Nothing is read until queried.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Directory holding the snapshot files.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Return the files of `candidates` that changed since their last
    /// successful compile under `target`, preserving order.
    ///
    /// Files never recorded for `target`, and files that cannot be read,
    /// count as changed.
    pub fn lookup_changed(&self, target: &str, candidates: &[PathBuf]) -> Vec<PathBuf> {
        let snapshot = self.load_or_empty(target);

        candidates
            .par_iter()
            .filter(|path| {
                let recorded = snapshot.files.get(&cache_key(path));
                match (recorded, Fingerprint::of(path)) {
                    (Some(recorded), Ok(current)) => *recorded != current,
                    _ => true,
                }
            })
            .cloned()
            .collect()
    }

    /// Mark `files` as up to date for `target` and persist.
    ///
    /// Records of other files of the target are left as they are. A listed
    /// file that no longer exists loses its record.
    pub fn commit(&self, target: &str, files: &[PathBuf]) -> Result<()> {
        self.commit_observed(target, Self::observe(files))
    }

    /// Fingerprint `files` now, for a later [`commit_observed`](Self::commit_observed).
    ///
    /// Taking the fingerprints before the compiler starts keeps an edit made
    /// during the compile out of the records.
    pub fn observe(files: &[PathBuf]) -> Observation {
        Observation(
            files
                .par_iter()
                .map(|path| (cache_key(path), Fingerprint::of(path).ok()))
                .collect(),
        )
    }

    /// Persist fingerprints taken by [`observe`](Self::observe) for `target`.
    pub fn commit_observed(&self, target: &str, observed: Observation) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(target))?;
        lock.lock_exclusive()?;

        let mut snapshot = self.load_or_empty(target);

        for (key, fingerprint) in observed.0 {
            match fingerprint {
                Some(fingerprint) => {
                    snapshot.files.insert(key, fingerprint);
                }
                None => {
                    tracing::warn!("Cannot fingerprint {}, dropping its record", key);
                    snapshot.files.remove(&key);
                }
            }
        }

        snapshot.touch();
        let saved = snapshot.save(&self.snapshot_path(target));
        FileExt::unlock(&lock)?;
        saved
    }

    /// Recorded fingerprint of `path` for `target`, if any.
    pub fn recorded(&self, target: &str, path: &Path) -> Option<Fingerprint> {
        self.load_or_empty(target).files.get(&cache_key(path)).copied()
    }

    /// Forget every record of `target`.
    pub fn invalidate(&self, target: &str) -> Result<()> {
        let path = self.snapshot_path(target);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!("Invalidated change cache of target '{}'", target);
        }
        Ok(())
    }

    fn load_or_empty(&self, target: &str) -> TargetSnapshot {
        match TargetSnapshot::load(&self.snapshot_path(target)) {
            Ok(Some(snapshot)) if snapshot.target == target => snapshot,
            Ok(Some(snapshot)) => {
                tracing::warn!(
                    "Snapshot for target '{}' belongs to '{}', starting fresh",
                    target,
                    snapshot.target
                );
                TargetSnapshot::new(target)
            }
            Ok(None) => TargetSnapshot::new(target),
            Err(e) => {
                tracing::warn!("Ignoring change cache of target '{}': {}", target, e);
                TargetSnapshot::new(target)
            }
        }
    }

    fn snapshot_path(&self, target: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.bin", file_stem(target)))
    }

    fn lock_path(&self, target: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.lock", file_stem(target)))
    }
}

/// Key a path by its absolute spelling so `a.ts` and `./a.ts` share a record.
fn cache_key(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Injective mapping from a target name to a portable file stem.
fn file_stem(target: &str) -> String {
    let mut stem = String::with_capacity(target.len());
    for byte in target.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("_{:02x}", byte));
        }
    }
    stem
}
