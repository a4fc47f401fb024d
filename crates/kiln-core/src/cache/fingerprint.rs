//! File state fingerprints.

use std::fs;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use rkyv::{Archive, Deserialize, Serialize};

/// Comparable signal of a file's state at a point in time.
///
/// Two fingerprints of the same file differ whenever its modification time
/// or its length changed. Ordering is not meaningful; only equality is.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    /// Whole seconds of the modification time since the Unix epoch.
    pub modified_secs: u64,

    /// Sub-second part of the modification time.
    pub modified_nanos: u32,

    /// File length in bytes.
    pub len: u64,
}

impl Fingerprint {
    /// Read the current fingerprint of `path`.
    pub fn of(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        // Timestamps before the epoch collapse to zero
        let since_epoch = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        Ok(Self {
            modified_secs: since_epoch.as_secs(),
            modified_nanos: since_epoch.subsec_nanos(),
            len: metadata.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    #[test]
    fn test_stable_without_modification() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, "let a = 1;").unwrap();

        assert_eq!(Fingerprint::of(&file).unwrap(), Fingerprint::of(&file).unwrap());
    }

    #[test]
    fn test_changes_with_mtime() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, "let a = 1;").unwrap();
        let before = Fingerprint::of(&file).unwrap();

        let handle = fs::OpenOptions::new().write(true).open(&file).unwrap();
        handle
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        assert_ne!(before, Fingerprint::of(&file).unwrap());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(Fingerprint::of(&dir.path().join("missing.ts")).is_err());
    }
}
