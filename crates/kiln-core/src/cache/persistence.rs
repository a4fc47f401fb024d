//! On-disk snapshots of a target's change records, encoded with rkyv.
//!
//! Each target owns one snapshot file, so targets never contend for the
//! same bytes on disk.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rkyv::util::AlignedVec;
use rkyv::{rancor, Archive, Deserialize, Serialize};

use super::fingerprint::Fingerprint;
use crate::error::{Error, Result};

/// Current snapshot format version.
///
/// Increment this when the snapshot format changes in an incompatible way.
/// Snapshots with a different version are discarded and rebuilt.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Change records of one target.
#[derive(Archive, Serialize, Deserialize, Debug, Clone)]
pub struct TargetSnapshot {
    /// Snapshot format version for compatibility checking.
    pub version: u32,

    /// Target the records belong to.
    pub target: String,

    /// Fingerprint at the last successful compile, keyed by absolute path.
    pub files: HashMap<String, Fingerprint>,

    /// Unix timestamp of the last commit.
    pub updated_at: u64,
}

impl TargetSnapshot {
    /// Create an empty snapshot for `target`.
    pub fn new(target: &str) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            target: target.to_string(),
            files: HashMap::new(),
            updated_at: 0,
        }
    }

    /// Stamp the snapshot with the current time.
    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
    }

    /// Save the snapshot to `path`.
    ///
    /// Creates parent directories if they don't exist. Writes to a temp file
    /// first and renames it into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes =
            rkyv::to_bytes::<rancor::Error>(self).map_err(|e| Error::Cache(e.to_string()))?;

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        tracing::debug!(
            "Saved snapshot for target '{}': {} files, {} bytes",
            self.target,
            self.files.len(),
            bytes.len()
        );

        Ok(())
    }

    /// Load a snapshot from `path`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist and `Err` if it exists
    /// but is invalid or was written by another format version.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let mut bytes = AlignedVec::<16>::new();
        bytes.extend_from_slice(&fs::read(path)?);

        let archived = rkyv::access::<ArchivedTargetSnapshot, rancor::Error>(&bytes)
            .map_err(|e| Error::Cache(e.to_string()))?;

        let found_version: u32 = archived.version.into();
        if found_version != SNAPSHOT_VERSION {
            return Err(Error::Cache(format!(
                "snapshot version mismatch: expected {}, found {}",
                SNAPSHOT_VERSION, found_version
            )));
        }

        let snapshot = rkyv::deserialize::<TargetSnapshot, rancor::Error>(archived)
            .map_err(|e| Error::Cache(e.to_string()))?;

        Ok(Some(snapshot))
    }
}
