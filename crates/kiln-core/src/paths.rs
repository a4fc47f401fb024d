//! Project directory management.
//!
//! Provides the directory layout Kiln uses next to a project file,
//! so the CLI and the orchestrator agree on where state lives.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Directory structure for a Kiln project.
///
/// All Kiln-owned files are stored under a `.kiln` directory
/// next to the project file:
///
/// ```text
/// kiln.json
/// .kiln/
/// └── cache/      # Per-target change cache snapshots
/// ```
#[derive(Debug, Clone)]
pub struct ProjectDirs {
    /// The `.kiln` directory itself.
    pub kiln_dir: PathBuf,

    /// Cache directory for change-tracking snapshots.
    pub cache_dir: PathBuf,
}

impl ProjectDirs {
    /// Create directory structure from the project's root directory.
    ///
    /// Creates all necessary directories if they don't exist.
    pub fn from_project_dir(project_dir: &Path) -> Result<Self> {
        let kiln_dir = project_dir.join(".kiln");
        Self::with_cache_dir(kiln_dir.clone(), kiln_dir.join("cache"))
    }

    /// Create directory structure with an explicitly configured cache directory.
    pub fn with_cache_dir(kiln_dir: PathBuf, cache_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&cache_dir)?;
        Ok(Self {
            kiln_dir,
            cache_dir,
        })
    }

    /// Remove every cache snapshot and recreate the empty directory.
    pub fn clean(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
        }
        fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }
}
