//! Temporary argument files.
//!
//! Large file sets exceed command-line length limits, so the arguments are
//! written to a file the compiler reads via `@<path>`.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Error, Result};

/// Attempts made to find an unused file name before giving up.
pub const MAX_ATTEMPTS: u32 = 100;

/// An argument file on disk, removed when dropped.
#[derive(Debug)]
pub struct ArgumentFile {
    path: PathBuf,
    removed: bool,
}

impl ArgumentFile {
    /// Write `contents` to a fresh `<prefix>-<random>.tmp.txt` file in `dir`.
    pub fn create(dir: &Path, prefix: &str, contents: &str) -> Result<Self> {
        Self::create_with(dir, prefix, contents, random_hex)
    }

    fn create_with(
        dir: &Path,
        prefix: &str,
        contents: &str,
        mut suffix: impl FnMut() -> String,
    ) -> Result<Self> {
        for _ in 0..MAX_ATTEMPTS {
            let path = dir.join(format!("{}-{}.tmp.txt", prefix, suffix()));

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            let written = file.write_all(contents.as_bytes()).and_then(|()| file.sync_all());
            drop(file);

            // The guard owns the file even when writing failed
            let guard = Self {
                path,
                removed: false,
            };
            written?;
            return Ok(guard);
        }

        Err(Error::TempFileExhausted {
            dir: dir.to_path_buf(),
            attempts: MAX_ATTEMPTS,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now, reporting failures instead of logging them.
    pub fn remove(mut self) -> Result<()> {
        self.removed = true;
        fs::remove_file(&self.path)?;
        Ok(())
    }
}

impl Drop for ArgumentFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != ErrorKind::NotFound
        {
            tracing::warn!("Failed to remove {}: {}", self.path.display(), e);
        }
    }
}

fn random_hex() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(8);
    hex
}
