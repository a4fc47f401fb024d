//! Common types for the compilation pipeline.

use std::path::PathBuf;

/// Output reported when a fast build finds nothing to do.
pub const NOTHING_CHANGED_OUTPUT: &str = "No files compiled as no change detected";

/// Result of one orchestrated compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileResult {
    /// Compiler exit code, 0 on success.
    pub code: i32,

    /// Captured stdout followed by stderr.
    pub output: String,

    /// Number of files passed to the compiler.
    pub file_count: usize,
}

impl CompileResult {
    /// Result of a fast build that skipped the compiler.
    pub fn skipped() -> Self {
        Self {
            code: 0,
            output: NOTHING_CHANGED_OUTPUT.to_string(),
            file_count: 0,
        }
    }

    /// Returns true if the compiler succeeded (or was not needed).
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Returns true if no compiler was run because nothing changed.
    pub fn is_skipped(&self) -> bool {
        self.code == 0 && self.file_count == 0
    }
}

/// Raw outcome of running the compiler process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `-1` when the process was terminated by a signal.
    pub code: i32,

    /// Merged stdout and stderr.
    pub output: String,
}

/// Files chosen for a compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The whole declared file list.
    Full(Vec<PathBuf>),

    /// Only the files changed since the last successful build.
    Changed(Vec<PathBuf>),

    /// Incremental mode found no changes; the compiler must not run.
    NothingChanged,
}

impl Resolution {
    /// Files to compile, empty for [`Resolution::NothingChanged`].
    pub fn files(&self) -> &[PathBuf] {
        match self {
            Self::Full(files) | Self::Changed(files) => files,
            Self::NothingChanged => &[],
        }
    }

    /// Consume into the list of files to compile.
    pub fn into_files(self) -> Vec<PathBuf> {
        match self {
            Self::Full(files) | Self::Changed(files) => files,
            Self::NothingChanged => Vec::new(),
        }
    }
}
