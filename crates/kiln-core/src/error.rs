//! Error types for kiln-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for kiln-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kiln-core.
///
/// A compiler that exits with a non-zero code is not an error; it is reported
/// through [`CompileResult`](crate::CompileResult).
#[derive(Debug, Error)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No unused argument file name could be allocated.
    #[error("cannot create temp file in {} after {attempts} attempts", dir.display())]
    TempFileExhausted { dir: PathBuf, attempts: u32 },

    /// The compiler process could not be started.
    #[error("failed to spawn {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No compiler installation could be located.
    #[error("compiler not found: {0}")]
    CompilerNotFound(String),

    /// The compiler installation manifest could not be read.
    #[error("invalid compiler manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// Change cache persistence error.
    #[error("cache error: {0}")]
    Cache(String),
}

impl Error {
    /// Render the error together with a short recovery hint for the user.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Error::TempFileExhausted { .. } => {
                Some("remove stale tscommand-*.tmp.txt files or point temp_dir elsewhere")
            }
            Error::Spawn { .. } => Some("check that the compiler launcher is installed and executable"),
            Error::CompilerNotFound(_) => {
                Some("install the compiler package in the project or make its binary available on PATH")
            }
            Error::Cache(_) => Some("run `kiln clean` to discard the change cache"),
            Error::Io(_) | Error::Manifest { .. } => None,
        };

        match hint {
            Some(hint) => format!("{}\n  hint: {}", self, hint),
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_is_appended() {
        let err = Error::CompilerNotFound("tsc".to_string());
        let rendered = err.with_hint();
        assert!(rendered.starts_with("compiler not found: tsc"));
        assert!(rendered.contains("hint:"));
    }

    #[test]
    fn test_io_has_no_hint() {
        let err = Error::Io(std::io::Error::other("boom"));
        assert_eq!(err.with_hint(), "IO error: boom");
    }
}
