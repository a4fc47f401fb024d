//! Compiler location.
//!
//! Finds the compiler installation a project should use and reports its
//! version.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Where to look for the compiler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerLocation {
    /// Package directory name under `node_modules`.
    pub package: String,

    /// Binary name under `<package>/bin`, also tried on `PATH`.
    pub bin: String,

    /// Program that runs the binary, looked up on `PATH`. `None` runs the
    /// binary directly.
    pub launcher: Option<String>,

    /// Installation root of the caller, searched after `project_root`.
    #[serde(skip)]
    pub local_root: Option<PathBuf>,

    /// Installation root of the project; preferred when it has the compiler.
    #[serde(skip)]
    pub project_root: Option<PathBuf>,
}

impl Default for CompilerLocation {
    fn default() -> Self {
        Self {
            package: "typescript".to_string(),
            bin: "tsc".to_string(),
            launcher: Some("node".to_string()),
            local_root: None,
            project_root: None,
        }
    }
}

/// A located compiler, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    /// Program to spawn.
    pub program: PathBuf,

    /// Script passed to `program` before the argument file, if any.
    pub script: Option<PathBuf>,

    /// Version read from the installation manifest.
    pub version: Option<String>,
}

#[derive(Deserialize)]
struct PackageManifest {
    version: String,
}

impl Compiler {
    /// A compiler binary spawned directly.
    pub fn from_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script: None,
            version: None,
        }
    }

    /// Locate the compiler described by `location`.
    ///
    /// The project-root installation wins over the caller-local one; when
    /// neither exists the binary is looked up on `PATH`.
    pub fn locate(location: &CompilerLocation) -> Result<Self> {
        let roots = [&location.project_root, &location.local_root];

        for root in roots.into_iter().flatten() {
            let install = root.join("node_modules").join(&location.package);
            let bin = install.join("bin").join(&location.bin);
            if !bin.exists() {
                continue;
            }

            let version = read_version(&install.join("package.json"))?;
            tracing::info!("Using {} v{}", location.bin, version);

            return Ok(match &location.launcher {
                Some(launcher) => Self {
                    program: find_on_path(launcher)?,
                    script: Some(bin),
                    version: Some(version),
                },
                None => Self {
                    program: bin,
                    script: None,
                    version: Some(version),
                },
            });
        }

        let program = find_on_path(&location.bin)?;
        tracing::info!("Using {} from PATH", program.display());
        Ok(Self::from_program(program))
    }

    /// Arguments preceding the argument-file reference.
    pub fn leading_args(&self) -> Vec<&Path> {
        self.script.iter().map(PathBuf::as_path).collect()
    }
}

fn read_version(manifest: &Path) -> Result<String> {
    let content = fs::read_to_string(manifest).map_err(|e| Error::Manifest {
        path: manifest.to_path_buf(),
        message: e.to_string(),
    })?;
    let parsed: PackageManifest = serde_json::from_str(&content).map_err(|e| Error::Manifest {
        path: manifest.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(parsed.version)
}

fn find_on_path(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::CompilerNotFound(format!("{} not found in PATH", name)))
}
