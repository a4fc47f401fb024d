//! Turns a target configuration and a file set into compiler arguments.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::TargetConfig;
use crate::error::Result;

/// Name of the placeholder source kept inside `baseDir`.
pub const BASE_DIR_PLACEHOLDER: &str = "ignoreBaseDirFile.ts";

const PLACEHOLDER_CONTENTS: &str =
    "// Ignore this file. It keeps the directory structure under outDir rooted at baseDir.\n";

/// Non-fatal configuration conflict found while building an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Both `out` and `outDir` are set; both flags are passed on.
    OutAndOutDir,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::OutAndOutDir => {
                write!(f, "Option \"out\" and \"outDir\" should not be used together")
            }
        }
    }
}

/// A fully assembled compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Ordered arguments, file paths first and quoted.
    pub args: Vec<String>,

    /// Absolute paths of the files the arguments reference.
    pub files: Vec<PathBuf>,

    /// Conflicts detected in the configuration.
    pub warnings: Vec<ConfigWarning>,
}

impl Invocation {
    /// Space-joined arguments, as written to the argument file.
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// Builds [`Invocation`]s for one target configuration.
pub struct InvocationBuilder<'a> {
    config: &'a TargetConfig,
}

impl<'a> InvocationBuilder<'a> {
    pub fn new(config: &'a TargetConfig) -> Self {
        Self { config }
    }

    /// Assemble the invocation for `files`.
    ///
    /// May create the `baseDir` placeholder on disk; everything else is pure.
    pub fn build(&self, files: &[PathBuf]) -> Result<Invocation> {
        let config = self.config;
        let mut files = files.to_vec();

        if let (Some(_), Some(base_dir)) = (&config.out_dir, &config.base_dir)
            && !files.is_empty()
        {
            files.push(ensure_placeholder(base_dir)?);
        }

        // The reference manifest already lists every source in compile order
        if let (Some(reference), Some(_)) = (&config.reference, &config.out) {
            files = vec![reference.clone()];
        }

        let files = files
            .iter()
            .map(|file| absolute(file))
            .collect::<Result<Vec<_>>>()?;

        let mut args: Vec<String> = files
            .iter()
            .map(|file| format!("\"{}\"", file.display()))
            .collect();

        let options = &config.options;
        let flags = [
            (options.source_map, "--sourcemap"),
            (options.declaration, "--declaration"),
            (options.remove_comments, "--removeComments"),
            (options.no_implicit_any, "--noImplicitAny"),
            (options.no_resolve, "--noResolve"),
        ];
        args.extend(
            flags
                .iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, flag)| flag.to_string()),
        );

        if !options.target.is_empty() {
            push_pair(&mut args, "--target", options.target.to_uppercase());
        }
        if !options.module.is_empty() {
            push_pair(&mut args, "--module", options.module.to_lowercase());
        }

        let mut warnings = Vec::new();
        if let Some(out) = &config.out {
            push_pair(&mut args, "--out", out.display().to_string());
        }
        if let Some(out_dir) = &config.out_dir {
            if config.out.is_some() {
                let warning = ConfigWarning::OutAndOutDir;
                tracing::warn!("WARNING: {}", warning);
                warnings.push(warning);
            }
            push_pair(&mut args, "--outDir", out_dir.display().to_string());
        }

        if let Some(source_root) = &options.source_root {
            push_pair(&mut args, "--sourceRoot", source_root.clone());
        }
        if let Some(map_root) = &options.map_root {
            push_pair(&mut args, "--mapRoot", map_root.clone());
        }

        Ok(Invocation {
            args,
            files,
            warnings,
        })
    }
}

fn push_pair(args: &mut Vec<String>, name: &str, value: String) {
    args.push(name.to_string());
    args.push(value);
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

/// Create the placeholder inside `base_dir` unless it already exists.
fn ensure_placeholder(base_dir: &Path) -> Result<PathBuf> {
    let path = base_dir.join(BASE_DIR_PLACEHOLDER);
    if path.exists() {
        return Ok(path);
    }

    fs::create_dir_all(base_dir)?;
    match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            file.write_all(PLACEHOLDER_CONTENTS.as_bytes())?;
            tracing::debug!("Created base directory placeholder {}", path.display());
        }
        // Another target created it first
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => return Err(e.into()),
    }
    Ok(path)
}
