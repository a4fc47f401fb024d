//! Per-target compile orchestration.
//!
//! Resolves the file set, builds the invocation, runs the compiler through
//! an argument file and commits change records after a successful run.

use std::path::PathBuf;

use crate::cache::ChangeCache;
use crate::compile::{
    ArgumentFile, CompileResult, Compiler, FileSetResolver, InvocationBuilder, ProcessRunner,
    Resolution, TokioRunner,
};
use crate::config::TargetConfig;
use crate::error::Result;

/// Prefix of argument file names.
pub const ARGUMENT_FILE_PREFIX: &str = "tscommand";

/// Stages a single compile passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolvingFiles,
    Skipped,
    BuildingInvocation,
    Running,
    Committing,
    Done,
    Failed,
}

/// Environment-dependent orchestrator settings.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Directory receiving argument files.
    pub temp_dir: PathBuf,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
        }
    }
}

/// Drives compiles for any number of targets.
///
/// Holds no per-target state between calls; everything that survives a
/// compile lives in the [`ChangeCache`]. Callers must not run two compiles
/// of the same target at once.
pub struct Orchestrator<R = TokioRunner> {
    cache: ChangeCache,
    compiler: Compiler,
    settings: OrchestratorSettings,
    runner: R,
}

impl Orchestrator<TokioRunner> {
    /// Create an orchestrator that spawns the compiler on tokio.
    pub fn new(cache: ChangeCache, compiler: Compiler, settings: OrchestratorSettings) -> Self {
        Self::with_runner(cache, compiler, settings, TokioRunner)
    }
}

impl<R: ProcessRunner> Orchestrator<R> {
    /// Create an orchestrator with a custom process runner.
    pub fn with_runner(
        cache: ChangeCache,
        compiler: Compiler,
        settings: OrchestratorSettings,
        runner: R,
    ) -> Self {
        Self {
            cache,
            compiler,
            settings,
            runner,
        }
    }

    pub fn cache(&self) -> &ChangeCache {
        &self.cache
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Compile `files` for `target`.
    ///
    /// A non-zero compiler exit is returned as a [`CompileResult`], not an
    /// error. Change records are committed only after a zero exit in fast
    /// mode. The argument file is gone by the time this returns.
    pub async fn compile(
        &self,
        target: &str,
        config: &TargetConfig,
        files: &[PathBuf],
    ) -> Result<CompileResult> {
        enter(target, Stage::ResolvingFiles);
        let compiled = match FileSetResolver::new(&self.cache).resolve(target, config, files) {
            Resolution::NothingChanged => {
                enter(target, Stage::Skipped);
                return Ok(CompileResult::skipped());
            }
            resolution => resolution.into_files(),
        };

        enter(target, Stage::BuildingInvocation);
        let invocation = InvocationBuilder::new(config).build(&compiled)?;
        let command_line = invocation.command_line();
        if config.verbose {
            tracing::info!("{}", command_line);
        } else {
            tracing::debug!("{}", command_line);
        }
        // Fingerprint before running so edits made during the compile stay pending
        let observed = config.fast.then(|| ChangeCache::observe(&compiled));
        let argument_file =
            ArgumentFile::create(&self.settings.temp_dir, ARGUMENT_FILE_PREFIX, &command_line)?;

        enter(target, Stage::Running);
        let run = self.runner.run(&self.compiler, argument_file.path()).await;
        if let Err(e) = argument_file.remove() {
            tracing::warn!("Failed to remove argument file: {}", e);
        }

        let output = match run {
            Ok(output) => output,
            Err(e) => {
                enter(target, Stage::Failed);
                return Err(e);
            }
        };

        let result = CompileResult {
            code: output.code,
            output: output.output,
            file_count: invocation.files.len(),
        };

        if !result.is_success() {
            enter(target, Stage::Failed);
            return Ok(result);
        }

        if let Some(observed) = observed {
            enter(target, Stage::Committing);
            self.cache.commit_observed(target, observed)?;
        }

        enter(target, Stage::Done);
        Ok(result)
    }
}

fn enter(target: &str, stage: Stage) {
    tracing::debug!(target_name = target, ?stage, "compile stage");
}
