//! Core engine for the Kiln incremental compilation orchestrator.
//!
//! This crate provides:
//! - Per-target change tracking persisted across runs
//! - Full or incremental file set resolution
//! - Compiler invocation building and argument files
//! - Compiler location and asynchronous process execution
//! - The orchestrator tying them together

pub mod cache;
pub mod compile;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod paths;

pub use cache::{ChangeCache, Fingerprint, Observation};
pub use compile::{
    ArgumentFile, CompileResult, Compiler, CompilerLocation, ConfigWarning, FileSetResolver,
    Invocation, InvocationBuilder, ProcessOutput, ProcessRunner, Resolution, TokioRunner,
};
pub use config::{CompilerOptions, TargetConfig};
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, OrchestratorSettings, Stage};
pub use paths::ProjectDirs;
