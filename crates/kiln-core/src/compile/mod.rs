//! Compilation pipeline for Kiln targets.
//!
//! This module provides:
//! - File set resolution (full or incremental)
//! - Invocation building (option interaction rules)
//! - Argument files (command-length limits)
//! - Compiler location and process execution
//!
//! # Architecture
//!
//! ```text
//! TargetConfig + files
//!     │
//!     ├── FileSetResolver ──► Resolution ──► InvocationBuilder ──► Invocation
//!     │                                                              │
//!     │                                          ArgumentFile ◄──────┘
//!     │                                               │
//!     └───────────────────────── ProcessRunner ◄──────┘  (<compiler> @<argfile>)
//! ```

mod argfile;
mod invocation;
mod resolver;
mod runner;
mod toolchain;
mod types;

pub use argfile::{ArgumentFile, MAX_ATTEMPTS};
pub use invocation::{BASE_DIR_PLACEHOLDER, ConfigWarning, Invocation, InvocationBuilder};
pub use resolver::FileSetResolver;
pub use runner::{ProcessRunner, TokioRunner};
pub use toolchain::{Compiler, CompilerLocation};
pub use types::{CompileResult, NOTHING_CHANGED_OUTPUT, ProcessOutput, Resolution};
