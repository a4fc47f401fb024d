//! Compiler process execution.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Error, Result};

use super::toolchain::Compiler;
use super::types::ProcessOutput;

/// Runs the compiler against an argument file.
///
/// This is the only place the orchestrator suspends.
pub trait ProcessRunner {
    fn run(
        &self,
        compiler: &Compiler,
        argument_file: &Path,
    ) -> impl Future<Output = Result<ProcessOutput>> + Send;
}

/// Runs the compiler as a child process on the tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRunner;

impl ProcessRunner for TokioRunner {
    async fn run(&self, compiler: &Compiler, argument_file: &Path) -> Result<ProcessOutput> {
        let output = Command::new(&compiler.program)
            .args(compiler.leading_args())
            .arg(format!("@{}", argument_file.display()))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::Spawn {
                program: compiler.program.clone(),
                source: e,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ProcessOutput {
            // Killed by a signal
            code: output.status.code().unwrap_or(-1),
            output: text,
        })
    }
}
