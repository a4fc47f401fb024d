//! Kiln CLI - Incremental compilation orchestrator.

mod build;
mod clean;
mod colors;
mod project;
mod status;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::project::Overrides;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Incremental compilation orchestrator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the project file
    #[arg(short, long, global = true, default_value = "kiln.json")]
    config: PathBuf,

    /// Enable verbose logging and echo compiler invocations
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile targets (all when none are named)
    Build {
        /// Targets to compile
        targets: Vec<String>,

        /// Only recompile files changed since the last successful build
        #[arg(long)]
        fast: bool,
    },

    /// Compile targets, then recompile changed files on every save
    Watch {
        /// Targets to watch
        targets: Vec<String>,
    },

    /// List the files each target would recompile
    Status {
        /// Targets to inspect
        targets: Vec<String>,
    },

    /// Drop the change cache of targets
    Clean {
        /// Targets to clean
        targets: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Helper to format kiln-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(kiln_err) = err.downcast_ref::<kiln_core::Error>() {
            anyhow::anyhow!("{}", kiln_err.with_hint())
        } else {
            err
        }
    };

    let overrides = |fast: bool| Overrides {
        fast,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Build { targets, fast } => {
            build::execute(&cli.config, &targets, overrides(fast))
                .await
                .map_err(format_error)?;
        }

        Commands::Watch { targets } => {
            watch::execute(&cli.config, &targets, overrides(true))
                .await
                .map_err(format_error)?;
        }

        Commands::Status { targets } => {
            status::execute(&cli.config, &targets).map_err(format_error)?;
        }

        Commands::Clean { targets } => {
            clean::execute(&cli.config, &targets).map_err(format_error)?;
        }
    }

    Ok(())
}
