//! Change tracking for incremental compilation.
//!
//! This module provides:
//! - File fingerprints (modification time + length)
//! - Per-target rkyv snapshots with atomic writes
//! - The [`ChangeCache`] used to pick the files that need recompiling
//!
//! # Layout
//!
//! ```text
//! .kiln/cache/
//! ├── dev.bin       # Snapshot of target "dev"
//! ├── dev.lock      # Commit lock of target "dev"
//! └── release.bin
//! ```

mod change_cache;
mod fingerprint;
mod persistence;

pub use change_cache::{ChangeCache, Observation};
pub use fingerprint::Fingerprint;
pub use persistence::{SNAPSHOT_VERSION, TargetSnapshot};
