//! Pollwatch Core - directory snapshots for polling change detection
//!
//! This crate provides the snapshot store:
//! - Per-file change signatures (size + mtime, or size + BLAKE3 digest)
//! - Non-recursive directory capture
//! - Snapshot diffing into a sorted list of changed filenames

pub mod hash;
pub mod signature;
pub mod snapshot;

// Re-export main types for convenience
pub use hash::Blake3Hash;
pub use signature::{Signature, SignatureMode};
pub use snapshot::{Snapshot, SnapshotDiff, SnapshotError};
