//! Polling directory watcher
//!
//! This crate provides the poll engine on top of `pollwatch-core` snapshots:
//! - [`Watch`]: one directory, one handler, one baseline snapshot
//! - [`WatchSet`]: caller-owned collection of independent watches
//! - [`PollLoop`]: optional fixed-interval driver feeding a channel
//! - [`IgnoreRules`]: filename filters applied during capture
//!
//! Each [`Watch::poll`] rescans the directory, reports every added, removed
//! or modified filename to the handler in ascending order, and replaces the
//! baseline. Nothing runs between polls.

pub mod ignore;
pub mod poll_loop;
pub mod set;
pub mod watch;

// Re-exports
pub use self::ignore::{IgnoreConfig, IgnoreRules};
pub use poll_loop::PollLoop;
pub use pollwatch_core::{Signature, SignatureMode, Snapshot, SnapshotDiff, SnapshotError};
pub use set::{WatchId, WatchSet};
pub use watch::{watch, EventHandler, Watch, WatchConfig, WatchError};
