//! The poll engine: a directory, a handler and the last known snapshot

use crate::ignore::{IgnoreConfig, IgnoreRules};
use pollwatch_core::{SignatureMode, Snapshot, SnapshotDiff, SnapshotError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by watch creation and polling
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watched directory could not be listed
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The handler failed; names after `filename` were not delivered
    #[error("event handler failed for {filename}")]
    Handler {
        filename: String,
        #[source]
        source: anyhow::Error,
    },

    /// Ignore rules could not be compiled
    #[error("invalid ignore rules: {0}")]
    Ignore(#[from] ::ignore::Error),
}

/// Receives changed filenames during a poll
///
/// Implemented for `FnMut(&str) -> anyhow::Result<()>` closures, and for
/// `Vec<String>`, which simply collects names.
pub trait EventHandler {
    /// Handle one changed filename
    fn handle_event(&mut self, filename: &str) -> anyhow::Result<()>;
}

impl<F> EventHandler for F
where
    F: FnMut(&str) -> anyhow::Result<()>,
{
    fn handle_event(&mut self, filename: &str) -> anyhow::Result<()> {
        (self)(filename)
    }
}

impl EventHandler for Vec<String> {
    fn handle_event(&mut self, filename: &str) -> anyhow::Result<()> {
        self.push(filename.to_string());
        Ok(())
    }
}

/// Per-watch configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// How file signatures are computed (default: metadata)
    #[serde(default)]
    pub signature: SignatureMode,

    /// Filenames left out of snapshots
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// A watched directory
///
/// Holds the snapshot taken at creation or at the end of the last poll.
/// Polling needs `&mut self`, so a watch is never polled concurrently
/// with itself; share it across threads only behind a lock.
#[derive(Debug)]
pub struct Watch<H> {
    directory: PathBuf,
    handler: H,
    snapshot: Snapshot,
    mode: SignatureMode,
    ignore: IgnoreRules,
}

/// Start watching `directory`, using the default configuration
pub fn watch<H: EventHandler>(directory: impl Into<PathBuf>, handler: H) -> Result<Watch<H>, WatchError> {
    Watch::new(directory, handler)
}

impl<H: EventHandler> Watch<H> {
    /// Start watching `directory` with the default configuration
    ///
    /// Takes the baseline snapshot immediately. Files already present are
    /// not reported unless they later change or disappear. The handler is
    /// not called.
    pub fn new(directory: impl Into<PathBuf>, handler: H) -> Result<Self, WatchError> {
        Self::with_config(directory, WatchConfig::default(), handler)
    }

    /// Start watching `directory` with `config`
    pub fn with_config(
        directory: impl Into<PathBuf>,
        config: WatchConfig,
        handler: H,
    ) -> Result<Self, WatchError> {
        let directory = directory.into();
        let ignore = IgnoreRules::load(&directory, config.ignore)?;
        let snapshot = capture(&directory, config.signature, &ignore)?;

        info!(
            "Watching {} ({} files, {:?} signatures, {} ignore sources)",
            directory.display(),
            snapshot.len(),
            config.signature,
            ignore.active_sources()
        );

        Ok(Self {
            directory,
            handler,
            snapshot,
            mode: config.signature,
            ignore,
        })
    }

    /// Run one scan-compare-replace-dispatch cycle
    ///
    /// Every filename added, removed or modified since the previous snapshot
    /// is passed to the handler once, in ascending byte order, before this
    /// returns.
    ///
    /// If the scan fails the stored snapshot is kept. Otherwise it is
    /// replaced by the fresh one even if the handler fails part way, so
    /// names after the failing one are not redelivered on the next poll.
    pub fn poll(&mut self) -> Result<(), WatchError> {
        let fresh = capture(&self.directory, self.mode, &self.ignore)?;
        let diff = SnapshotDiff::diff(&self.snapshot, &fresh);
        self.snapshot = fresh;

        if diff.is_empty() {
            debug!("No changes in {}", self.directory.display());
            return Ok(());
        }

        debug!(
            "Changes in {}: {} added, {} removed, {} modified",
            self.directory.display(),
            diff.added.len(),
            diff.removed.len(),
            diff.modified.len()
        );

        for filename in diff.into_changed_names() {
            if let Err(source) = self.handler.handle_event(&filename) {
                return Err(WatchError::Handler { filename, source });
            }
        }

        Ok(())
    }
}

impl<H> Watch<H> {
    /// Watched directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Snapshot the next poll compares against
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Signature mode used for captures
    pub fn signature_mode(&self) -> SignatureMode {
        self.mode
    }

    /// Get the handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Get the handler mutably
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the watch, returning its handler
    pub fn into_handler(self) -> H {
        self.handler
    }
}

fn capture(directory: &Path, mode: SignatureMode, ignore: &IgnoreRules) -> Result<Snapshot, SnapshotError> {
    Snapshot::capture_filtered(directory, mode, |name| !ignore.should_ignore(name))
}
