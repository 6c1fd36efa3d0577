//! Caller-owned collection of independent watches

use crate::watch::{EventHandler, Watch, WatchConfig, WatchError};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

/// Identifies a watch within a [`WatchSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "watch#{}", self.0)
    }
}

/// A set of watches polled together
///
/// Watches share no state; the same directory may be watched more than
/// once, each with its own baseline. Ids are never reused.
#[derive(Debug)]
pub struct WatchSet<H> {
    watches: BTreeMap<WatchId, Watch<H>>,
    next_id: u64,
}

impl<H> Default for WatchSet<H> {
    fn default() -> Self {
        Self {
            watches: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<H: EventHandler> WatchSet<H> {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a watch with the default configuration and add it
    pub fn add(&mut self, directory: impl Into<PathBuf>, handler: H) -> Result<WatchId, WatchError> {
        Ok(self.insert(Watch::new(directory, handler)?))
    }

    /// Create a watch with `config` and add it
    pub fn add_with_config(
        &mut self,
        directory: impl Into<PathBuf>,
        config: WatchConfig,
        handler: H,
    ) -> Result<WatchId, WatchError> {
        Ok(self.insert(Watch::with_config(directory, config, handler)?))
    }

    /// Add an existing watch
    pub fn insert(&mut self, watch: Watch<H>) -> WatchId {
        let id = WatchId(self.next_id);
        self.next_id += 1;
        self.watches.insert(id, watch);
        id
    }

    /// Remove a watch, handing it back to the caller
    pub fn remove(&mut self, id: WatchId) -> Option<Watch<H>> {
        self.watches.remove(&id)
    }

    /// Get a watch
    pub fn get(&self, id: WatchId) -> Option<&Watch<H>> {
        self.watches.get(&id)
    }

    /// Get a watch mutably
    pub fn get_mut(&mut self, id: WatchId) -> Option<&mut Watch<H>> {
        self.watches.get_mut(&id)
    }

    /// Number of watches
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = WatchId> + '_ {
        self.watches.keys().copied()
    }

    /// Poll every watch once, in insertion order
    ///
    /// A failing watch does not stop the others. Failures are returned
    /// with the id of the watch that raised them.
    pub fn poll_all(&mut self) -> Vec<(WatchId, WatchError)> {
        let mut failures = Vec::new();
        for (id, watch) in self.watches.iter_mut() {
            if let Err(err) = watch.poll() {
                warn!("Poll of {} ({}) failed: {}", id, watch.directory().display(), err);
                failures.push((*id, err));
            }
        }
        failures
    }
}
