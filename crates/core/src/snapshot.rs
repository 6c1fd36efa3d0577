//! Directory snapshots and snapshot diffing

use crate::signature::{Signature, SignatureMode};
use ahash::AHashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Errors raised while capturing a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The directory does not exist, is not a directory, or cannot be listed
    #[error("directory unavailable: {}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SnapshotError {
    fn unavailable(path: &Path, source: io::Error) -> Self {
        SnapshotError::DirectoryUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Point-in-time state of one directory: filename -> signature
///
/// Only regular files directly inside the directory are recorded. Keys are
/// bare filenames (no separators). The map itself carries no ordering; use
/// [`Snapshot::names`] for a sorted view.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: AHashMap<String, Signature>,
}

impl Snapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture every regular file directly inside `dir`
    pub fn capture(dir: &Path, mode: SignatureMode) -> Result<Self, SnapshotError> {
        Self::capture_filtered(dir, mode, |_| true)
    }

    /// Capture regular files directly inside `dir` whose name passes `keep`
    ///
    /// Fails only when `dir` itself cannot be listed. A file that vanishes or
    /// cannot be stat'ed/read between listing and signing is left out of the
    /// snapshot, which the next diff reports as a removal.
    pub fn capture_filtered<F>(dir: &Path, mode: SignatureMode, keep: F) -> Result<Self, SnapshotError>
    where
        F: Fn(&str) -> bool,
    {
        let mut snapshot = Snapshot::new();

        for result in WalkDir::new(dir).max_depth(1).follow_links(true) {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(SnapshotError::unavailable(dir, io::Error::from(err)));
                }
                Err(err) => {
                    debug!("Skipping unreadable entry in {}: {}", dir.display(), err);
                    continue;
                }
            };

            if entry.depth() == 0 {
                if !entry.file_type().is_dir() {
                    return Err(SnapshotError::unavailable(
                        dir,
                        io::Error::other("not a directory"),
                    ));
                }
                continue;
            }

            // Subdirectories are neither recorded nor descended into
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                warn!("Skipping non-UTF-8 filename in {}: {:?}", dir.display(), entry.file_name());
                continue;
            };

            if !keep(name) {
                continue;
            }

            let signature = entry
                .metadata()
                .map_err(io::Error::from)
                .and_then(|metadata| Signature::compute(entry.path(), &metadata, mode));

            match signature {
                Ok(signature) => {
                    snapshot.entries.insert(name.to_string(), signature);
                }
                Err(err) => {
                    debug!("Treating {} as absent: {}", entry.path().display(), err);
                }
            }
        }

        debug!("Captured {} files from {}", snapshot.len(), dir.display());
        Ok(snapshot)
    }

    /// Insert or replace the signature for `name`
    pub fn insert(&mut self, name: impl Into<String>, signature: Signature) -> Option<Signature> {
        self.entries.insert(name.into(), signature)
    }

    /// Look up the signature recorded for `name`
    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.entries.get(name)
    }

    /// Whether `name` is recorded
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of recorded files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no files are recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded filenames in ascending byte order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Entries in ascending filename order
    pub fn sorted_entries(&self) -> Vec<(&str, &Signature)> {
        let mut entries: Vec<(&str, &Signature)> = self
            .entries
            .iter()
            .map(|(name, sig)| (name.as_str(), sig))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Filenames whose signature differs between `self` (old) and `new`,
    /// sorted ascending
    pub fn changed_names(&self, new: &Snapshot) -> Vec<String> {
        SnapshotDiff::diff(self, new).into_changed_names()
    }
}

/// Differences between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Present only in the new snapshot
    pub added: Vec<String>,
    /// Present only in the old snapshot
    pub removed: Vec<String>,
    /// Present in both with differing signatures
    pub modified: Vec<String>,
}

impl SnapshotDiff {
    /// Compute the diff between two snapshots
    ///
    /// Each list is sorted. A name appears in at most one list.
    pub fn diff(old: &Snapshot, new: &Snapshot) -> Self {
        let mut diff = SnapshotDiff::default();

        for (name, new_sig) in &new.entries {
            match old.entries.get(name) {
                None => diff.added.push(name.clone()),
                Some(old_sig) if old_sig != new_sig => diff.modified.push(name.clone()),
                Some(_) => {}
            }
        }

        for name in old.entries.keys() {
            if !new.entries.contains_key(name) {
                diff.removed.push(name.clone());
            }
        }

        diff.added.sort_unstable();
        diff.removed.sort_unstable();
        diff.modified.sort_unstable();
        diff
    }

    /// Check if there are any changes
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Total number of changed names
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    /// Merge all three lists into one ascending list of names
    pub fn into_changed_names(self) -> Vec<String> {
        let mut names = self.added;
        names.extend(self.removed);
        names.extend(self.modified);
        names.sort_unstable();
        names
    }
}
