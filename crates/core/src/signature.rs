//! Cheap per-file change signatures
//!
//! A signature is only ever compared for equality. Equal signatures mean the
//! file is *presumed* unchanged: a write that keeps both the size and the
//! modification time (at filesystem timestamp resolution) goes unnoticed in
//! [`SignatureMode::Metadata`]. [`SignatureMode::Content`] closes that gap at
//! the cost of reading every file on every capture.

use crate::hash::{hash_file, Blake3Hash};
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// How signatures are computed during a capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureMode {
    /// Size + modification time (default)
    #[default]
    Metadata,
    /// Size + BLAKE3 digest of the content
    Content,
}

/// Change signature of a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Signature {
    /// Size and modification time. `modified` is `None` on platforms that
    /// do not report it, in which case only the size is compared.
    Metadata {
        len: u64,
        modified: Option<SystemTime>,
    },
    /// Size and content digest
    Content {
        len: u64,
        hash: Blake3Hash,
    },
}

impl Signature {
    /// Compute the signature of `path` from already-fetched metadata
    ///
    /// Content mode reads the file, so it can fail with `NotFound` if the
    /// file disappeared after `metadata` was taken.
    pub fn compute(path: &Path, metadata: &Metadata, mode: SignatureMode) -> io::Result<Self> {
        let len = metadata.len();
        match mode {
            SignatureMode::Metadata => Ok(Signature::Metadata {
                len,
                modified: metadata.modified().ok(),
            }),
            SignatureMode::Content => Ok(Signature::Content {
                len,
                hash: hash_file(path)?,
            }),
        }
    }

    /// File size recorded in the signature
    pub fn len(&self) -> u64 {
        match self {
            Signature::Metadata { len, .. } | Signature::Content { len, .. } => *len,
        }
    }

    /// Whether the recorded file was empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signature::Metadata { len, modified } => {
                let secs = modified
                    .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
                    .map(|d| format!("{}.{:09}", d.as_secs(), d.subsec_nanos()))
                    .unwrap_or_else(|| "-".to_string());
                write!(f, "{} bytes, mtime {}", len, secs)
            }
            Signature::Content { len, hash } => write!(f, "{} bytes, blake3 {}", len, hash),
        }
    }
}
