//! Print a one-off snapshot of a directory

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pollwatch::{Signature, SignatureMode, Snapshot};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ScanEntry<'a> {
    name: &'a str,
    signature: &'a Signature,
}

pub fn run(dir: &Path, content: bool, json: bool) -> Result<()> {
    let mode = if content {
        SignatureMode::Content
    } else {
        SignatureMode::Metadata
    };

    let snapshot = Snapshot::capture(dir, mode)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    if json {
        let entries: Vec<ScanEntry> = snapshot
            .sorted_entries()
            .into_iter()
            .map(|(name, signature)| ScanEntry { name, signature })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let width = snapshot.names().iter().map(|n| n.len()).max().unwrap_or(0);
    for (name, signature) in snapshot.sorted_entries() {
        println!("{:<width$}  {}", name.bold(), signature.to_string().dimmed(), width = width);
    }
    println!("{}", format!("{} files", snapshot.len()).dimmed());

    Ok(())
}
