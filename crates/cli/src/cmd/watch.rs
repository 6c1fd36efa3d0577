//! Poll a directory and print changed filenames

use crate::config::Settings;
use anyhow::{Context, Result};
use pollwatch::{PollLoop, Watch};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::info;

pub async fn run(dir: &Path, settings: Settings, once: bool) -> Result<()> {
    if once {
        return run_once(dir, settings).await;
    }

    let (tx, mut rx) = mpsc::channel(64);
    let poll_loop = PollLoop::new(dir, settings.watch, settings.interval, tx)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;
    let handle = tokio::spawn(poll_loop.run());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            batch = rx.recv() => match batch {
                Some(names) => {
                    for name in names {
                        println!("{}", name);
                    }
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping");
                break;
            }
        }
    }

    handle.abort();
    Ok(())
}

/// Baseline now, wait one interval, poll once
async fn run_once(dir: &Path, settings: Settings) -> Result<()> {
    let mut watch = Watch::with_config(dir, settings.watch, |name: &str| -> anyhow::Result<()> {
        println!("{}", name);
        Ok(())
    })
    .with_context(|| format!("Failed to watch {}", dir.display()))?;

    tokio::time::sleep(settings.interval).await;

    watch
        .poll()
        .with_context(|| format!("Failed to poll {}", dir.display()))
}
