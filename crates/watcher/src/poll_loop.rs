//! Fixed-interval poll driver
//!
//! Polls one watch on a timer and forwards each non-empty batch of changed
//! filenames over a channel. The engine itself never schedules anything;
//! this is just one caller of [`Watch::poll`].

use crate::watch::{Watch, WatchConfig, WatchError};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Periodic poller for a single directory
pub struct PollLoop {
    /// Watch collecting changed names between sends
    watch: Watch<Vec<String>>,

    /// Poll interval
    interval: Duration,

    /// Sender for changed filename batches
    change_tx: mpsc::Sender<Vec<String>>,
}

impl PollLoop {
    /// Create a watch on `directory` and wrap it in a poll loop
    pub fn new(
        directory: impl Into<PathBuf>,
        config: WatchConfig,
        interval: Duration,
        change_tx: mpsc::Sender<Vec<String>>,
    ) -> Result<Self, WatchError> {
        let watch = Watch::with_config(directory, config, Vec::<String>::new())?;
        Ok(Self::from_watch(watch, interval, change_tx))
    }

    /// Drive an existing watch
    pub fn from_watch(
        watch: Watch<Vec<String>>,
        interval: Duration,
        change_tx: mpsc::Sender<Vec<String>>,
    ) -> Self {
        Self {
            watch,
            interval,
            change_tx,
        }
    }

    /// Run until the receiving side of the channel is dropped
    ///
    /// The first poll happens immediately. Failed polls are logged and the
    /// loop keeps going; the watch still holds its last good baseline.
    pub async fn run(mut self) {
        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Polling {} every {:?}",
            self.watch.directory().display(),
            self.interval
        );

        loop {
            timer.tick().await;

            if !self.poll_once().await {
                break;
            }
        }

        info!("Stopped polling {}", self.watch.directory().display());
    }

    /// Poll once and send any changes
    ///
    /// Returns false once the receiver is gone.
    pub async fn poll_once(&mut self) -> bool {
        if self.change_tx.is_closed() {
            return false;
        }

        if let Err(e) = self.watch.poll() {
            warn!("Poll of {} failed: {}", self.watch.directory().display(), e);
            return true;
        }

        let changed = std::mem::take(self.watch.handler_mut());
        if changed.is_empty() {
            debug!("Poll of {}: no changes", self.watch.directory().display());
            return true;
        }

        debug!(
            "Poll of {} found {} changed files",
            self.watch.directory().display(),
            changed.len()
        );

        self.change_tx.send(changed).await.is_ok()
    }

    /// The driven watch
    pub fn watch(&self) -> &Watch<Vec<String>> {
        &self.watch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_poll_loop_forwards_changes() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("before.txt"), b"baseline").unwrap();

        let (tx, mut rx) = mpsc::channel(10);
        let poll_loop = PollLoop::new(
            temp_dir.path(),
            WatchConfig::default(),
            Duration::from_millis(50),
            tx,
        )
        .unwrap();

        let handle = tokio::spawn(poll_loop.run());

        // Let the immediate first poll pass
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(temp_dir.path().join("second.log"), b"2").unwrap();
        fs::write(temp_dir.path().join("first.log"), b"1").unwrap();

        let changed = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();

        // Both writes may straddle a tick; collect until both are seen
        let mut all = changed;
        while all.len() < 2 {
            let more = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .unwrap()
                .unwrap();
            all.extend(more);
        }
        all.sort();
        assert_eq!(all, vec!["first.log", "second.log"]);

        drop(rx);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_poll_once_without_changes_sends_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let (tx, mut rx) = mpsc::channel(1);
        let mut poll_loop = PollLoop::new(
            temp_dir.path(),
            WatchConfig::default(),
            Duration::from_secs(300),
            tx,
        )
        .unwrap();

        assert!(poll_loop.poll_once().await);
        assert!(rx.try_recv().is_err());
        assert!(poll_loop.watch().handler().is_empty());
    }

    #[tokio::test]
    async fn test_poll_once_survives_missing_directory() {
        let root = TempDir::new().unwrap();
        let watched = root.path().join("out");
        fs::create_dir(&watched).unwrap();

        let (tx, mut rx) = mpsc::channel(1);
        let mut poll_loop =
            PollLoop::new(&watched, WatchConfig::default(), Duration::from_secs(300), tx).unwrap();

        fs::remove_dir(&watched).unwrap();
        assert!(poll_loop.poll_once().await);

        fs::create_dir(&watched).unwrap();
        fs::write(watched.join("late.txt"), b"x").unwrap();
        assert!(poll_loop.poll_once().await);
        assert_eq!(rx.recv().await.unwrap(), vec!["late.txt"]);
    }

    #[tokio::test]
    async fn test_poll_once_stops_when_receiver_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel(1);
        let mut poll_loop = PollLoop::new(
            temp_dir.path(),
            WatchConfig::default(),
            Duration::from_secs(300),
            tx,
        )
        .unwrap();

        drop(rx);
        assert!(!poll_loop.poll_once().await);
    }
}
