// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::MissedTickBehavior;

use crate::error::SyncError;
use crate::sync::Library;

/// Timing for change detection and re-sync
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// How often the directory is checked for changes
    pub poll_interval: Duration,
    /// Quiet period after a change before a pass starts
    pub debounce: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            debounce: Duration::from_millis(500),
        }
    }
}

/// Name, size and modification time of every entry, sorted by name
type Fingerprint = Vec<(OsString, u64, Option<SystemTime>)>;

/// Polls a directory and emits a signal whenever its contents change
///
/// Changes are measured against the directory as it was when the poller was
/// created, so anything that happens between construction and [`run`] still
/// produces a signal.
///
/// [`run`]: DirectoryPoller::run
#[derive(Debug, Clone)]
pub struct DirectoryPoller {
    root: PathBuf,
    ignored: Vec<OsString>,
    interval: Duration,
    baseline: Option<Fingerprint>,
}

impl DirectoryPoller {
    pub fn new(root: impl Into<PathBuf>, ignored: Vec<OsString>, interval: Duration) -> Self {
        let mut poller = Self {
            root: root.into(),
            ignored,
            interval,
            baseline: None,
        };
        poller.baseline = poller.fingerprint();
        poller
    }

    /// Poller for a library's directory that ignores the library's own cache writes
    pub fn for_library(library: &Library, interval: Duration) -> Self {
        Self::new(library.root(), library.cache_file_names(), interval)
    }

    /// `None` while the directory cannot be read
    fn fingerprint(&self) -> Option<Fingerprint> {
        let entries = std::fs::read_dir(&self.root).ok()?;

        let mut fingerprint: Fingerprint = entries
            .filter_map(Result::ok)
            .filter(|entry| !self.ignored.contains(&entry.file_name()))
            .map(|entry| {
                let metadata = entry.metadata().ok();
                (
                    entry.file_name(),
                    metadata.as_ref().map_or(0, |m| m.len()),
                    metadata.and_then(|m| m.modified().ok()),
                )
            })
            .collect();
        fingerprint.sort();

        Some(fingerprint)
    }

    /// Poll until every receiver is gone
    ///
    /// Signals carry no payload. A full channel already means a pass is
    /// pending, so further changes are dropped until it is drained.
    pub async fn run(mut self, signals: mpsc::Sender<()>) {
        let mut last = self.baseline.take();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let current = self.fingerprint();
            if current == last {
                continue;
            }
            last = current;

            log::debug!("Change detected in {}", self.root.display());
            match signals.try_send(()) {
                Ok(()) | Err(TrySendError::Full(())) => {}
                Err(TrySendError::Closed(())) => return,
            }
        }
    }
}

/// Run a synchronization pass for each burst of change signals
///
/// After a signal arrives the loop waits `debounce`, discards any signals that
/// piled up meanwhile and runs a single pass. Returns the number of passes
/// once every sender has been dropped.
pub async fn run_sync_loop(
    library: Arc<Library>,
    mut signals: mpsc::Receiver<()>,
    debounce: Duration,
) -> usize {
    let mut passes = 0;

    while signals.recv().await.is_some() {
        tokio::time::sleep(debounce).await;
        while signals.try_recv().is_ok() {}

        passes += 1;
        match library.sync().await {
            Ok(result) => log::info!(
                "Reloaded {}: {} episodes ({} new, {} removed)",
                library.root().display(),
                result.total,
                result.probed,
                result.pruned
            ),
            Err(SyncError::CacheWrite(e)) => {
                log::warn!("Reloaded library but could not save metadata cache: {e}")
            }
            Err(e) => log::error!("Reload failed, keeping previous episode list: {e}"),
        }
    }

    passes
}
