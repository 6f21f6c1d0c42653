// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use std::sync::Arc;

/// Events emitted during a synchronization pass for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A pass is starting on the given directory
    SyncStarted { dir: PathBuf },

    /// The directory was listed and matched against the cache
    DirectoryListed {
        total_files: usize,
        cached_files: usize,
        new_files: usize,
    },

    /// The cache could not be loaded and is being ignored
    CacheDiscarded { error: String },

    /// A new file is about to be probed
    ProbeStarting {
        file: PathBuf,
        /// Index of this file among the new files
        probe_index: usize,
        /// Total number of new files to probe
        total_to_probe: usize,
    },

    /// A probe returned a duration
    ProbeCompleted { file: PathBuf, duration: String },

    /// A probe failed; the episode gets an unknown duration
    ProbeFailed { file: PathBuf, error: String },

    /// The pass finished and its episode list was published
    SyncCompleted {
        episode_count: usize,
        probed_count: usize,
        pruned_count: usize,
    },
}

/// Trait for reporting progress events during synchronization.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

/// Forwards progress events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl LogReporter {
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

impl ProgressReporter for LogReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::SyncStarted { dir } => {
                log::debug!("Scanning {}", dir.display());
            }
            ProgressEvent::DirectoryListed {
                total_files,
                cached_files,
                new_files,
            } => {
                log::debug!("{total_files} media files, {cached_files} cached, {new_files} new");
            }
            ProgressEvent::CacheDiscarded { error } => {
                log::warn!("Ignoring metadata cache: {error}");
            }
            ProgressEvent::ProbeStarting {
                file,
                probe_index,
                total_to_probe,
            } => {
                log::debug!(
                    "[{}/{}] Probing {}",
                    probe_index + 1,
                    total_to_probe,
                    file.display()
                );
            }
            ProgressEvent::ProbeCompleted { file, duration } => {
                log::debug!("{} is {duration} long", file.display());
            }
            ProgressEvent::ProbeFailed { file, error } => {
                log::warn!("Could not read duration of {}: {error}", file.display());
            }
            ProgressEvent::SyncCompleted {
                episode_count,
                probed_count,
                pruned_count,
            } => {
                log::info!(
                    "Library synchronized: {episode_count} episodes, {probed_count} new, {pruned_count} removed"
                );
            }
        }
    }
}
