// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod cache;
pub mod directory;
pub mod episode;
pub mod error;
pub mod feed;
pub mod logging;
pub mod probe;
pub mod progress;
pub mod server;
pub mod state;
pub mod sync;
pub mod watch;

// Re-export main types for convenience
pub use cache::{CACHE_FILENAME, MetadataCache};
pub use directory::EpisodeDirectory;
pub use episode::{DURATION_UNKNOWN, Episode, normalize_title};
pub use error::{CacheError, ProbeError, ScanError, ServeError, SyncError};
pub use feed::{FeedOptions, render_feed};
pub use probe::{DurationProber, FfprobeProber, parse_duration};
pub use progress::{LogReporter, NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use server::{AppState, router, serve};
pub use state::{ALLOWED_EXTENSIONS, MediaFile, scan_media_dir};
pub use sync::{Library, SyncOptions, SyncResult, reconcile};
pub use watch::{DirectoryPoller, WatchOptions, run_sync_loop};
