// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use futures::{StreamExt, stream};
use tokio::sync::Mutex;

use crate::cache::{CACHE_FILENAME, MetadataCache};
use crate::directory::EpisodeDirectory;
use crate::episode::{DURATION_UNKNOWN, Episode, new_episode_id};
use crate::error::SyncError;
use crate::probe::DurationProber;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::state::{MediaFile, scan_media_dir};

/// Options for library synchronization
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Name of the metadata cache file inside the library directory
    pub cache_file_name: String,
    /// Maximum number of probe processes running at once
    pub max_concurrent_probes: usize,
    /// Gap between the publish times of consecutive new episodes
    pub publish_increment: TimeDelta,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            cache_file_name: CACHE_FILENAME.to_string(),
            max_concurrent_probes: 4,
            publish_increment: TimeDelta::seconds(1),
        }
    }
}

/// Result of a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    /// Number of episodes now published
    pub total: usize,
    /// Episodes carried over from the cache unchanged
    pub reused: usize,
    /// Episodes created for files not in the cache
    pub probed: usize,
    /// New episodes whose duration could not be read
    pub probe_failures: usize,
    /// Cache entries dropped because their file is gone
    pub pruned: usize,
}

/// Outcome of matching a listing against the cache
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// One episode per listed file, in listing order
    pub episodes: Vec<Episode>,
    pub reused: usize,
    pub probed: usize,
    pub probe_failures: usize,
    pub pruned: usize,
}

enum Slot {
    Cached(Episode),
    New(MediaFile),
}

/// Build the episode list for `files` from the `cached` episodes
///
/// Files whose path matches a cached episode reuse it as-is. Every other file
/// gets a fresh id, a normalized title, a probed duration and the publish time
/// `base_time + index * publish_increment`, where `index` is its position in
/// `files`. Probes for new files run concurrently.
pub async fn reconcile(
    files: Vec<MediaFile>,
    cached: Vec<Episode>,
    prober: Arc<dyn DurationProber>,
    options: &SyncOptions,
    base_time: DateTime<Utc>,
    reporter: SharedProgressReporter,
) -> Reconciled {
    let mut by_path: HashMap<PathBuf, Episode> =
        cached.into_iter().map(|e| (e.file.clone(), e)).collect();

    let slots: Vec<Slot> = files
        .into_iter()
        .map(|file| match by_path.remove(&file.path) {
            Some(episode) => Slot::Cached(episode),
            None => Slot::New(file),
        })
        .collect();
    let pruned = by_path.len();

    let to_probe: Vec<PathBuf> = slots
        .iter()
        .filter_map(|slot| match slot {
            Slot::New(file) => Some(file.path.clone()),
            Slot::Cached(_) => None,
        })
        .collect();
    let total_to_probe = to_probe.len();

    reporter.report(ProgressEvent::DirectoryListed {
        total_files: slots.len(),
        cached_files: slots.len() - total_to_probe,
        new_files: total_to_probe,
    });

    // Each probe future owns its inputs so the pass can run on a spawned task
    let probe_reporter = reporter.clone();
    let durations: Vec<_> = stream::iter(to_probe.into_iter().enumerate())
        .map(move |(probe_index, path)| {
            let prober = prober.clone();
            let reporter = probe_reporter.clone();
            async move {
                reporter.report(ProgressEvent::ProbeStarting {
                    file: path.clone(),
                    probe_index,
                    total_to_probe,
                });
                prober.probe(&path).await
            }
        })
        .buffered(options.max_concurrent_probes.max(1))
        .collect()
        .await;
    let mut durations = durations.into_iter();

    let mut used_ids = HashSet::with_capacity(slots.len());
    let mut episodes = Vec::with_capacity(slots.len());
    let mut reused = 0;
    let mut probed = 0;
    let mut probe_failures = 0;

    for (index, slot) in slots.into_iter().enumerate() {
        let mut episode = match slot {
            Slot::Cached(episode) => {
                reused += 1;
                episode
            }
            Slot::New(file) => {
                let duration = match durations.next() {
                    Some(Ok(duration)) => {
                        reporter.report(ProgressEvent::ProbeCompleted {
                            file: file.path.clone(),
                            duration: duration.clone(),
                        });
                        duration
                    }
                    Some(Err(e)) => {
                        reporter.report(ProgressEvent::ProbeFailed {
                            file: file.path.clone(),
                            error: e.to_string(),
                        });
                        probe_failures += 1;
                        DURATION_UNKNOWN.to_string()
                    }
                    None => DURATION_UNKNOWN.to_string(),
                };

                probed += 1;
                let published_at = publish_time(base_time, options.publish_increment, index);
                Episode::from_media_file(&file, published_at, duration)
            }
        };

        // A damaged cache may repeat ids; ids must stay unique in the list
        while used_ids.contains(&episode.id) {
            log::warn!(
                "Duplicate episode id {} for {}, assigning a new one",
                episode.id,
                episode.file.display()
            );
            episode.id = new_episode_id();
        }
        used_ids.insert(episode.id.clone());
        episodes.push(episode);
    }

    Reconciled {
        episodes,
        reused,
        probed,
        probe_failures,
        pruned,
    }
}

/// `base + increment * index`, or `base` if that does not fit in a timestamp
fn publish_time(base: DateTime<Utc>, increment: TimeDelta, index: usize) -> DateTime<Utc> {
    i32::try_from(index)
        .ok()
        .and_then(|index| increment.checked_mul(index))
        .and_then(|offset| base.checked_add_signed(offset))
        .unwrap_or_else(|| {
            log::warn!("Publish time for listing position {index} is out of range");
            base
        })
}

/// Owner of a media directory: runs synchronization passes and publishes
/// their results to an [`EpisodeDirectory`]
pub struct Library {
    root: PathBuf,
    cache: MetadataCache,
    prober: Arc<dyn DurationProber>,
    directory: EpisodeDirectory,
    options: SyncOptions,
    reporter: SharedProgressReporter,
    pass_lock: Mutex<()>,
}

impl Library {
    pub fn new(
        root: impl AsRef<Path>,
        prober: Arc<dyn DurationProber>,
        options: SyncOptions,
        reporter: SharedProgressReporter,
    ) -> Self {
        let root = root.as_ref();
        // Resolve `..` and symlinks so every spelling of a path shares cache keys
        let root = std::fs::canonicalize(root)
            .or_else(|_| std::path::absolute(root))
            .unwrap_or_else(|_| root.to_path_buf());
        let cache = MetadataCache::new(root.join(&options.cache_file_name));

        Self {
            root,
            cache,
            prober,
            directory: EpisodeDirectory::new(),
            options,
            reporter,
            pass_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Handle to the published episode list
    pub fn directory(&self) -> &EpisodeDirectory {
        &self.directory
    }

    /// File names in the library directory that belong to the cache
    pub fn cache_file_names(&self) -> Vec<OsString> {
        [self.cache.path(), self.cache.partial_path().as_path()]
            .iter()
            .filter_map(|p| p.file_name().map(OsString::from))
            .collect()
    }

    /// Run one synchronization pass
    ///
    /// Passes never overlap: a caller arriving during a pass waits for it to
    /// finish and then runs its own. If the directory cannot be listed the
    /// published list is left untouched. If the cache cannot be written the
    /// new list is still published and the write error is returned.
    pub async fn sync(&self) -> Result<SyncResult, SyncError> {
        let _pass = self.pass_lock.lock().await;

        self.reporter.report(ProgressEvent::SyncStarted {
            dir: self.root.clone(),
        });

        let ignored = self.cache_file_names();
        let ignored: Vec<_> = ignored.iter().map(OsString::as_os_str).collect();
        let files = scan_media_dir(&self.root, &ignored)?;

        let cached = self.cache.load().unwrap_or_else(|e| {
            self.reporter.report(ProgressEvent::CacheDiscarded {
                error: e.to_string(),
            });
            Vec::new()
        });

        let base_time = Utc::now().trunc_subsecs(0);
        let reconciled = reconcile(
            files,
            cached,
            self.prober.clone(),
            &self.options,
            base_time,
            self.reporter.clone(),
        )
        .await;

        let result = SyncResult {
            total: reconciled.episodes.len(),
            reused: reconciled.reused,
            probed: reconciled.probed,
            probe_failures: reconciled.probe_failures,
            pruned: reconciled.pruned,
        };

        let saved = self.cache.save(&reconciled.episodes);
        self.directory.publish(reconciled.episodes);

        self.reporter.report(ProgressEvent::SyncCompleted {
            episode_count: result.total,
            probed_count: result.probed,
            pruned_count: result.pruned,
        });

        saved.map_err(SyncError::CacheWrite)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::tempdir;

    use crate::error::ProbeError;
    use crate::progress::NoopReporter;

    #[derive(Default)]
    struct FakeProber {
        failing: HashSet<String>,
        delay: Option<Duration>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeProber {
        fn failing(names: &[&str]) -> Self {
            Self {
                failing: names.iter().map(|n| n.to_string()).collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DurationProber for FakeProber {
        async fn probe(&self, path: &Path) -> Result<String, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            if self.failing.contains(&name) {
                Err(ProbeError::NoDuration {
                    path: path.to_path_buf(),
                })
            } else {
                Ok("00:01:00".to_string())
            }
        }
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"audio").unwrap();
    }

    fn library(dir: &Path, prober: Arc<FakeProber>) -> Library {
        Library::new(dir, prober, SyncOptions::default(), NoopReporter::shared())
    }

    fn media(dir: &Path, name: &str) -> MediaFile {
        MediaFile {
            path: dir.join(name),
            extension: "mp3".to_string(),
        }
    }

    fn find<'a>(episodes: &'a [Episode], name: &str) -> &'a Episode {
        episodes
            .iter()
            .find(|e| e.file_name() == name)
            .unwrap_or_else(|| panic!("no episode for {name}"))
    }

    #[tokio::test]
    async fn first_sync_builds_episodes_and_cache() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Song.mp3");
        touch(dir.path(), "歌曲.mp3");
        touch(dir.path(), "notes.txt");

        let prober = Arc::new(FakeProber::default());
        let library = library(dir.path(), prober.clone());
        let result = library.sync().await.unwrap();

        assert_eq!(result.total, 2);
        assert_eq!(result.probed, 2);
        assert_eq!(result.reused, 0);
        assert_eq!(prober.calls(), 2);

        let episodes = library.directory().list();
        assert_eq!(find(&episodes, "Song.mp3").title, "Song");
        assert_eq!(find(&episodes, "歌曲.mp3").title, "GeQu");
        assert_eq!(find(&episodes, "Song.mp3").duration, "00:01:00");
        assert_eq!(find(&episodes, "Song.mp3").mime_type, "audio/mp3");

        let cached = library.cache().load().unwrap();
        assert_eq!(cached.as_slice(), episodes.as_slice());
    }

    #[tokio::test]
    async fn second_sync_is_idempotent() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Song.mp3");
        touch(dir.path(), "歌曲.mp3");

        let prober = Arc::new(FakeProber::default());
        let library = library(dir.path(), prober.clone());

        library.sync().await.unwrap();
        let first_list = library.directory().list();
        let first_cache = std::fs::read(library.cache().path()).unwrap();

        let result = library.sync().await.unwrap();
        let second_cache = std::fs::read(library.cache().path()).unwrap();

        assert_eq!(result.reused, 2);
        assert_eq!(result.probed, 0);
        assert_eq!(prober.calls(), 2);
        assert_eq!(first_cache, second_cache);
        assert_eq!(library.directory().list().as_slice(), first_list.as_slice());
    }

    #[tokio::test]
    async fn ids_survive_restart() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.mp3");

        let first = library(dir.path(), Arc::new(FakeProber::default()));
        first.sync().await.unwrap();
        let id = first.directory().list()[0].id.clone();

        let prober = Arc::new(FakeProber::default());
        let second = library(dir.path(), prober.clone());
        second.sync().await.unwrap();

        assert_eq!(second.directory().list()[0].id, id);
        assert_eq!(prober.calls(), 0);
    }

    #[tokio::test]
    async fn unrelated_changes_keep_episode_stable() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "keep.mp3");
        touch(dir.path(), "drop.mp3");

        let library = library(dir.path(), Arc::new(FakeProber::default()));
        library.sync().await.unwrap();
        let before = find(&library.directory().list(), "keep.mp3").clone();

        std::fs::remove_file(dir.path().join("drop.mp3")).unwrap();
        touch(dir.path(), "added.m4a");
        library.sync().await.unwrap();

        let after = find(&library.directory().list(), "keep.mp3").clone();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn removed_files_are_pruned() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.mp3");
        touch(dir.path(), "b.mp3");

        let library = library(dir.path(), Arc::new(FakeProber::default()));
        library.sync().await.unwrap();

        std::fs::remove_file(dir.path().join("b.mp3")).unwrap();
        let result = library.sync().await.unwrap();

        assert_eq!(result.pruned, 1);
        let listed: Vec<_> = library.directory().list().iter().map(Episode::file_name).collect();
        let cached: Vec<_> = library.cache().load().unwrap().iter().map(Episode::file_name).collect();
        assert_eq!(listed, vec!["a.mp3"]);
        assert_eq!(cached, vec!["a.mp3"]);
    }

    #[tokio::test]
    async fn publish_times_follow_listing_order() {
        let dir = Path::new("/podcasts");
        let base = Utc::now().trunc_subsecs(0);
        let prober = Arc::new(FakeProber::default());

        let reconciled = reconcile(
            vec![media(dir, "b.mp3"), media(dir, "a.mp3"), media(dir, "c.mp3")],
            Vec::new(),
            prober.clone(),
            &SyncOptions::default(),
            base,
            NoopReporter::shared(),
        )
        .await;

        let names: Vec<_> = reconciled.episodes.iter().map(Episode::file_name).collect();
        assert_eq!(names, vec!["b.mp3", "a.mp3", "c.mp3"]);

        let times: Vec<_> = reconciled.episodes.iter().map(|e| e.published_at).collect();
        assert_eq!(times[0], base);
        assert_eq!(times[1], base + TimeDelta::seconds(1));
        assert_eq!(times[2], base + TimeDelta::seconds(2));
    }

    #[tokio::test]
    async fn cached_episodes_are_reused_verbatim() {
        let dir = Path::new("/podcasts");
        let base = Utc::now().trunc_subsecs(0);
        let prober = Arc::new(FakeProber::default());

        let mut cached = Episode::from_media_file(
            &media(dir, "old.mp3"),
            base - TimeDelta::days(3),
            "01:00:00".to_string(),
        );
        cached.title = "Hand Edited".to_string();

        let reconciled = reconcile(
            vec![media(dir, "new.mp3"), media(dir, "old.mp3")],
            vec![cached.clone()],
            prober.clone(),
            &SyncOptions::default(),
            base,
            NoopReporter::shared(),
        )
        .await;

        assert_eq!(reconciled.reused, 1);
        assert_eq!(reconciled.probed, 1);
        assert_eq!(reconciled.episodes[1], cached);
        assert_eq!(prober.calls(), 1);
    }

    #[tokio::test]
    async fn duplicate_cached_ids_are_replaced() {
        let dir = Path::new("/podcasts");
        let base = Utc::now().trunc_subsecs(0);

        let a = Episode::from_media_file(&media(dir, "a.mp3"), base, "0".to_string());
        let mut b = Episode::from_media_file(&media(dir, "b.mp3"), base, "0".to_string());
        b.id = a.id.clone();

        let reconciled = reconcile(
            vec![media(dir, "a.mp3"), media(dir, "b.mp3")],
            vec![a.clone(), b],
            Arc::new(FakeProber::default()),
            &SyncOptions::default(),
            base,
            NoopReporter::shared(),
        )
        .await;

        assert_eq!(reconciled.episodes[0].id, a.id);
        assert_ne!(reconciled.episodes[1].id, a.id);
    }

    #[tokio::test]
    async fn probe_failure_yields_unknown_duration() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "good.mp3");
        touch(dir.path(), "broken.mp3");

        let library = library(dir.path(), Arc::new(FakeProber::failing(&["broken.mp3"])));
        let result = library.sync().await.unwrap();

        assert_eq!(result.total, 2);
        assert_eq!(result.probe_failures, 1);

        let episodes = library.directory().list();
        assert_eq!(find(&episodes, "broken.mp3").duration, DURATION_UNKNOWN);
        assert_eq!(find(&episodes, "good.mp3").duration, "00:01:00");
    }

    #[tokio::test]
    async fn probes_run_concurrently_up_to_limit() {
        let dir = Path::new("/podcasts");
        let prober = Arc::new(FakeProber {
            delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let options = SyncOptions {
            max_concurrent_probes: 2,
            ..Default::default()
        };
        let files = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| media(dir, &format!("{n}.mp3")))
            .collect();

        let reconciled = reconcile(
            files,
            Vec::new(),
            prober.clone(),
            &options,
            Utc::now(),
            NoopReporter::shared(),
        )
        .await;

        assert_eq!(reconciled.episodes.len(), 5);
        assert_eq!(prober.calls(), 5);
        assert_eq!(prober.max_in_flight.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unreadable_directory_keeps_previous_list() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("library");
        std::fs::create_dir(&root).unwrap();
        touch(&root, "a.mp3");

        let library = library(&root, Arc::new(FakeProber::default()));
        library.sync().await.unwrap();

        std::fs::remove_dir_all(&root).unwrap();
        let result = library.sync().await;

        assert!(matches!(result, Err(SyncError::Scan(_))));
        assert_eq!(library.directory().list().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_cache_is_rebuilt() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.mp3");
        std::fs::write(dir.path().join(CACHE_FILENAME), "[{\"id\":").unwrap();

        let prober = Arc::new(FakeProber::default());
        let library = library(dir.path(), prober.clone());
        let result = library.sync().await.unwrap();

        assert_eq!(result.probed, 1);
        assert_eq!(prober.calls(), 1);
        assert_eq!(library.cache().load().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cache_write_failure_still_publishes() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.mp3");
        // A directory where the cache file should be makes the final rename fail
        std::fs::create_dir(dir.path().join(CACHE_FILENAME)).unwrap();
        touch(&dir.path().join(CACHE_FILENAME), "occupied");

        let library = library(dir.path(), Arc::new(FakeProber::default()));
        let result = library.sync().await;

        assert!(matches!(result, Err(SyncError::CacheWrite(_))));
        assert_eq!(library.directory().list().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_syncs_do_not_overlap() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.mp3");
        touch(dir.path(), "b.mp3");

        let prober = Arc::new(FakeProber {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let library = library(dir.path(), prober.clone());

        let (first, second) = tokio::join!(library.sync(), library.sync());
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(first.probed + second.probed, 2);
        assert_eq!(first.reused + second.reused, 2);
        assert_eq!(prober.calls(), 2);
    }

    #[tokio::test]
    async fn cache_file_is_never_an_episode() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.mp3");

        let options = SyncOptions {
            cache_file_name: "cache.mp3".to_string(),
            ..Default::default()
        };
        let library = Library::new(
            dir.path(),
            Arc::new(FakeProber::default()),
            options,
            NoopReporter::shared(),
        );

        library.sync().await.unwrap();
        library.sync().await.unwrap();

        let names: Vec<_> = library.directory().list().iter().map(Episode::file_name).collect();
        assert_eq!(names, vec!["a.mp3"]);
    }

    #[test]
    fn publish_time_out_of_range_falls_back_to_base() {
        let base = Utc::now().trunc_subsecs(0);

        assert_eq!(publish_time(base, TimeDelta::seconds(1), 3), base + TimeDelta::seconds(3));
        assert_eq!(publish_time(base, TimeDelta::seconds(1), usize::MAX), base);
        assert_eq!(publish_time(base, TimeDelta::MAX, 2), base);
    }

    #[tokio::test]
    async fn equivalent_root_spellings_share_the_cache() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("pods");
        std::fs::create_dir(&root).unwrap();
        touch(&root, "a.mp3");

        let direct = library(&root, Arc::new(FakeProber::default()));
        direct.sync().await.unwrap();
        let id = direct.directory().list()[0].id.clone();

        let prober = Arc::new(FakeProber::default());
        let roundabout = library(&root.join("..").join("pods"), prober.clone());
        roundabout.sync().await.unwrap();

        assert_eq!(roundabout.root(), direct.root());
        assert_eq!(roundabout.directory().list()[0].id, id);
        assert_eq!(prober.calls(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_root_shares_the_cache() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("pods");
        std::fs::create_dir(&root).unwrap();
        touch(&root, "a.mp3");
        let link = dir.path().join("linked");
        std::os::unix::fs::symlink(&root, &link).unwrap();

        let direct = library(&root, Arc::new(FakeProber::default()));
        direct.sync().await.unwrap();

        let prober = Arc::new(FakeProber::default());
        let linked = library(&link, prober.clone());
        linked.sync().await.unwrap();

        assert_eq!(linked.directory().list()[0].id, direct.directory().list()[0].id);
        assert_eq!(prober.calls(), 0);
    }

    #[tokio::test]
    async fn sync_runs_on_a_spawned_task() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "a.mp3");
        touch(dir.path(), "b.mp3");

        let library = Arc::new(library(dir.path(), Arc::new(FakeProber::default())));
        let task = {
            let library = library.clone();
            tokio::spawn(async move { library.sync().await })
        };

        let result = task.await.unwrap().unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(library.directory().list().len(), 2);
    }
}
