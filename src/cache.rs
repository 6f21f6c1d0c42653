// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::episode::Episode;
use crate::error::CacheError;

/// Default name of the cache file inside the library directory
pub const CACHE_FILENAME: &str = ".localcast-cache.json";

const PARTIAL_SUFFIX: &str = ".partial";

/// Durable record of episode metadata, stored as a JSON array
#[derive(Debug, Clone)]
pub struct MetadataCache {
    path: PathBuf,
}

impl MetadataCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the next record is written to before it replaces the cache
    pub fn partial_path(&self) -> PathBuf {
        let mut name: OsString = self.path.file_name().map(Into::into).unwrap_or_default();
        name.push(PARTIAL_SUFFIX);
        self.path.with_file_name(name)
    }

    /// Read the cached episodes
    ///
    /// A missing cache file is an empty cache, not an error.
    pub fn load(&self) -> Result<Vec<Episode>, CacheError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CacheError::ReadFailed {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&content).map_err(|e| CacheError::Corrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Replace the cache with `episodes`
    ///
    /// The record is written and synced to a `.partial` sibling first, then
    /// renamed over the cache file, so readers never see a torn write.
    pub fn save(&self, episodes: &[Episode]) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(episodes)?;
        let partial = self.partial_path();

        let write_failed = |source| CacheError::WriteFailed {
            path: partial.clone(),
            source,
        };

        let mut file = std::fs::File::create(&partial).map_err(write_failed)?;
        file.write_all(json.as_bytes()).map_err(write_failed)?;
        file.sync_all().map_err(write_failed)?;
        drop(file);

        std::fs::rename(&partial, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&partial);
            CacheError::WriteFailed {
                path: self.path.clone(),
                source: e,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn make_episode(id: &str, file: &str) -> Episode {
        Episode {
            id: id.to_string(),
            file: PathBuf::from(file),
            extension: "mp3".to_string(),
            mime_type: "audio/mp3".to_string(),
            title: "Title".to_string(),
            description: "Title".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            duration: "00:30:00".to_string(),
        }
    }

    #[test]
    fn load_missing_cache_is_empty() {
        let dir = tempdir().unwrap();
        let cache = MetadataCache::new(dir.path().join(CACHE_FILENAME));

        assert!(cache.load().unwrap().is_empty());
    }

    #[test]
    fn save_and_load_preserve_order_and_fields() {
        let dir = tempdir().unwrap();
        let cache = MetadataCache::new(dir.path().join(CACHE_FILENAME));
        let episodes = vec![make_episode("b", "/x/b.mp3"), make_episode("a", "/x/a.mp3")];

        cache.save(&episodes).unwrap();

        assert_eq!(cache.load().unwrap(), episodes);
    }

    #[test]
    fn save_overwrites_previous_record() {
        let dir = tempdir().unwrap();
        let cache = MetadataCache::new(dir.path().join(CACHE_FILENAME));

        cache
            .save(&[make_episode("a", "/x/a.mp3"), make_episode("b", "/x/b.mp3")])
            .unwrap();
        cache.save(&[make_episode("b", "/x/b.mp3")]).unwrap();

        let loaded = cache.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "b");
    }

    #[test]
    fn save_leaves_no_partial_file() {
        let dir = tempdir().unwrap();
        let cache = MetadataCache::new(dir.path().join(CACHE_FILENAME));

        cache.save(&[make_episode("a", "/x/a.mp3")]).unwrap();

        assert!(cache.path().exists());
        assert!(!cache.partial_path().exists());
    }

    #[test]
    fn partial_path_is_a_sibling() {
        let cache = MetadataCache::new("/lib/.localcast-cache.json");
        assert_eq!(
            cache.partial_path(),
            PathBuf::from("/lib/.localcast-cache.json.partial")
        );
    }

    #[test]
    fn load_garbage_is_corrupt() {
        let dir = tempdir().unwrap();
        let cache = MetadataCache::new(dir.path().join(CACHE_FILENAME));
        std::fs::write(cache.path(), "{not json").unwrap();

        assert!(matches!(cache.load(), Err(CacheError::Corrupt { .. })));
    }

    #[test]
    fn load_wrong_shape_is_corrupt() {
        let dir = tempdir().unwrap();
        let cache = MetadataCache::new(dir.path().join(CACHE_FILENAME));
        std::fs::write(cache.path(), r#"{"id": "a"}"#).unwrap();

        assert!(matches!(cache.load(), Err(CacheError::Corrupt { .. })));
    }

    #[test]
    fn save_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let cache = MetadataCache::new(dir.path().join("gone").join(CACHE_FILENAME));

        assert!(matches!(
            cache.save(&[]),
            Err(CacheError::WriteFailed { .. })
        ));
    }
}
