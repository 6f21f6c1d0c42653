// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::ScanError;

/// Extensions accepted as episodes, lower-case
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["mp3", "mp4", "m4a"];

/// A candidate media file found in the library directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Lower-cased extension without the dot
    pub extension: String,
}

impl MediaFile {
    /// Filename without its extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Return the lower-cased extension if it is one we serve
pub fn media_extension(path: &Path) -> Option<String> {
    let ext = path.extension().and_then(OsStr::to_str)?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// List the media files in `dir`, in the order the OS returns them
///
/// Entries whose name is in `ignored` (the metadata cache and its temporary
/// file) are skipped, as are directories and files with other extensions.
pub fn scan_media_dir(dir: &Path, ignored: &[&OsStr]) -> Result<Vec<MediaFile>, ScanError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ScanError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| ScanError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source: e,
        })?;

        if ignored.contains(&entry.file_name().as_os_str()) {
            continue;
        }

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        if let Some(extension) = media_extension(&path) {
            files.push(MediaFile { path, extension });
        }
    }

    Ok(files)
}
