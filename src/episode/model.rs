// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::title::normalize_title;
use crate::state::MediaFile;

/// Duration recorded when the probe could not determine one
pub const DURATION_UNKNOWN: &str = "0";

/// A single media file exposed as a feed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    /// Stable identifier, generated once and persisted in the cache
    pub id: String,
    /// Absolute path to the source file
    pub file: PathBuf,
    /// Lower-cased extension without the dot
    pub extension: String,
    pub mime_type: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    /// `HH:MM:SS`, or [`DURATION_UNKNOWN`]
    pub duration: String,
}

impl Episode {
    /// Create a fresh episode for a newly discovered file
    pub fn from_media_file(
        media: &MediaFile,
        published_at: DateTime<Utc>,
        duration: String,
    ) -> Self {
        let title = normalize_title(&media.stem());

        Self {
            id: new_episode_id(),
            file: media.path.clone(),
            extension: media.extension.clone(),
            mime_type: format!("audio/{}", media.extension),
            description: title.clone(),
            title,
            published_at,
            duration,
        }
    }

    /// File name of the source file, for display
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub(crate) fn new_episode_id() -> String {
    Uuid::new_v4().to_string()
}
