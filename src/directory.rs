// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::{Arc, RwLock};

use crate::episode::Episode;

/// Read view over the current episode list
///
/// The synchronizer publishes whole snapshots; readers get an `Arc` to the
/// snapshot that was current when they asked and never see a partial list.
#[derive(Debug, Clone, Default)]
pub struct EpisodeDirectory {
    current: Arc<RwLock<Arc<Vec<Episode>>>>,
}

impl EpisodeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot
    pub fn publish(&self, episodes: Vec<Episode>) {
        let snapshot = Arc::new(episodes);
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = snapshot;
    }

    /// The current episode list, in publication order
    pub fn list(&self) -> Arc<Vec<Episode>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Resolve a download request id to its episode
    ///
    /// Clients may append decoration to the id (`"<id>.mp3"`, a leading path);
    /// only the bare id is compared.
    pub fn find_by_id(&self, raw_id: &str) -> Option<Episode> {
        let id = bare_id(raw_id);
        if id.is_empty() {
            return None;
        }

        self.list().iter().find(|episode| episode.id == id).cloned()
    }
}

/// Strip whitespace, leading path segments and any extension-like suffix
fn bare_id(raw: &str) -> &str {
    let trimmed = raw.trim();
    let last_segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last_segment
        .split('.')
        .next()
        .unwrap_or(last_segment)
        .trim()
}
