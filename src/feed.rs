// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::BTreeMap;

use rss::extension::itunes::{ITunesItemExtension, NAMESPACE as ITUNES_NAMESPACE};
use rss::{Channel, Enclosure, Guid, Item};
use url::Url;

use crate::episode::Episode;

/// Path prefix episode downloads are served under
pub const EPISODE_ROUTE: &str = "/rss/episode";

/// Presentation options for the rendered feed
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub title: String,
    /// Externally visible base URL; derived from the request when unset
    pub public_url: Option<Url>,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            title: "Local podcast feed".to_string(),
            public_url: None,
        }
    }
}

/// Download URL for an episode, e.g. `http://host/rss/episode/<id>.mp3`
pub fn episode_url(base_url: &str, episode: &Episode) -> String {
    format!(
        "{}{}/{}.{}",
        base_url.trim_end_matches('/'),
        EPISODE_ROUTE,
        episode.id,
        episode.extension
    )
}

/// Render the episodes as an RSS 2.0 document
pub fn render_feed(episodes: &[Episode], options: &FeedOptions, base_url: &str) -> String {
    let items: Vec<Item> = episodes.iter().map(|e| episode_item(e, base_url)).collect();

    let mut namespaces = BTreeMap::new();
    namespaces.insert("itunes".to_string(), ITUNES_NAMESPACE.to_string());

    let mut channel = Channel::default();
    channel.set_title(options.title.clone());
    channel.set_link(base_url.to_string());
    channel.set_description(options.title.clone());
    channel.set_namespaces(namespaces);
    channel.set_items(items);

    channel.to_string()
}

fn episode_item(episode: &Episode, base_url: &str) -> Item {
    // File size is only advisory for clients
    let length = std::fs::metadata(&episode.file)
        .map(|m| m.len())
        .unwrap_or(0);

    let mut enclosure = Enclosure::default();
    enclosure.set_url(episode_url(base_url, episode));
    enclosure.set_length(length.to_string());
    enclosure.set_mime_type(episode.mime_type.clone());

    let mut guid = Guid::default();
    guid.set_value(episode.id.clone());
    guid.set_permalink(false);

    let mut itunes = ITunesItemExtension::default();
    itunes.set_duration(episode.duration.clone());

    let mut item = Item::default();
    item.set_title(episode.title.clone());
    item.set_description(episode.description.clone());
    item.set_guid(guid);
    item.set_pub_date(episode.published_at.to_rfc2822());
    item.set_enclosure(enclosure);
    item.set_itunes_ext(itunes);
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn make_episode(id: &str, file: PathBuf) -> Episode {
        Episode {
            id: id.to_string(),
            file,
            extension: "mp3".to_string(),
            mime_type: "audio/mp3".to_string(),
            title: "GeQu".to_string(),
            description: "GeQu".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            duration: "00:03:30".to_string(),
        }
    }

    #[test]
    fn episode_url_joins_base_and_id() {
        let episode = make_episode("abc", PathBuf::from("/x/a.mp3"));
        assert_eq!(
            episode_url("http://host:3000/", &episode),
            "http://host:3000/rss/episode/abc.mp3"
        );
    }

    #[test]
    fn rendered_feed_parses_back() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.mp3");
        std::fs::write(&file, b"12345").unwrap();

        let episodes = vec![
            make_episode("id-1", file),
            make_episode("id-2", dir.path().join("missing.mp3")),
        ];
        let xml = render_feed(&episodes, &FeedOptions::default(), "http://host");

        let channel = Channel::read_from(xml.as_bytes()).unwrap();
        assert_eq!(channel.title(), "Local podcast feed");
        assert_eq!(channel.items().len(), 2);

        let item = &channel.items()[0];
        assert_eq!(item.title(), Some("GeQu"));
        assert_eq!(item.guid().unwrap().value(), "id-1");
        assert_eq!(item.pub_date(), Some("Mon, 15 Jan 2024 12:00:00 +0000"));

        let enclosure = item.enclosure().unwrap();
        assert_eq!(enclosure.url(), "http://host/rss/episode/id-1.mp3");
        assert_eq!(enclosure.length(), "5");
        assert_eq!(enclosure.mime_type(), "audio/mp3");
        assert_eq!(
            item.itunes_ext().and_then(|ext| ext.duration()),
            Some("00:03:30")
        );

        assert_eq!(channel.items()[1].enclosure().unwrap().length(), "0");
    }

    #[test]
    fn empty_library_renders_empty_channel() {
        let xml = render_feed(&[], &FeedOptions::default(), "http://host");
        let channel = Channel::read_from(xml.as_bytes()).unwrap();
        assert!(channel.items().is_empty());
    }
}
