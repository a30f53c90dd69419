//! Track data shape as delivered by the catalog collaborator

use serde::{Deserialize, Serialize};

/// One resolution variant of the track artwork, ordered low to high
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ImageVariant {
    pub quality: String,
    pub url: String,
}

/// One playable stream variant; the first entry in a track's list is canonical
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct StreamSource {
    pub quality: String,
    pub url: String,
}

/// A playable catalog item.
///
/// `id` is stable and unique within a queue. `duration` is the catalog's
/// nominal value in seconds; the authoritative duration comes from the
/// stream once its metadata loads.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageVariant>,
    #[serde(default, rename = "download_urls")]
    pub streams: Vec<StreamSource>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl Track {
    /// The canonical stream URL, if the track is playable at all.
    pub fn stream_url(&self) -> Option<&str> {
        self.streams.first().map(|s| s.url.as_str())
    }

    /// Highest-resolution artwork URL.
    pub fn artwork_url(&self) -> Option<&str> {
        self.images.last().map(|i| i.url.as_str())
    }

    pub fn artist_line(&self) -> String {
        if self.artists.is_empty() {
            "Unknown artist".to_string()
        } else {
            self.artists.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_url_is_first_entry() {
        let track = Track {
            id: "t1".into(),
            name: "Song".into(),
            artists: vec!["A".into()],
            images: vec![],
            streams: vec![
                StreamSource { quality: "320kbps".into(), url: "https://cdn/a".into() },
                StreamSource { quality: "96kbps".into(), url: "https://cdn/b".into() },
            ],
            duration: Some(180.0),
        };
        assert_eq!(track.stream_url(), Some("https://cdn/a"));
    }

    #[test]
    fn track_without_streams_is_unplayable() {
        let track = Track {
            id: "t2".into(),
            name: "Silent".into(),
            artists: vec![],
            images: vec![],
            streams: vec![],
            duration: None,
        };
        assert_eq!(track.stream_url(), None);
        assert_eq!(track.artist_line(), "Unknown artist");
    }
}
