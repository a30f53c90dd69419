//! Track library loading
//!
//! The catalog service is an external collaborator; by the time a track
//! reaches the player its stream URLs are already resolved. This module
//! only reads the exported track list from disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::Track;

pub const LIBRARY_ENV: &str = "SERENITY_LIBRARY";
pub const DEFAULT_LIBRARY_FILE: &str = "library.json";

/// Library file location: `SERENITY_LIBRARY` or `library.json`.
pub fn library_path() -> PathBuf {
    std::env::var_os(LIBRARY_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY_FILE))
}

pub fn load_library(path: &Path) -> Result<Vec<Track>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading track library {}", path.display()))?;
    let tracks: Vec<Track> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing track library {}", path.display()))?;
    tracing::info!(count = tracks.len(), path = %path.display(), "Track library loaded");
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_track_shape() {
        let raw = r#"[
            {
                "id": "abc123",
                "name": "Evening Rain",
                "artists": ["Asha Varma", "Dev Iyer"],
                "images": [
                    {"quality": "50x50", "url": "https://img/lo"},
                    {"quality": "500x500", "url": "https://img/hi"}
                ],
                "download_urls": [
                    {"quality": "320kbps", "url": "https://cdn/evening-rain"}
                ],
                "duration": 241.0
            },
            {"id": "min1", "name": "Bare Minimum"}
        ]"#;

        let tracks: Vec<Track> = serde_json::from_str(raw).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].stream_url(), Some("https://cdn/evening-rain"));
        assert_eq!(tracks[0].artwork_url(), Some("https://img/hi"));
        assert_eq!(tracks[0].duration, Some(241.0));

        // Optional fields default to empty; such a track is simply unplayable
        assert_eq!(tracks[1].stream_url(), None);
        assert!(tracks[1].artists.is_empty());
    }
}
