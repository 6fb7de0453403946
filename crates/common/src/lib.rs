use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Sidebar identifier that selects every track regardless of grouping.
pub const ALL_TRACKS_ID: &str = "*ALL_TRACKS*";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub file_path: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub track_no: u32,
    #[serde(skip)]
    pub cover: Option<CoverArt>,
    #[serde(default)]
    pub source: TrackSource,
}

impl Track {
    /// Record used when a file exists but its tags cannot be read.
    pub fn fallback(path: &Path) -> Self {
        Self {
            file_path: path.to_string_lossy().to_string(),
            title: file_stem(path),
            artist: UNKNOWN_ARTIST.to_string(),
            album: UNKNOWN_ALBUM.to_string(),
            genre: String::new(),
            year: 0,
            track_no: 0,
            cover: None,
            source: TrackSource::Local,
        }
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.file_path)
    }

    pub fn has_known_album(&self) -> bool {
        self.album != UNKNOWN_ALBUM
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    #[default]
    Local,
    Remote,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverArt {
    pub data: Arc<[u8]>,
    pub mime: String,
}

impl CoverArt {
    pub fn new(data: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            data: Arc::from(data),
            mime: mime.into(),
        }
    }
}

pub fn canonical_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

pub fn canonical_key(path: impl AsRef<Path>) -> String {
    canonical_path(path.as_ref()).to_string_lossy().to_string()
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown Track".to_string())
}

#[cfg(test)]
mod tests {
    use super::{canonical_key, file_stem, Track, TrackSource, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
    use std::fs;
    use std::path::Path;

    #[test]
    fn fallback_uses_file_stem_and_unknowns() {
        let track = Track::fallback(Path::new("/music/Artist/01 Intro.mp3"));
        assert_eq!(track.title, "01 Intro");
        assert_eq!(track.artist, UNKNOWN_ARTIST);
        assert_eq!(track.album, UNKNOWN_ALBUM);
        assert_eq!(track.file_path, "/music/Artist/01 Intro.mp3");
        assert_eq!(track.source, TrackSource::Local);
        assert!(track.cover.is_none());
        assert!(!track.has_known_album());
    }

    #[test]
    fn canonical_key_resolves_dot_segments() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a");
        fs::create_dir(&nested).unwrap();
        let file = nested.join("song.mp3");
        fs::write(&file, b"").unwrap();

        let indirect = dir.path().join("a").join("..").join("a").join("song.mp3");
        assert_eq!(canonical_key(&file), canonical_key(&indirect));
    }

    #[test]
    fn canonical_key_keeps_missing_paths() {
        assert_eq!(canonical_key("/does/not/exist.mp3"), "/does/not/exist.mp3");
        assert_eq!(file_stem(Path::new("/x/")), "x");
    }
}
