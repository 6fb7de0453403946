use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use common::{canonical_path, Track};
use metadata::TagReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::artists::split_artist_name;
use crate::walk::{collect_audio_files, DEFAULT_EXTENSIONS};
use crate::LibraryError;

#[derive(Clone, Debug)]
pub struct ScanOptions {
    pub extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanProgress {
    pub current: usize,
    pub total: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanResult {
    pub tracks: Vec<Track>,
    pub artists: BTreeSet<String>,
    pub albums: BTreeSet<String>,
    pub album_track_counts: BTreeMap<String, usize>,
}

impl ScanResult {
    pub fn push(&mut self, track: Track) {
        for artist in split_artist_name(&track.artist) {
            self.artists.insert(artist);
        }
        if track.has_known_album() {
            self.albums.insert(track.album.clone());
            *self
                .album_track_counts
                .entry(track.album.clone())
                .or_insert(0) += 1;
        }
        self.tracks.push(track);
    }
}

impl FromIterator<Track> for ScanResult {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        let mut result = ScanResult::default();
        for track in iter {
            result.push(track);
        }
        result
    }
}

pub fn scan_library<F>(
    root: &Path,
    reader: &dyn TagReader,
    options: &ScanOptions,
    cancel: &CancellationToken,
    mut progress: F,
) -> Result<ScanResult, LibraryError>
where
    F: FnMut(ScanProgress),
{
    let files = collect_audio_files(root, &options.extensions, cancel)?;
    info!("Found {} audio files under {:?}", files.len(), root);

    let mut result = ScanResult::default();
    if files.is_empty() {
        warn!("No audio files found under {:?}", root);
        return Ok(result);
    }

    let total = files.len();
    result.tracks.reserve(total);
    for (index, file) in files.into_iter().enumerate() {
        if cancel.is_cancelled() {
            info!("Scan of {:?} cancelled after {} files", root, index);
            return Err(LibraryError::Cancelled);
        }

        let path = canonical_path(&file);
        match reader.read(&path) {
            Some(track) if !track.file_path.is_empty() => result.push(track),
            _ => debug!("Skipping unreadable file {:?}", path),
        }
        progress(ScanProgress {
            current: index + 1,
            total,
        });
    }

    info!(
        "Read tags: {} tracks, {} artists, {} albums",
        result.tracks.len(),
        result.artists.len(),
        result.albums.len()
    );
    Ok(result)
}
