use std::collections::{BTreeMap, BTreeSet, HashMap};

use common::{canonical_key, Track};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::artists::split_artist_name;
use crate::scan::ScanResult;
use crate::{LibraryError, LibraryStats};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    #[default]
    Artists,
    Albums,
    #[serde(alias = "none")]
    All,
}

impl Grouping {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "artists" | "artist" => Some(Self::Artists),
            "albums" | "album" => Some(Self::Albums),
            "all" | "none" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artists => "artists",
            Self::Albums => "albums",
            Self::All => "all",
        }
    }
}

// positions are offsets into `tracks`, valid until the next rebuild
#[derive(Debug, Default)]
pub struct LibraryIndex {
    tracks: Vec<Track>,
    artist_index: BTreeMap<String, BTreeSet<usize>>,
    album_index: BTreeMap<String, BTreeSet<usize>>,
    album_track_counts: BTreeMap<String, usize>,
    positions_by_path: HashMap<String, usize>,
    grouping: Grouping,
    populated: bool,
}

impl LibraryIndex {
    pub fn new(grouping: Grouping) -> Self {
        Self {
            grouping,
            ..Self::default()
        }
    }

    pub fn rebuild(&mut self, result: ScanResult) -> LibraryStats {
        self.tracks = result.tracks;
        self.artist_index.clear();
        self.album_index.clear();
        self.album_track_counts.clear();
        self.positions_by_path.clear();

        for position in 0..self.tracks.len() {
            self.index_position(position);
            self.positions_by_path
                .entry(self.tracks[position].file_path.clone())
                .or_insert(position);
        }
        for (album, positions) in &self.album_index {
            self.album_track_counts
                .insert(album.clone(), positions.len());
        }
        self.populated = true;

        let stats = self.stats();
        info!(
            "Library index rebuilt: {} tracks, {} artists, {} albums",
            stats.tracks, stats.artists, stats.albums
        );
        stats
    }

    pub fn update_one(&mut self, mut track: Track) -> Result<usize, LibraryError> {
        let position = self
            .position_of(&track.file_path)
            .ok_or_else(|| LibraryError::TrackNotFound(track.file_path.clone()))?;

        track.file_path = self.tracks[position].file_path.clone();
        let old_album = self.tracks[position].album.clone();
        self.unindex_position(position);
        self.tracks[position] = track;
        self.index_position(position);

        let new_album = self.tracks[position].album.clone();
        self.refresh_album_count(&old_album);
        if new_album != old_album {
            self.refresh_album_count(&new_album);
        }
        debug!("Updated track {} at position {}", self.tracks[position].file_path, position);
        Ok(position)
    }

    pub fn position_of(&self, path: &str) -> Option<usize> {
        if let Some(position) = self.positions_by_path.get(path) {
            return Some(*position);
        }
        self.positions_by_path.get(&canonical_key(path)).copied()
    }

    pub fn track_by_path(&self, path: &str) -> Option<&Track> {
        self.position_of(path).map(|position| &self.tracks[position])
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, position: usize) -> Option<&Track> {
        self.tracks.get(position)
    }

    pub fn artist_index(&self) -> &BTreeMap<String, BTreeSet<usize>> {
        &self.artist_index
    }

    pub fn album_index(&self) -> &BTreeMap<String, BTreeSet<usize>> {
        &self.album_index
    }

    pub fn album_track_counts(&self) -> &BTreeMap<String, usize> {
        &self.album_track_counts
    }

    pub fn album_track_count(&self, album: &str) -> usize {
        self.album_track_counts.get(album).copied().unwrap_or(0)
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    pub fn set_grouping(&mut self, grouping: Grouping) -> bool {
        if self.grouping == grouping {
            return false;
        }
        self.grouping = grouping;
        true
    }

    /// False until the first scan completes.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn stats(&self) -> LibraryStats {
        LibraryStats {
            artists: self.artist_index.len(),
            albums: self.album_index.len(),
            tracks: self.tracks.len(),
        }
    }

    fn index_position(&mut self, position: usize) {
        let track = &self.tracks[position];
        for artist in split_artist_name(&track.artist) {
            self.artist_index.entry(artist).or_default().insert(position);
        }
        if track.has_known_album() {
            self.album_index
                .entry(track.album.clone())
                .or_default()
                .insert(position);
        }
    }

    fn unindex_position(&mut self, position: usize) {
        let track = &self.tracks[position];
        for artist in split_artist_name(&track.artist) {
            remove_position(&mut self.artist_index, &artist, position);
        }
        if track.has_known_album() {
            remove_position(&mut self.album_index, &track.album, position);
        }
    }

    fn refresh_album_count(&mut self, album: &str) {
        match self.album_index.get(album) {
            Some(positions) => {
                self.album_track_counts
                    .insert(album.to_string(), positions.len());
            }
            None => {
                self.album_track_counts.remove(album);
            }
        }
    }
}

fn remove_position(index: &mut BTreeMap<String, BTreeSet<usize>>, key: &str, position: usize) {
    if let Some(positions) = index.get_mut(key) {
        positions.remove(&position);
        if positions.is_empty() {
            index.remove(key);
        }
    }
}
