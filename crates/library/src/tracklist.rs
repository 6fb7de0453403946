use std::cmp::Ordering;

use common::{canonical_key, Track};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    None,
    Title,
    ArtistAlbum,
    Album,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Default)]
pub struct TrackList {
    tracks: Vec<Track>,
    column: SortColumn,
    order: SortOrder,
}

impl TrackList {
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn criteria(&self) -> (SortColumn, SortOrder) {
        (self.column, self.order)
    }

    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.apply_sort();
    }

    /// Returns whether anything was shown.
    pub fn clear(&mut self) -> bool {
        let had_tracks = !self.tracks.is_empty();
        self.tracks.clear();
        had_tracks
    }

    pub fn sort_by(&mut self, column: SortColumn, order: SortOrder) -> bool {
        if self.column == column && self.order == order {
            return false;
        }
        self.column = column;
        self.order = order;
        self.apply_sort();
        true
    }

    pub fn update_track(&mut self, track: &Track) -> bool {
        let key = canonical_key(&track.file_path);
        let slot = self
            .tracks
            .iter_mut()
            .find(|shown| shown.file_path == track.file_path || shown.file_path == key);
        match slot {
            Some(slot) => {
                let file_path = std::mem::take(&mut slot.file_path);
                *slot = Track {
                    file_path,
                    ..track.clone()
                };
                self.apply_sort();
                true
            }
            None => {
                warn!("Track {} is not in the displayed list", track.file_path);
                false
            }
        }
    }

    fn apply_sort(&mut self) {
        if self.column == SortColumn::None || self.tracks.is_empty() {
            return;
        }
        let (column, order) = (self.column, self.order);
        self.tracks.sort_by(|a, b| {
            let ordering = compare(a, b, column);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        debug!("Sorted {} tracks by {:?} {:?}", self.tracks.len(), column, order);
    }
}

fn compare(a: &Track, b: &Track, column: SortColumn) -> Ordering {
    match column {
        SortColumn::None => Ordering::Equal,
        SortColumn::Title => compare_text(&a.title, &b.title),
        SortColumn::ArtistAlbum => {
            compare_text(&a.artist, &b.artist).then_with(|| compare_text(&a.album, &b.album))
        }
        SortColumn::Album => compare_text(&a.album, &b.album),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
