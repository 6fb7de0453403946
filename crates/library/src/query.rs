use std::collections::BTreeSet;

use common::{Track, ALL_TRACKS_ID};
use tracing::debug;

use crate::index::LibraryIndex;
use crate::sidebar::SidebarKind;

/// Tracks behind one sidebar selection, in index order. Playlists go through
/// [`resolve_paths`] instead.
pub fn resolve(index: &LibraryIndex, identifier: &str, kind: SidebarKind) -> Vec<Track> {
    if !index.is_populated() {
        debug!("No scan has completed; nothing to resolve for {:?}", identifier);
        return Vec::new();
    }
    if kind == SidebarKind::All || identifier == ALL_TRACKS_ID {
        return index.tracks().to_vec();
    }

    let positions = match kind {
        SidebarKind::Artist => index.artist_index().get(identifier),
        SidebarKind::Album => index.album_index().get(identifier),
        _ => None,
    };
    match positions {
        Some(positions) => collect(index, positions),
        None => {
            debug!("No {} named {:?}", kind.as_str(), identifier);
            Vec::new()
        }
    }
}

pub fn resolve_paths(index: &LibraryIndex, paths: &[String]) -> Vec<Track> {
    paths
        .iter()
        .filter_map(|path| {
            let track = index.track_by_path(path);
            if track.is_none() {
                debug!("Playlist entry {} is not in the library", path);
            }
            track.cloned()
        })
        .collect()
}

fn collect(index: &LibraryIndex, positions: &BTreeSet<usize>) -> Vec<Track> {
    positions
        .iter()
        .filter_map(|position| index.track(*position).cloned())
        .collect()
}
