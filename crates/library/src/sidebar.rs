use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use common::{CoverArt, ALL_TRACKS_ID};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::index::{Grouping, LibraryIndex};

pub const ALL_TRACKS_NAME: &str = "All Tracks";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SidebarKind {
    #[serde(rename = "local_all")]
    All,
    #[serde(rename = "local_artist")]
    Artist,
    #[serde(rename = "local_album")]
    Album,
    #[serde(rename = "local_playlist")]
    Playlist,
    #[serde(rename = "create_playlist")]
    CreatePlaylist,
}

impl SidebarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "local_all",
            Self::Artist => "local_artist",
            Self::Album => "local_album",
            Self::Playlist => "local_playlist",
            Self::CreatePlaylist => "create_playlist",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Icon {
    AllTracks,
    Artist,
    Album,
    Custom(String),
    Cover(CoverArt),
}

impl Icon {
    pub fn source(&self) -> String {
        match self {
            Icon::AllTracks => "qrc:/icons/all_tracks_icon.png".to_string(),
            Icon::Artist => "qrc:/icons/artist_icon.png".to_string(),
            Icon::Album => "qrc:/icons/album_icon.png".to_string(),
            Icon::Custom(source) => source.clone(),
            Icon::Cover(cover) => {
                format!("data:{};base64,{}", cover.mime, STANDARD.encode(&cover.data))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarItem {
    pub kind: SidebarKind,
    pub name: String,
    pub id: String,
    pub icon: Icon,
    pub count: usize,
}

pub fn project(index: &LibraryIndex) -> Vec<SidebarItem> {
    let mut items = Vec::new();
    if index.tracks().is_empty() {
        return items;
    }

    items.push(SidebarItem {
        kind: SidebarKind::All,
        name: ALL_TRACKS_NAME.to_string(),
        id: ALL_TRACKS_ID.to_string(),
        icon: Icon::AllTracks,
        count: index.tracks().len(),
    });

    match index.grouping() {
        Grouping::Artists => {
            let mut artists: Vec<_> = index.artist_index().iter().collect();
            artists.sort_by_cached_key(|(name, _)| name.to_lowercase());
            for (name, positions) in artists {
                items.push(SidebarItem {
                    kind: SidebarKind::Artist,
                    name: name.clone(),
                    id: name.clone(),
                    icon: Icon::Artist,
                    count: positions.len(),
                });
            }
        }
        Grouping::Albums => {
            let mut albums: Vec<_> = index
                .album_index()
                .iter()
                .filter(|(name, _)| index.album_track_count(name) > 1)
                .collect();
            albums.sort_by_cached_key(|(name, _)| name.to_lowercase());
            for (name, positions) in albums {
                let cover = positions
                    .iter()
                    .next()
                    .and_then(|position| index.track(*position))
                    .and_then(|track| track.cover.clone());
                items.push(SidebarItem {
                    kind: SidebarKind::Album,
                    name: name.clone(),
                    id: name.clone(),
                    icon: cover.map(Icon::Cover).unwrap_or(Icon::Album),
                    count: index.album_track_count(name),
                });
            }
        }
        Grouping::All => {}
    }

    debug!(
        "Built sidebar for grouping {}: {} items",
        index.grouping().as_str(),
        items.len()
    );
    items
}

/// Last published sidebar. Observers are only notified on a value change.
#[derive(Debug, Default)]
pub struct Sidebar {
    items: Vec<SidebarItem>,
}

impl Sidebar {
    pub fn items(&self) -> &[SidebarItem] {
        &self.items
    }

    pub fn publish(&mut self, items: Vec<SidebarItem>) -> bool {
        if self.items == items {
            return false;
        }
        self.items = items;
        true
    }

    pub fn clear(&mut self) -> bool {
        self.publish(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ScanResult;
    use common::{Track, UNKNOWN_ALBUM};
    use std::path::Path;

    fn track(path: &str, artist: &str, album: &str) -> Track {
        let mut track = Track::fallback(Path::new(path));
        track.artist = artist.to_string();
        track.album = album.to_string();
        track
    }

    fn scenario(grouping: Grouping) -> LibraryIndex {
        let mut index = LibraryIndex::new(grouping);
        let result: ScanResult = vec![
            track("/music/s1.mp3", "X & Y", "AlbumA"),
            track("/music/s2.mp3", "X", "AlbumA"),
            track("/music/s3.mp3", "Z", UNKNOWN_ALBUM),
            track("/music/s4.mp3", "y", "Single"),
        ]
        .into_iter()
        .collect();
        index.rebuild(result);
        index
    }

    fn names(items: &[SidebarItem]) -> Vec<(&str, usize)> {
        items.iter().map(|item| (item.name.as_str(), item.count)).collect()
    }

    #[test]
    fn empty_index_projects_nothing() {
        let index = LibraryIndex::default();
        assert!(project(&index).is_empty());
    }

    #[test]
    fn artists_sorted_case_insensitively() {
        let items = project(&scenario(Grouping::Artists));
        assert_eq!(
            names(&items),
            vec![("All Tracks", 4), ("X", 2), ("Y", 1), ("y", 1), ("Z", 1)]
        );
        assert_eq!(items[0].kind, SidebarKind::All);
        assert_eq!(items[0].id, ALL_TRACKS_ID);
        assert_eq!(items[1].icon, Icon::Artist);
    }

    #[test]
    fn albums_hide_single_track_albums() {
        let items = project(&scenario(Grouping::Albums));
        assert_eq!(names(&items), vec![("All Tracks", 4), ("AlbumA", 2)]);
        assert_eq!(items[1].kind, SidebarKind::Album);
        assert_eq!(items[1].icon, Icon::Album);
    }

    #[test]
    fn album_icon_uses_first_track_cover() {
        let mut index = LibraryIndex::new(Grouping::Albums);
        let mut first = track("/music/a.mp3", "X", "AlbumA");
        first.cover = Some(CoverArt::new(vec![1, 2, 3], "image/png"));
        let second = track("/music/b.mp3", "X", "AlbumA");
        index.rebuild(vec![first, second].into_iter().collect());

        let items = project(&index);
        assert_eq!(items[1].icon.source(), "data:image/png;base64,AQID");
    }

    #[test]
    fn flat_grouping_only_lists_all_tracks() {
        let items = project(&scenario(Grouping::All));
        assert_eq!(names(&items), vec![("All Tracks", 4)]);
    }

    #[test]
    fn publish_reports_value_changes_only() {
        let index = scenario(Grouping::Artists);
        let mut sidebar = Sidebar::default();
        assert!(!sidebar.clear());
        assert!(sidebar.publish(project(&index)));
        assert!(!sidebar.publish(project(&index)));
        assert!(sidebar.clear());
        assert!(sidebar.items().is_empty());
    }

    #[test]
    fn three_track_library_under_albums() {
        let mut index = LibraryIndex::new(Grouping::Albums);
        index.rebuild(
            vec![
                track("/music/s1.mp3", "X & Y", "AlbumA"),
                track("/music/s2.mp3", "X", "AlbumA"),
                track("/music/s3.mp3", "Z", UNKNOWN_ALBUM),
            ]
            .into_iter()
            .collect(),
        );
        assert_eq!(
            names(&project(&index)),
            vec![("All Tracks", 3), ("AlbumA", 2)]
        );
    }
}
