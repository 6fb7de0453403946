use common::Track;
use library::{SidebarItem, SortColumn, SortOrder};

#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    ScanStateChanged(bool),
    LoadingProgress { current: usize, total: usize },
    SidebarItemsChanged(Vec<SidebarItem>),
    TracksReady(Vec<Track>),
    TrackListChanged {
        tracks: Vec<Track>,
        column: SortColumn,
        order: SortOrder,
    },
    TrackUpdated(Track),
    PlaylistsChanged(Vec<SidebarItem>),
    LoadingError(String),
}
