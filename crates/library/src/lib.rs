use serde::{Deserialize, Serialize};

pub mod artists;
pub mod index;
pub mod query;
pub mod scan;
pub mod sidebar;
pub mod tracklist;
pub mod walk;

pub use artists::split_artist_name;
pub use index::{Grouping, LibraryIndex};
pub use query::{resolve, resolve_paths};
pub use scan::{scan_library, ScanOptions, ScanProgress, ScanResult};
pub use sidebar::{project, Icon, Sidebar, SidebarItem, SidebarKind};
pub use tracklist::{SortColumn, SortOrder, TrackList};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub artists: usize,
    pub albums: usize,
    pub tracks: usize,
}

#[derive(Debug)]
pub enum LibraryError {
    Cancelled,
    TrackNotFound(String),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::Cancelled => write!(f, "scan cancelled"),
            LibraryError::TrackNotFound(path) => write!(f, "track not in library: {}", path),
        }
    }
}

impl std::error::Error for LibraryError {}
