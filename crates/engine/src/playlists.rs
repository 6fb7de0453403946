use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use library::{Icon, SidebarItem, SidebarKind};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const CREATE_ITEM_NAME: &str = "Create";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon_source: String,
    #[serde(rename = "type", default = "playlist_kind")]
    pub kind: SidebarKind,
    #[serde(default)]
    pub tracks: Vec<String>,
}

fn playlist_kind() -> SidebarKind {
    SidebarKind::Playlist
}

impl Playlist {
    fn new(name: &str, icon_source: &str) -> Self {
        Self {
            id: name.to_string(),
            name: name.to_string(),
            icon_source: icon_source.to_string(),
            kind: SidebarKind::Playlist,
            tracks: Vec::new(),
        }
    }

    pub fn sidebar_item(&self) -> SidebarItem {
        SidebarItem {
            kind: SidebarKind::Playlist,
            name: self.name.clone(),
            id: self.name.clone(),
            icon: Icon::Custom(self.icon_source.clone()),
            count: self.tracks.len(),
        }
    }
}

#[derive(Debug)]
pub enum PlaylistError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidName(String),
    NotFound(String),
    AlreadyExists(String),
}

impl std::fmt::Display for PlaylistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaylistError::Io(err) => write!(f, "io error: {}", err),
            PlaylistError::Json(err) => write!(f, "json error: {}", err),
            PlaylistError::InvalidName(name) => write!(f, "invalid playlist name: {:?}", name),
            PlaylistError::NotFound(name) => write!(f, "playlist not found: {}", name),
            PlaylistError::AlreadyExists(name) => write!(f, "playlist already exists: {}", name),
        }
    }
}

impl std::error::Error for PlaylistError {}

impl From<std::io::Error> for PlaylistError {
    fn from(err: std::io::Error) -> Self {
        PlaylistError::Io(err)
    }
}

impl From<serde_json::Error> for PlaylistError {
    fn from(err: serde_json::Error) -> Self {
        PlaylistError::Json(err)
    }
}

/// Playlists stored as one `<name>.json` file each.
#[derive(Clone, Debug)]
pub struct PlaylistStore {
    dir: PathBuf,
}

impl PlaylistStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sidebar listing: the "Create" action first, then playlists by file name.
    /// Files that fail to parse are skipped.
    pub fn list(&self) -> Result<Vec<SidebarItem>, PlaylistError> {
        let mut items = vec![SidebarItem {
            kind: SidebarKind::CreatePlaylist,
            name: CREATE_ITEM_NAME.to_string(),
            id: CREATE_ITEM_NAME.to_string(),
            icon: Icon::AllTracks,
            count: 0,
        }];

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(items),
            Err(err) => return Err(err.into()),
        };
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        for file in files {
            match read_playlist(&file) {
                Ok(playlist) => items.push(playlist.sidebar_item()),
                Err(err) => warn!("Skipping playlist {:?}: {}", file, err),
            }
        }
        Ok(items)
    }

    pub fn load(&self, name: &str) -> Result<Playlist, PlaylistError> {
        let path = self.file_path(name)?;
        match read_playlist(&path) {
            Err(PlaylistError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                Err(PlaylistError::NotFound(name.to_string()))
            }
            other => other,
        }
    }

    pub fn create(&self, name: &str, icon_source: &str) -> Result<Playlist, PlaylistError> {
        let path = self.file_path(name)?;
        if path.exists() {
            return Err(PlaylistError::AlreadyExists(name.trim().to_string()));
        }
        let playlist = Playlist::new(name.trim(), icon_source);
        self.save(&playlist)?;
        info!("Created playlist {}", playlist.name);
        Ok(playlist)
    }

    pub fn delete(&self, name: &str) -> Result<(), PlaylistError> {
        let path = self.file_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted playlist {}", name.trim());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(PlaylistError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn edit(
        &self,
        old_name: &str,
        new_name: &str,
        icon_source: &str,
    ) -> Result<Playlist, PlaylistError> {
        let old_path = self.file_path(old_name)?;
        let new_path = self.file_path(new_name)?;
        let mut playlist = self.load(old_name)?;
        let renamed = old_path != new_path;
        if renamed && new_path.exists() {
            return Err(PlaylistError::AlreadyExists(new_name.trim().to_string()));
        }

        playlist.id = new_name.trim().to_string();
        playlist.name = new_name.trim().to_string();
        playlist.icon_source = icon_source.to_string();
        self.save(&playlist)?;
        if renamed {
            fs::remove_file(&old_path)?;
        }
        Ok(playlist)
    }

    pub fn add_track(&self, name: &str, file_path: &str) -> Result<usize, PlaylistError> {
        let mut playlist = self.load(name)?;
        playlist.tracks.push(file_path.to_string());
        self.save(&playlist)?;
        Ok(playlist.tracks.len())
    }

    pub fn remove_track(&self, name: &str, file_path: &str) -> Result<usize, PlaylistError> {
        let mut playlist = self.load(name)?;
        let before = playlist.tracks.len();
        playlist.tracks.retain(|track| track != file_path);
        let removed = before - playlist.tracks.len();
        if removed > 0 {
            self.save(&playlist)?;
        }
        Ok(removed)
    }

    pub fn tracks(&self, name: &str) -> Result<Vec<String>, PlaylistError> {
        Ok(self.load(name)?.tracks)
    }

    fn save(&self, playlist: &Playlist) -> Result<(), PlaylistError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.file_path(&playlist.name)?;
        let contents = serde_json::to_vec_pretty(playlist)?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn file_path(&self, name: &str) -> Result<PathBuf, PlaylistError> {
        let trimmed = name.trim();
        if trimmed.is_empty()
            || trimmed == "."
            || trimmed == ".."
            || trimmed.contains(['/', '\\'])
        {
            return Err(PlaylistError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", trimmed)))
    }
}

fn read_playlist(path: &Path) -> Result<Playlist, PlaylistError> {
    let contents = fs::read(path)?;
    Ok(serde_json::from_slice(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, PlaylistStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().join("playlists"));
        (dir, store)
    }

    fn names(items: &[SidebarItem]) -> Vec<(&str, usize)> {
        items.iter().map(|item| (item.name.as_str(), item.count)).collect()
    }

    #[test]
    fn missing_directory_lists_create_item_only() {
        let (_dir, store) = store();
        let items = store.list().unwrap();
        assert_eq!(names(&items), vec![("Create", 0)]);
        assert_eq!(items[0].kind, SidebarKind::CreatePlaylist);
    }

    #[test]
    fn crud_round_trip() {
        let (_dir, store) = store();
        store.create("Road Trip", "file:///covers/road.png").unwrap();
        store.create("Chill", "").unwrap();
        assert_eq!(store.add_track("Chill", "/m/a.mp3").unwrap(), 1);
        assert_eq!(store.add_track("Chill", "/m/b.mp3").unwrap(), 2);

        let items = store.list().unwrap();
        assert_eq!(names(&items), vec![("Create", 0), ("Chill", 2), ("Road Trip", 0)]);
        assert_eq!(items[2].icon.source(), "file:///covers/road.png");
        assert_eq!(items[1].kind, SidebarKind::Playlist);

        store.delete("Road Trip").unwrap();
        assert_eq!(names(&store.list().unwrap()), vec![("Create", 0), ("Chill", 2)]);
        assert!(matches!(
            store.delete("Road Trip"),
            Err(PlaylistError::NotFound(_))
        ));
    }

    #[test]
    fn stored_file_uses_playlist_shape() {
        let (_dir, store) = store();
        store.create("Mix", "icon.png").unwrap();
        store.add_track("Mix", "/m/a.mp3").unwrap();

        let raw = fs::read_to_string(store.dir().join("Mix.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["id"], "Mix");
        assert_eq!(value["name"], "Mix");
        assert_eq!(value["iconSource"], "icon.png");
        assert_eq!(value["type"], "local_playlist");
        assert_eq!(value["tracks"][0], "/m/a.mp3");
    }

    #[test]
    fn remove_track_drops_every_occurrence() {
        let (_dir, store) = store();
        store.create("Mix", "").unwrap();
        for path in ["/m/a.mp3", "/m/b.mp3", "/m/a.mp3"] {
            store.add_track("Mix", path).unwrap();
        }
        assert_eq!(store.remove_track("Mix", "/m/a.mp3").unwrap(), 2);
        assert_eq!(store.tracks("Mix").unwrap(), vec!["/m/b.mp3".to_string()]);
        assert_eq!(store.remove_track("Mix", "/m/zzz.mp3").unwrap(), 0);
    }

    #[test]
    fn edit_renames_and_refuses_to_overwrite() {
        let (_dir, store) = store();
        store.create("Old", "a.png").unwrap();
        store.add_track("Old", "/m/a.mp3").unwrap();
        store.create("Taken", "").unwrap();

        assert!(matches!(
            store.edit("Old", "Taken", "b.png"),
            Err(PlaylistError::AlreadyExists(_))
        ));
        assert_eq!(store.load("Taken").unwrap().tracks.len(), 0);

        let renamed = store.edit("Old", "New", "b.png").unwrap();
        assert_eq!(renamed.name, "New");
        assert_eq!(renamed.icon_source, "b.png");
        assert_eq!(renamed.tracks, vec!["/m/a.mp3".to_string()]);
        assert!(!store.dir().join("Old.json").exists());
        assert!(matches!(store.load("Old"), Err(PlaylistError::NotFound(_))));

        let same = store.edit("New", "New", "c.png").unwrap();
        assert_eq!(same.icon_source, "c.png");
    }

    #[test]
    fn rejects_bad_names_and_duplicates() {
        let (_dir, store) = store();
        for name in ["", "   ", "a/b", "..", "a\\b"] {
            assert!(matches!(
                store.create(name, ""),
                Err(PlaylistError::InvalidName(_))
            ));
        }
        store.create("Mix", "").unwrap();
        assert!(matches!(
            store.create("Mix", ""),
            Err(PlaylistError::AlreadyExists(_))
        ));
    }

    #[test]
    fn corrupt_files_are_skipped() {
        let (_dir, store) = store();
        store.create("Good", "").unwrap();
        fs::write(store.dir().join("bad.json"), b"{not json").unwrap();
        fs::write(store.dir().join("notes.txt"), b"x").unwrap();
        assert_eq!(names(&store.list().unwrap()), vec![("Create", 0), ("Good", 0)]);
    }
}
