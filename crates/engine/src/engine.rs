use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use common::{canonical_path, Track, ALL_TRACKS_ID};
use library::{
    project, resolve, resolve_paths, scan_library, Grouping, LibraryError, LibraryIndex,
    LibraryStats, ScanOptions, ScanResult, Sidebar, SidebarItem, SidebarKind, SortColumn,
    SortOrder, TrackList,
};
use metadata::{MetadataError, TagEdit, TagReader, TagWriter};
use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{resolve_music_root, resolve_playlists_dir, EngineConfig};
use crate::events::EngineEvent;
use crate::playlists::{PlaylistError, PlaylistStore};
use crate::state::EngineStatus;

#[derive(Clone, Debug)]
pub struct EngineOptions {
    pub music_root: PathBuf,
    pub playlists_dir: PathBuf,
    pub scan: ScanOptions,
    pub grouping: Grouping,
    pub scan_on_start: bool,
}

impl EngineOptions {
    pub fn from_config(config_path: &Path, config: &EngineConfig) -> Self {
        Self {
            music_root: resolve_music_root(config_path, &config.music_root),
            playlists_dir: resolve_playlists_dir(config_path, &config.playlists_path),
            scan: config.scan_options(),
            grouping: config.grouping,
            scan_on_start: config.scan_on_start,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanRequest {
    Started,
    Busy,
}

/// `indexed` is false when the re-tagged file is not part of the library.
#[derive(Clone, Debug, PartialEq)]
pub struct RetagOutcome {
    pub track: Track,
    pub indexed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaylistCommand {
    List,
    Create {
        name: String,
        icon_source: String,
    },
    Delete {
        name: String,
    },
    Edit {
        old_name: String,
        new_name: String,
        icon_source: String,
    },
    AddTrack {
        name: String,
        file_path: String,
    },
    RemoveTrack {
        name: String,
        file_path: String,
    },
}

#[derive(Debug)]
pub enum EngineError {
    Busy,
    Closed,
    Metadata(MetadataError),
    Playlist(PlaylistError),
    Unreadable(PathBuf),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Busy => write!(f, "a library scan is in progress"),
            EngineError::Closed => write!(f, "engine is not running"),
            EngineError::Metadata(err) => write!(f, "metadata error: {}", err),
            EngineError::Playlist(err) => write!(f, "playlist error: {}", err),
            EngineError::Unreadable(path) => write!(f, "cannot read tags: {}", path.display()),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<MetadataError> for EngineError {
    fn from(err: MetadataError) -> Self {
        EngineError::Metadata(err)
    }
}

impl From<PlaylistError> for EngineError {
    fn from(err: PlaylistError) -> Self {
        EngineError::Playlist(err)
    }
}

enum Command {
    Scan {
        root: Option<PathBuf>,
        reply: oneshot::Sender<ScanRequest>,
    },
    CancelScan,
    ScanFinished(ScanOutcome),
    SetGrouping(Grouping),
    LoadTracks {
        identifier: String,
        kind: SidebarKind,
        reply: oneshot::Sender<Vec<Track>>,
    },
    WriteTags {
        path: PathBuf,
        edit: TagEdit,
        reply: oneshot::Sender<Result<RetagOutcome, EngineError>>,
    },
    SortTracks {
        column: SortColumn,
        order: SortOrder,
    },
    Stats {
        reply: oneshot::Sender<LibraryStats>,
    },
    Playlist {
        command: PlaylistCommand,
        reply: oneshot::Sender<Result<Vec<SidebarItem>, EngineError>>,
    },
    Shutdown,
}

enum ScanOutcome {
    Completed(ScanResult),
    Cancelled,
    Failed(String),
}

struct ActiveScan {
    root: PathBuf,
    cancel: CancellationToken,
}

pub fn start_engine(
    options: EngineOptions,
    reader: Arc<dyn TagReader>,
    writer: Arc<dyn TagWriter>,
) -> (EngineHandle, mpsc::UnboundedReceiver<EngineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (events, events_rx) = mpsc::unbounded_channel();
    let status = Arc::new(RwLock::new(EngineStatus::Idle));

    let coordinator = Coordinator {
        index: LibraryIndex::new(options.grouping),
        sidebar: Sidebar::default(),
        track_list: TrackList::default(),
        playlists: PlaylistStore::new(options.playlists_dir),
        music_root: options.music_root,
        scan_options: options.scan,
        scan_on_start: options.scan_on_start,
        scan: None,
        reader,
        writer,
        inbox: tx.downgrade(),
        events,
        status: Arc::clone(&status),
    };
    tokio::spawn(coordinator.run(rx));

    (EngineHandle { tx, status }, events_rx)
}

#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Command>,
    status: Arc<RwLock<EngineStatus>>,
}

impl EngineHandle {
    pub async fn scan(&self, root: impl Into<PathBuf>) -> Result<ScanRequest, EngineError> {
        let root = Some(root.into());
        self.request(|reply| Command::Scan { root, reply }).await
    }

    pub async fn scan_default(&self) -> Result<ScanRequest, EngineError> {
        self.request(|reply| Command::Scan { root: None, reply })
            .await
    }

    pub fn cancel_scan(&self) -> Result<(), EngineError> {
        self.send(Command::CancelScan)
    }

    pub fn set_grouping(&self, grouping: Grouping) -> Result<(), EngineError> {
        self.send(Command::SetGrouping(grouping))
    }

    pub async fn load_tracks(
        &self,
        identifier: impl Into<String>,
        kind: SidebarKind,
    ) -> Result<Vec<Track>, EngineError> {
        let identifier = identifier.into();
        self.request(|reply| Command::LoadTracks {
            identifier,
            kind,
            reply,
        })
        .await
    }

    pub async fn write_tags(
        &self,
        path: impl Into<PathBuf>,
        edit: TagEdit,
    ) -> Result<RetagOutcome, EngineError> {
        let path = path.into();
        self.request(|reply| Command::WriteTags { path, edit, reply })
            .await?
    }

    pub fn sort_tracks(&self, column: SortColumn, order: SortOrder) -> Result<(), EngineError> {
        self.send(Command::SortTracks { column, order })
    }

    pub async fn stats(&self) -> Result<LibraryStats, EngineError> {
        self.request(|reply| Command::Stats { reply }).await
    }

    pub async fn playlist(&self, command: PlaylistCommand) -> Result<Vec<SidebarItem>, EngineError> {
        self.request(|reply| Command::Playlist { command, reply })
            .await?
    }

    pub fn status(&self) -> EngineStatus {
        self.status.read().clone()
    }

    pub fn is_scanning(&self) -> bool {
        self.status.read().is_scanning()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }

    fn send(&self, command: Command) -> Result<(), EngineError> {
        self.tx.send(command).map_err(|_| EngineError::Closed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(build(reply))?;
        rx.await.map_err(|_| EngineError::Closed)
    }
}

struct Coordinator {
    index: LibraryIndex,
    sidebar: Sidebar,
    track_list: TrackList,
    playlists: PlaylistStore,
    music_root: PathBuf,
    scan_options: ScanOptions,
    scan_on_start: bool,
    scan: Option<ActiveScan>,
    reader: Arc<dyn TagReader>,
    writer: Arc<dyn TagWriter>,
    inbox: mpsc::WeakUnboundedSender<Command>,
    events: mpsc::UnboundedSender<EngineEvent>,
    status: Arc<RwLock<EngineStatus>>,
}

impl Coordinator {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Command>) {
        info!("Engine started (music root {:?})", self.music_root);
        if self.scan_on_start {
            let root = self.music_root.clone();
            self.start_scan(root);
        }
        while let Some(command) = inbox.recv().await {
            if !self.handle(command) {
                break;
            }
        }
        if let Some(scan) = self.scan.take() {
            scan.cancel.cancel();
        }
        *self.status.write() = EngineStatus::Stopped;
        info!("Engine stopped");
    }

    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Scan { root, reply } => {
                let root = root.unwrap_or_else(|| self.music_root.clone());
                let _ = reply.send(self.start_scan(root));
            }
            Command::CancelScan => self.cancel_scan(),
            Command::ScanFinished(outcome) => self.finish_scan(outcome),
            Command::SetGrouping(grouping) => self.set_grouping(grouping),
            Command::LoadTracks {
                identifier,
                kind,
                reply,
            } => {
                let _ = reply.send(self.load_tracks(&identifier, kind));
            }
            Command::WriteTags { path, edit, reply } => {
                let _ = reply.send(self.write_tags(&path, &edit));
            }
            Command::SortTracks { column, order } => {
                if self.track_list.sort_by(column, order) {
                    self.emit_track_list();
                }
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.index.stats());
            }
            Command::Playlist { command, reply } => {
                let _ = reply.send(self.playlist(command));
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    fn start_scan(&mut self, root: PathBuf) -> ScanRequest {
        if self.scan.is_some() {
            info!("Scan already running; ignoring request for {:?}", root);
            return ScanRequest::Busy;
        }
        let Some(inbox) = self.inbox.upgrade() else {
            warn!("Engine inbox closed; not scanning {:?}", root);
            return ScanRequest::Busy;
        };

        info!("Library scan started: {:?}", root);
        if self.sidebar.clear() {
            self.emit(EngineEvent::SidebarItemsChanged(Vec::new()));
        }
        self.emit(EngineEvent::LoadingProgress {
            current: 0,
            total: 1,
        });
        self.emit(EngineEvent::ScanStateChanged(true));
        if self.track_list.clear() {
            self.emit_track_list();
        }
        *self.status.write() = EngineStatus::Scanning {
            root: root.clone(),
            started: SystemTime::now(),
        };

        let cancel = CancellationToken::new();
        self.scan = Some(ActiveScan {
            root: root.clone(),
            cancel: cancel.clone(),
        });

        let reader = Arc::clone(&self.reader);
        let options = self.scan_options.clone();
        let events = self.events.clone();
        let worker = tokio::task::spawn_blocking(move || {
            scan_library(&root, reader.as_ref(), &options, &cancel, |progress| {
                let _ = events.send(EngineEvent::LoadingProgress {
                    current: progress.current,
                    total: progress.total,
                });
            })
        });

        tokio::spawn(async move {
            let outcome = match worker.await {
                Ok(Ok(result)) => ScanOutcome::Completed(result),
                Ok(Err(LibraryError::Cancelled)) => ScanOutcome::Cancelled,
                Ok(Err(err)) => ScanOutcome::Failed(err.to_string()),
                Err(err) => ScanOutcome::Failed(format!("scan worker failed: {}", err)),
            };
            let _ = inbox.send(Command::ScanFinished(outcome));
        });

        ScanRequest::Started
    }

    fn cancel_scan(&mut self) {
        match &self.scan {
            Some(scan) => {
                info!("Cancelling scan of {:?}", scan.root);
                scan.cancel.cancel();
            }
            None => debug!("No scan to cancel"),
        }
    }

    fn finish_scan(&mut self, outcome: ScanOutcome) {
        let Some(scan) = self.scan.take() else {
            warn!("Scan completion arrived with no scan running");
            return;
        };

        match outcome {
            ScanOutcome::Completed(result) => {
                let stats = self.index.rebuild(result);
                info!(
                    "Library scan finished: {} artists, {} albums, {} tracks",
                    stats.artists, stats.albums, stats.tracks
                );
                self.publish_sidebar();
                let tracks = self.index.tracks().to_vec();
                self.emit(EngineEvent::TracksReady(tracks.clone()));
                self.track_list.replace(tracks);
                self.emit_track_list();
                *self.status.write() = EngineStatus::Ready(stats);
                self.emit(EngineEvent::ScanStateChanged(false));
                self.emit(EngineEvent::LoadingProgress {
                    current: stats.tracks,
                    total: stats.tracks,
                });
            }
            ScanOutcome::Cancelled => {
                info!("Library scan of {:?} cancelled", scan.root);
                self.settle_without_result();
            }
            ScanOutcome::Failed(message) => {
                warn!("Library scan of {:?} failed: {}", scan.root, message);
                self.emit(EngineEvent::LoadingError(message));
                self.settle_without_result();
            }
        }
    }

    // index untouched; the sidebar cleared at scan start comes back
    fn settle_without_result(&mut self) {
        self.publish_sidebar();
        *self.status.write() = if self.index.is_populated() {
            EngineStatus::Ready(self.index.stats())
        } else {
            EngineStatus::Idle
        };
        self.emit(EngineEvent::ScanStateChanged(false));
        self.emit(EngineEvent::LoadingProgress {
            current: 0,
            total: 0,
        });
    }

    fn set_grouping(&mut self, grouping: Grouping) {
        if !self.index.set_grouping(grouping) {
            debug!("Grouping already {}", grouping.as_str());
            return;
        }
        info!("Grouping set to {}", grouping.as_str());
        // the sidebar stays cleared until the running scan completes
        if self.scan.is_none() {
            self.publish_sidebar();
        }
    }

    fn publish_sidebar(&mut self) {
        let items = project(&self.index);
        if self.sidebar.publish(items) {
            self.emit(EngineEvent::SidebarItemsChanged(self.sidebar.items().to_vec()));
        }
    }

    fn emit_track_list(&self) {
        let (column, order) = self.track_list.criteria();
        self.emit(EngineEvent::TrackListChanged {
            tracks: self.track_list.tracks().to_vec(),
            column,
            order,
        });
    }

    fn load_tracks(&mut self, identifier: &str, kind: SidebarKind) -> Vec<Track> {
        let tracks = match kind {
            _ if identifier == ALL_TRACKS_ID => resolve(&self.index, identifier, kind),
            SidebarKind::Playlist => match self.playlists.tracks(identifier) {
                Ok(paths) => resolve_paths(&self.index, &paths),
                Err(err) => {
                    warn!("Failed to load playlist {}: {}", identifier, err);
                    self.emit(EngineEvent::LoadingError(err.to_string()));
                    Vec::new()
                }
            },
            _ => resolve(&self.index, identifier, kind),
        };
        debug!(
            "Resolved {} tracks for {} {:?}",
            tracks.len(),
            kind.as_str(),
            identifier
        );

        self.emit(EngineEvent::TracksReady(tracks.clone()));
        self.track_list.replace(tracks);
        self.emit_track_list();
        self.track_list.tracks().to_vec()
    }

    fn write_tags(&mut self, path: &Path, edit: &TagEdit) -> Result<RetagOutcome, EngineError> {
        if self.scan.is_some() {
            info!("Rejecting re-tag of {:?} while a scan is running", path);
            return Err(EngineError::Busy);
        }
        if let Err(err) = self.writer.write(path, edit) {
            warn!("Failed to write tags for {:?}: {}", path, err);
            self.emit(EngineEvent::LoadingError(err.to_string()));
            return Err(err.into());
        }

        let path = canonical_path(path);
        let track = match self.reader.read(&path) {
            Some(track) if !track.file_path.is_empty() => track,
            _ => {
                let err = EngineError::Unreadable(path);
                self.emit(EngineEvent::LoadingError(err.to_string()));
                return Err(err);
            }
        };

        let (track, indexed) = match self.index.update_one(track.clone()) {
            Ok(position) => {
                self.publish_sidebar();
                *self.status.write() = EngineStatus::Ready(self.index.stats());
                (self.index.track(position).cloned().unwrap_or(track), true)
            }
            Err(err) => {
                warn!("Re-tagged file is outside the library: {}", err);
                (track, false)
            }
        };

        if self.track_list.update_track(&track) {
            self.emit_track_list();
        }
        self.emit(EngineEvent::TrackUpdated(track.clone()));
        info!("Re-tagged {}", track.file_path);
        Ok(RetagOutcome { track, indexed })
    }

    fn playlist(&mut self, command: PlaylistCommand) -> Result<Vec<SidebarItem>, EngineError> {
        let mutating = command != PlaylistCommand::List;
        let result = match command {
            PlaylistCommand::List => Ok(()),
            PlaylistCommand::Create { name, icon_source } => {
                self.playlists.create(&name, &icon_source).map(drop)
            }
            PlaylistCommand::Delete { name } => self.playlists.delete(&name),
            PlaylistCommand::Edit {
                old_name,
                new_name,
                icon_source,
            } => self
                .playlists
                .edit(&old_name, &new_name, &icon_source)
                .map(drop),
            PlaylistCommand::AddTrack { name, file_path } => {
                self.playlists.add_track(&name, &file_path).map(drop)
            }
            PlaylistCommand::RemoveTrack { name, file_path } => {
                self.playlists.remove_track(&name, &file_path).map(drop)
            }
        };
        if let Err(err) = result {
            warn!("Playlist operation failed: {}", err);
            self.emit(EngineEvent::LoadingError(err.to_string()));
            return Err(err.into());
        }

        let items = self.playlists.list()?;
        if mutating {
            self.emit(EngineEvent::PlaylistsChanged(items.clone()));
        }
        Ok(items)
    }
}
