pub mod config;
pub mod engine;
pub mod events;
pub mod playlists;
pub mod state;
pub mod volume;

pub use config::{
    config_path_from_env, load_or_create_config, save_config, ConfigError, EngineConfig,
};
pub use engine::{
    start_engine, EngineError, EngineHandle, EngineOptions, PlaylistCommand, RetagOutcome,
    ScanRequest,
};
pub use events::EngineEvent;
pub use playlists::{Playlist, PlaylistError, PlaylistStore};
pub use state::EngineStatus;
pub use volume::VolumeControl;
