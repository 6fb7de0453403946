use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use library::{Grouping, ScanOptions};
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;
pub const CONFIG_ENV: &str = "MUSIC_ENGINE_CONFIG";

const APP_DIR: &str = "music-engine";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub version: u32,
    pub music_root: String,
    pub playlists_path: String,
    pub extensions: Vec<String>,
    pub grouping: Grouping,
    pub scan_on_start: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            music_root: "".to_string(),
            playlists_path: "".to_string(),
            extensions: ScanOptions::default().extensions,
            grouping: Grouping::default(),
            scan_on_start: true,
        }
    }
}

impl EngineConfig {
    pub fn scan_options(&self) -> ScanOptions {
        if self.extensions.is_empty() {
            return ScanOptions::default();
        }
        ScanOptions {
            extensions: self.extensions.clone(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

pub fn config_path_from_env() -> PathBuf {
    match env::var(CONFIG_ENV) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default_config_path(),
    }
}

fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config.yaml")),
        Err(_) => PathBuf::from("config.yaml"),
    }
}

/// Loads the config, writing defaults first if the file is missing.
/// The flag reports whether the file was created.
pub fn load_or_create_config(path: &Path) -> Result<(EngineConfig, bool), ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let mut config: EngineConfig = serde_yaml::from_str(&contents)?;
        if config.version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
        }
        config
            .extensions
            .retain(|ext| !ext.trim().trim_start_matches('.').is_empty());
        if config.extensions.is_empty() {
            config.extensions = ScanOptions::default().extensions;
        }
        return Ok((config, false));
    }

    let config = EngineConfig::default();
    save_config(path, &config)?;
    Ok((config, true))
}

pub fn save_config(path: &Path, config: &EngineConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    fs::write(path, contents)?;
    Ok(())
}

pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let raw = PathBuf::from(value);
    if raw.is_absolute() {
        return raw;
    }
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    base.join(raw)
}

pub fn resolve_music_root(config_path: &Path, value: &str) -> PathBuf {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        return resolve_path(config_path, trimmed);
    }
    dirs::audio_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Local")
}

pub fn resolve_playlists_dir(config_path: &Path, value: &str) -> PathBuf {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        return resolve_path(config_path, trimmed);
    }
    match dirs::data_dir() {
        Some(dir) => dir.join(APP_DIR).join("playlists"),
        None => resolve_path(config_path, "playlists"),
    }
}
