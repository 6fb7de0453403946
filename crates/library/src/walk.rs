use std::collections::HashSet;
use std::path::{Path, PathBuf};

use common::canonical_path;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use walkdir::WalkDir;

use crate::LibraryError;

pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3"];

/// Recursively collects audio files below `root`, sorted by path. Symlinks
/// are followed; a directory or file reached twice is only taken once.
pub fn collect_audio_files(
    root: &Path,
    extensions: &[String],
    cancel: &CancellationToken,
) -> Result<Vec<PathBuf>, LibraryError> {
    let mut files = Vec::new();
    if !root.is_dir() {
        debug!("Scan root {:?} is not a directory", root);
        return Ok(files);
    }

    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut seen_files: HashSet<PathBuf> = HashSet::new();
    let mut entries = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = entries.next() {
        if cancel.is_cancelled() {
            return Err(LibraryError::Cancelled);
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if !visited.insert(canonical_path(entry.path())) {
                debug!("Already visited {:?}; skipping", entry.path());
                entries.skip_current_dir();
            }
            continue;
        }

        if !entry.file_type().is_file() || !has_audio_extension(entry.path(), extensions) {
            continue;
        }
        if !seen_files.insert(canonical_path(entry.path())) {
            debug!("{:?} links to a file already found; skipping", entry.path());
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

pub fn has_audio_extension(path: &Path, extensions: &[String]) -> bool {
    let ext = match path.extension() {
        Some(ext) => ext.to_string_lossy(),
        None => return false,
    };
    extensions
        .iter()
        .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(&ext))
}
