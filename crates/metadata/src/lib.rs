use std::fs;
use std::path::{Path, PathBuf};

use common::{CoverArt, Track};
use id3::frame::{Picture as Id3Picture, PictureType as Id3PictureType};
use id3::{TagLike, Version};
use lofty::error::LoftyError;
use lofty::picture::{Picture, PictureType};
use lofty::prelude::{ItemKey, TaggedFileExt};
use lofty::tag::Tag;
use tracing::{debug, warn};

/// Reads one file into a [`Track`]. `None` means the file cannot be
/// represented at all and must be skipped.
pub trait TagReader: Send + Sync {
    fn read(&self, path: &Path) -> Option<Track>;
}

pub trait TagWriter: Send + Sync {
    fn write(&self, path: &Path, edit: &TagEdit) -> Result<(), MetadataError>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagEdit {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Local path or `file://` URL of a replacement front cover.
    pub image: Option<String>,
}

/// Reads tags with lofty and writes ID3v2 tags with id3.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileTags;

impl TagReader for FileTags {
    fn read(&self, path: &Path) -> Option<Track> {
        if path.as_os_str().is_empty() {
            return None;
        }
        match read_track(path) {
            Ok(track) => Some(track),
            Err(err) => {
                warn!("Failed to read tags for {:?}: {}", path, err);
                Some(Track::fallback(path))
            }
        }
    }
}

impl TagWriter for FileTags {
    fn write(&self, path: &Path, edit: &TagEdit) -> Result<(), MetadataError> {
        write_tags(path, edit)
    }
}

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
    Id3(id3::Error),
    NotFound(PathBuf),
    UnsupportedImage(PathBuf),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Io(err) => write!(f, "io error: {}", err),
            MetadataError::Lofty(err) => write!(f, "tag read error: {}", err),
            MetadataError::Id3(err) => write!(f, "tag write error: {}", err),
            MetadataError::NotFound(path) => write!(f, "file not found: {}", path.display()),
            MetadataError::UnsupportedImage(path) => {
                write!(f, "not a supported image: {}", path.display())
            }
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

impl From<id3::Error> for MetadataError {
    fn from(err: id3::Error) -> Self {
        MetadataError::Id3(err)
    }
}

pub fn read_track(path: &Path) -> Result<Track, MetadataError> {
    let tagged_file = lofty::read_from_path(path)?;
    let mut track = Track::fallback(path);

    let tag = match tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        Some(tag) => tag,
        None => {
            debug!("No tag found in {:?}", path);
            return Ok(track);
        }
    };

    if let Some(title) = text(tag, &ItemKey::TrackTitle) {
        track.title = title;
    }
    if let Some(artist) =
        text(tag, &ItemKey::TrackArtist).or_else(|| text(tag, &ItemKey::AlbumArtist))
    {
        track.artist = artist;
    }
    if let Some(album) = text(tag, &ItemKey::AlbumTitle) {
        track.album = album;
    }
    track.genre = text(tag, &ItemKey::Genre).unwrap_or_default();
    track.year = tag
        .get_string(&ItemKey::Year)
        .or_else(|| tag.get_string(&ItemKey::RecordingDate))
        .and_then(parse_year)
        .unwrap_or(0);
    track.track_no = tag
        .get_string(&ItemKey::TrackNumber)
        .and_then(parse_u16)
        .map(u32::from)
        .unwrap_or(0);
    track.cover = pick_picture(tag.pictures()).map(|picture| {
        let data = picture.data().to_vec();
        let mime = picture
            .mime_type()
            .map(|mime| mime.as_str().to_string())
            .or_else(|| guess_mime(&data))
            .unwrap_or_else(|| "image/jpeg".to_string());
        CoverArt::new(data, mime)
    });

    Ok(track)
}

pub fn write_tags(path: &Path, edit: &TagEdit) -> Result<(), MetadataError> {
    if !path.is_file() {
        return Err(MetadataError::NotFound(path.to_path_buf()));
    }

    let mut tag = id3::Tag::read_from_path(path).unwrap_or_else(|_| id3::Tag::new());
    tag.set_title(edit.title.trim());
    tag.set_artist(edit.artist.trim());
    tag.set_album(edit.album.trim());

    if let Some(image) = edit.image.as_deref().filter(|value| !value.trim().is_empty()) {
        let picture = load_cover(&local_image_path(image))?;
        tag.remove_picture_by_type(Id3PictureType::CoverFront);
        tag.add_frame(picture);
    }

    tag.write_to_path(path, Version::Id3v24)?;
    debug!("Wrote tags to {:?}", path);
    Ok(())
}

fn text(tag: &Tag, key: &ItemKey) -> Option<String> {
    tag.get_string(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

fn local_image_path(value: &str) -> PathBuf {
    let trimmed = value.trim();
    PathBuf::from(trimmed.strip_prefix("file://").unwrap_or(trimmed))
}

fn load_cover(path: &Path) -> Result<Id3Picture, MetadataError> {
    let data = fs::read(path)?;
    let mime = guess_mime(&data)
        .or_else(|| {
            mime_guess::from_path(path)
                .first()
                .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
                .map(|mime| mime.essence_str().to_string())
        })
        .ok_or_else(|| MetadataError::UnsupportedImage(path.to_path_buf()))?;

    Ok(Id3Picture {
        mime_type: mime,
        picture_type: Id3PictureType::CoverFront,
        description: String::new(),
        data,
    })
}

fn parse_u16(text: &str) -> Option<u16> {
    let head = text.split('/').next().unwrap_or(text).trim();
    head.parse().ok()
}

fn parse_year(text: &str) -> Option<i32> {
    let mut digits = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            if digits.len() == 4 {
                break;
            }
        } else if !digits.is_empty() {
            break;
        }
    }
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

fn pick_picture(pictures: &[Picture]) -> Option<&Picture> {
    for picture in pictures {
        if picture.pic_type() == PictureType::CoverFront {
            return Some(picture);
        }
    }
    pictures.first()
}

fn guess_mime(bytes: &[u8]) -> Option<String> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg".to_string())
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        Some("image/png".to_string())
    } else {
        None
    }
}
