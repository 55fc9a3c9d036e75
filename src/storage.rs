// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for captured photos and videos
//!
//! Captures are first written to a cache directory. Saving copies them into
//! the user's gallery (`Pictures/<folder>` for photos, `Videos/<folder>` for
//! videos); discarding deletes the cached file.

use crate::app::state::PermissionState;
use crate::constants::{APP_NAME, FILE_SCHEME, file_formats};
use crate::errors::SaveError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Persistent gallery storage
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Ask for access to the gallery
    async fn request_permissions(&self) -> PermissionState;

    /// Copy a captured file into the gallery and return where it landed
    async fn create_asset(&self, source: &Path) -> Result<PathBuf, SaveError>;
}

/// Gallery backed by the XDG Pictures and Videos directories
#[derive(Debug, Clone)]
pub struct GalleryLibrary {
    photos_dir: PathBuf,
    videos_dir: PathBuf,
}

impl GalleryLibrary {
    pub fn new(folder: &str) -> Self {
        let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        let photos_dir = dirs::picture_dir()
            .unwrap_or_else(|| home.join("Pictures"))
            .join(folder);
        let videos_dir = dirs::video_dir()
            .unwrap_or_else(|| home.join("Videos"))
            .join(folder);
        Self::with_dirs(photos_dir, videos_dir)
    }

    pub fn with_dirs(photos_dir: PathBuf, videos_dir: PathBuf) -> Self {
        Self {
            photos_dir,
            videos_dir,
        }
    }

    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }

    /// Gallery folder for a capture, chosen by extension
    fn destination_dir(&self, source: &Path) -> Result<&Path, SaveError> {
        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        if file_formats::is_image_extension(&ext) {
            Ok(&self.photos_dir)
        } else if file_formats::is_video_extension(&ext) {
            Ok(&self.videos_dir)
        } else {
            Err(SaveError::InvalidPath(format!(
                "{} is not a photo or video",
                source.display()
            )))
        }
    }
}

#[async_trait]
impl MediaLibrary for GalleryLibrary {
    async fn request_permissions(&self) -> PermissionState {
        let dirs = [self.photos_dir.clone(), self.videos_dir.clone()];
        let writable = tokio::task::spawn_blocking(move || dirs.iter().all(|d| dir_writable(d)))
            .await
            .unwrap_or(false);

        if writable {
            PermissionState::Granted
        } else {
            warn!(
                photos = %self.photos_dir.display(),
                videos = %self.videos_dir.display(),
                "Gallery folders are not writable"
            );
            PermissionState::Denied
        }
    }

    async fn create_asset(&self, source: &Path) -> Result<PathBuf, SaveError> {
        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            return Err(SaveError::Io(format!("{} does not exist", source.display())));
        }
        let dir = self.destination_dir(source)?;
        let file_name = source
            .file_name()
            .ok_or_else(|| SaveError::InvalidPath(source.display().to_string()))?
            .to_string_lossy()
            .to_string();

        tokio::fs::create_dir_all(dir).await?;
        let destination = unique_destination(dir, &file_name);
        tokio::fs::copy(source, &destination).await?;

        info!(
            source = %source.display(),
            destination = %destination.display(),
            "Saved capture to gallery"
        );
        Ok(destination)
    }
}

fn dir_writable(dir: &Path) -> bool {
    if let Err(e) = std::fs::create_dir_all(dir) {
        debug!(dir = %dir.display(), error = %e, "Cannot create gallery folder");
        return false;
    }
    std::fs::metadata(dir)
        .map(|m| m.is_dir() && !m.permissions().readonly())
        .unwrap_or(false)
}

/// Remove a leading `file://` from an engine-reported path
pub fn strip_file_scheme(path: &str) -> &str {
    path.strip_prefix(FILE_SCHEME).unwrap_or(path)
}

/// Directory captures are written to before they are saved
pub fn capture_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
        .join("captures")
}

/// Timestamped capture file name, e.g. `IMG_20250101_120000_123.jpg`
pub fn capture_file_name(prefix: &str, extension: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    format!("{}_{}.{}", prefix, timestamp, extension)
}

/// First free path for `file_name` in `dir`, adding `_1`, `_2`, ... as needed
pub fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().to_string());

    (1u32..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{}_{}.{}", stem, n, ext)),
            None => dir.join(format!("{}_{}", stem, n)),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Delete a cached capture
///
/// Only files inside `cache_dir` are touched. Returns whether a file was
/// removed.
pub fn discard_capture(cache_dir: &Path, path: &str) -> bool {
    let path = Path::new(strip_file_scheme(path));
    let (Ok(dir), Ok(file)) = (cache_dir.canonicalize(), path.canonicalize()) else {
        return false;
    };
    if !file.starts_with(&dir) {
        debug!(path = %file.display(), "Not a cached capture, keeping it");
        return false;
    }

    match std::fs::remove_file(&file) {
        Ok(()) => {
            debug!(path = %file.display(), "Removed cached capture");
            true
        }
        Err(e) => {
            warn!(path = %file.display(), error = %e, "Failed to remove cached capture");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_scheme_is_stripped_once() {
        assert_eq!(strip_file_scheme("file:///tmp/a.mp4"), "/tmp/a.mp4");
        assert_eq!(strip_file_scheme("/tmp/a.mp4"), "/tmp/a.mp4");
    }

    #[test]
    fn capture_names_carry_prefix_and_extension() {
        let name = capture_file_name("IMG", "jpg");
        assert!(name.starts_with("IMG_"));
        assert!(name.ends_with(".jpg"));
    }

    #[test]
    fn unique_destination_skips_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("a_1.jpg"), b"x").unwrap();
        assert_eq!(unique_destination(dir.path(), "a.jpg"), dir.path().join("a_2.jpg"));
        assert_eq!(unique_destination(dir.path(), "b.jpg"), dir.path().join("b.jpg"));
    }

    #[test]
    fn discard_only_touches_cache_files() {
        let cache = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let cached = cache.path().join("VID_1.mp4");
        let outside = other.path().join("VID_2.mp4");
        std::fs::write(&cached, b"x").unwrap();
        std::fs::write(&outside, b"x").unwrap();

        assert!(discard_capture(
            cache.path(),
            &format!("file://{}", cached.display())
        ));
        assert!(!cached.exists());
        assert!(!discard_capture(cache.path(), &outside.display().to_string()));
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn create_asset_sorts_by_media_type() {
        let root = tempfile::tempdir().unwrap();
        let library =
            GalleryLibrary::with_dirs(root.path().join("Pictures"), root.path().join("Videos"));
        assert_eq!(library.request_permissions().await, PermissionState::Granted);

        let photo = root.path().join("IMG_1.jpg");
        std::fs::write(&photo, b"jpeg").unwrap();
        let saved = library.create_asset(&photo).await.unwrap();
        assert_eq!(saved, root.path().join("Pictures").join("IMG_1.jpg"));

        let saved_again = library.create_asset(&photo).await.unwrap();
        assert_eq!(saved_again, root.path().join("Pictures").join("IMG_1_1.jpg"));
    }

    #[tokio::test]
    async fn create_asset_rejects_missing_and_unknown_files() {
        let root = tempfile::tempdir().unwrap();
        let library =
            GalleryLibrary::with_dirs(root.path().join("Pictures"), root.path().join("Videos"));

        let missing = library.create_asset(&root.path().join("gone.mp4")).await;
        assert!(matches!(missing, Err(SaveError::Io(_))));

        let text = root.path().join("notes.txt");
        std::fs::write(&text, b"x").unwrap();
        let unknown = library.create_asset(&text).await;
        assert!(matches!(unknown, Err(SaveError::InvalidPath(_))));
    }
}
