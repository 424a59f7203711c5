//! Storage for uploaded audio files.

use crate::ids::generate_upload_file_name;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

pub const UPLOADS_DIR_NAME: &str = "uploads";
pub const UPLOADS_URL_PREFIX: &str = "/uploads";
/// Partial uploads live here, outside the served directory.
pub const UPLOAD_STAGING_DIR_NAME: &str = "upload-staging";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

const MP3_EXTENSION: &str = "mp3";
const MP3_CONTENT_TYPES: &[&str] = &["audio/mpeg", "audio/mp3"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Only MP3 files are allowed!")]
    UnsupportedFileType,

    #[error("File too large. Maximum size is {}MB.", .0 / (1024 * 1024))]
    FileTooLarge(u64),

    #[error("No file uploaded or invalid file type")]
    MissingFile,
}

/// Accepted when either the extension or the declared content type says MP3.
pub fn is_mp3(file_name: &str, content_type: Option<&str>) -> bool {
    let by_extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(MP3_EXTENSION))
        .unwrap_or(false);
    let by_content_type = content_type
        .map(|ct| {
            MP3_CONTENT_TYPES
                .iter()
                .any(|accepted| ct.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false);
    by_extension || by_content_type
}

/// Song title for an uploaded file: its base name minus a trailing `.mp3`.
pub fn title_from_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    match base.len().checked_sub(MP3_EXTENSION.len() + 1) {
        Some(cut)
            if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".mp3") =>
        {
            base[..cut].to_string()
        }
        _ => base.to_string(),
    }
}

/// A file stored in the uploads directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    pub file_name: String,
    pub original_name: String,
}

impl StoredUpload {
    pub fn public_path(&self) -> String {
        format!("{}/{}", UPLOADS_URL_PREFIX, self.file_name)
    }
}

pub struct UploadStore {
    dir: PathBuf,
    staging_dir: PathBuf,
    max_file_size: u64,
}

impl UploadStore {
    /// `staging_dir` must be on the same filesystem as `dir`.
    pub fn new(dir: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            dir: dir.into(),
            staging_dir: staging_dir.into(),
            max_file_size,
        }
    }

    /// `uploads/` and `upload-staging/` under the data directory.
    pub fn in_data_dir(data_dir: &Path, max_file_size: u64) -> Self {
        Self::new(
            data_dir.join(UPLOADS_DIR_NAME),
            data_dir.join(UPLOAD_STAGING_DIR_NAME),
            max_file_size,
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Creates the uploads and staging directories.
    pub fn init(&self) -> Result<(), UploadError> {
        fs::create_dir_all(&self.dir)?;
        fs::create_dir_all(&self.staging_dir)?;
        Ok(())
    }

    /// Starts receiving a file into the staging directory. Nothing is visible
    /// in the uploads directory until [`PendingUpload::finish`] succeeds.
    pub fn begin(&self, original_name: &str) -> Result<PendingUpload, UploadError> {
        fs::create_dir_all(&self.staging_dir)?;
        let tmp = NamedTempFile::new_in(&self.staging_dir)?;
        Ok(PendingUpload {
            tmp,
            dir: self.dir.clone(),
            original_name: original_name.to_string(),
            written: 0,
            max_file_size: self.max_file_size,
        })
    }

    /// Maps a `/uploads/<name>` path onto the uploads directory. Only the
    /// base name is kept, so a path can never point outside the directory.
    pub fn resolve_public_path(&self, public_path: &str) -> Option<PathBuf> {
        let name = Path::new(public_path).file_name()?;
        Some(self.dir.join(name))
    }

    /// Deletes the file behind a public path. A missing file is fine, other
    /// failures are only logged.
    pub fn remove(&self, public_path: &str) {
        let Some(path) = self.resolve_public_path(public_path) else {
            warn!("Cannot resolve upload path {:?}", public_path);
            return;
        };
        match fs::remove_file(&path) {
            Ok(()) => debug!("Removed upload {:?}", path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("Failed to remove upload {:?}: {}", path, err),
        }
    }
}

/// A file being received. Dropping it discards the partial data.
pub struct PendingUpload {
    tmp: NamedTempFile,
    dir: PathBuf,
    original_name: String,
    written: u64,
    max_file_size: u64,
}

impl PendingUpload {
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        self.written += chunk.len() as u64;
        if self.written > self.max_file_size {
            return Err(UploadError::FileTooLarge(self.max_file_size));
        }
        self.tmp.write_all(chunk)?;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Moves the data to its final, generated name.
    pub fn finish(self) -> Result<StoredUpload, UploadError> {
        let extension = Path::new(&self.original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let file_name = generate_upload_file_name(&extension);
        self.tmp.as_file().sync_all()?;
        fs::create_dir_all(&self.dir)?;
        self.tmp
            .persist(self.dir.join(&file_name))
            .map_err(|err| UploadError::Io(err.error))?;
        Ok(StoredUpload {
            file_name,
            original_name: self.original_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files_in(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().flatten().count()
    }

    #[test]
    fn mp3_detection() {
        assert!(is_mp3("song.mp3", None));
        assert!(is_mp3("SONG.MP3", Some("application/octet-stream")));
        assert!(is_mp3("song.bin", Some("audio/mpeg")));
        assert!(is_mp3("song", Some("audio/mp3")));
        assert!(!is_mp3("song.wav", Some("audio/wav")));
        assert!(!is_mp3("song.txt", None));
    }

    #[test]
    fn title_strips_mp3_extension() {
        assert_eq!(title_from_file_name("My Song.mp3"), "My Song");
        assert_eq!(title_from_file_name("My Song.MP3"), "My Song");
        assert_eq!(title_from_file_name("dir/track.mp3"), "track");
        assert_eq!(title_from_file_name("noext"), "noext");
        assert_eq!(title_from_file_name("clip.ogg"), "clip.ogg");
    }

    #[test]
    fn stores_file_under_generated_name() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::in_data_dir(dir.path(), 1024);
        store.init().unwrap();

        let mut pending = store.begin("Track.mp3").unwrap();
        pending.write_chunk(b"ID3").unwrap();
        pending.write_chunk(b"data").unwrap();
        assert_eq!(pending.written(), 7);
        // Partial data stays out of the served directory
        assert_eq!(files_in(store.dir()), 0);
        assert_eq!(files_in(store.staging_dir()), 1);
        let stored = pending.finish().unwrap();
        assert_eq!(files_in(store.staging_dir()), 0);

        assert!(stored.file_name.ends_with(".mp3"));
        assert_eq!(stored.public_path(), format!("/uploads/{}", stored.file_name));
        let on_disk = store.resolve_public_path(&stored.public_path()).unwrap();
        assert_eq!(fs::read(on_disk).unwrap(), b"ID3data");
        assert_eq!(files_in(store.dir()), 1);
    }

    #[test]
    fn too_large_upload_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::in_data_dir(dir.path(), 4);
        store.init().unwrap();
        let mut pending = store.begin("big.mp3").unwrap();
        pending.write_chunk(b"1234").unwrap();
        let err = pending.write_chunk(b"5").unwrap_err();
        assert!(matches!(err, UploadError::FileTooLarge(4)));
        drop(pending);
        assert_eq!(files_in(store.dir()), 0);
        assert_eq!(files_in(store.staging_dir()), 0);
    }

    #[test]
    fn too_large_message_uses_megabytes() {
        assert_eq!(
            UploadError::FileTooLarge(DEFAULT_MAX_UPLOAD_BYTES).to_string(),
            "File too large. Maximum size is 20MB."
        );
    }

    #[test]
    fn remove_is_confined_to_upload_dir() {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::in_data_dir(dir.path(), 1024);
        store.init().unwrap();
        let outside = dir.path().join("users.json");
        fs::write(&outside, "[]").unwrap();

        store.remove("/uploads/../users.json");
        assert!(outside.is_file());

        // missing file is not an error
        store.remove("/uploads/does-not-exist.mp3");
    }
}
