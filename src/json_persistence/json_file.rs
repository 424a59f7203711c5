use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::Write,
    marker::PhantomData,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// A JSON document on disk holding a value of type `T`.
///
/// A missing file reads as `T::default()`, so collections spring into
/// existence on first write.
pub struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonFile {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<T> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {:?}", self.path))
            }
        };
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", self.path))
    }

    /// Replaces the whole document. Readers observe either the old or the new
    /// content, never a partially written file.
    pub fn save(&self, value: &T) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;

        let json_string = serde_json::to_string_pretty(value)?;
        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
        tmp.write_all(json_string.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {:?}", self.path))?;
        Ok(())
    }

    /// Writes `value` only if the document does not exist yet.
    pub fn create_if_missing(&self, value: &T) -> Result<()> {
        if !self.exists() {
            self.save(value)?;
        }
        Ok(())
    }
}
