use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::store::StoreError;
use crate::store::schema::Document;

pub const APP_DIR: &str = "instasolve";

/// Result of inspecting a document on disk.
#[derive(Clone, Debug, PartialEq)]
pub enum FileState<T> {
    Missing,
    Invalid(String),
    Valid(T),
}

impl<T> FileState<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, FileState::Valid(_))
    }

    pub fn describe(&self) -> &'static str {
        match self {
            FileState::Missing => "missing",
            FileState::Invalid(_) => "invalid",
            FileState::Valid(_) => "valid",
        }
    }
}

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self, StoreError> {
        let base_dir = Self::default_dir().ok_or(StoreError::NoConfigDir)?;
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    pub fn path_of<T: Document>(&self) -> PathBuf {
        self.file_path(T::FILE_NAME)
    }

    /// Read and validate a document without touching it.
    pub fn inspect<T: Document>(&self) -> FileState<T> {
        let path = self.path_of::<T>();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return FileState::Missing,
            Err(e) => return FileState::Invalid(e.to_string()),
        };
        let data: T = match serde_json::from_str(&content) {
            Ok(data) => data,
            Err(e) => return FileState::Invalid(e.to_string()),
        };
        match data.validate() {
            Ok(()) => FileState::Valid(data),
            Err(reason) => FileState::Invalid(reason),
        }
    }

    /// Write the whole document through a temp file so a crash never leaves
    /// a truncated file behind.
    pub fn save<T: Document>(&self, data: &T) -> Result<(), StoreError> {
        self.save_as(T::FILE_NAME, data)
    }

    fn save_as<T: Serialize>(&self, name: &str, data: &T) -> Result<(), StoreError> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        debug!(path = %path.display(), bytes = json.len(), "saved document");
        Ok(())
    }

    /// Delete a document. Deleting a file that is not there is not an error.
    pub fn remove<T: Document>(&self) -> Result<(), StoreError> {
        match fs::remove_file(self.path_of::<T>()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
