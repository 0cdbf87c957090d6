//! Persistence Store
//!
//! The whole collection lives in one JSON blob. Reads never fail from the
//! caller's point of view: a missing or corrupt blob is an empty collection.

use std::{
    cell::RefCell,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[cfg(test)]
use mockall::automock;
use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::records::Record;

/// Default storage slot name.
pub const DEFAULT_KEY: &str = "client_archive_v1";

/// Errors raised by a storage slot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed for {}", path.display())]
    Io {
        /// Backing file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The collection could not be encoded.
    #[error("failed to encode records")]
    Encode(#[source] serde_json::Error),
}

/// A durable slot holding a single opaque blob.
#[cfg_attr(test, automock)]
pub trait BlobSlot {
    /// Current blob, `None` when nothing was written yet.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the slot exists but cannot be read.
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replace the blob.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the blob cannot be written.
    fn write(&self, blob: &str) -> Result<(), StoreError>;
}

/// Slot backed by a JSON file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Slot stored at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Slot `<dir>/<key>.json`.
    pub fn in_dir(dir: impl AsRef<Path>, key: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{key}.json")))
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl BlobSlot for FileSlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(error)),
        }
    }

    fn write(&self, blob: &str) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        fs::create_dir_all(dir).map_err(|error| self.io_error(error))?;

        let mut file = NamedTempFile::new_in(dir).map_err(|error| self.io_error(error))?;

        file.write_all(blob.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .map_err(|error| self.io_error(error))?;

        file.persist(&self.path)
            .map_err(|error| self.io_error(error.error))?;

        Ok(())
    }
}

/// In-memory slot.
#[derive(Debug, Default)]
pub struct MemorySlot {
    blob: RefCell<Option<String>>,
}

impl MemorySlot {
    /// Slot pre-filled with a blob.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: RefCell::new(Some(blob.into())),
        }
    }

    /// Copy of the current blob.
    pub fn blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }
}

impl BlobSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.blob())
    }

    fn write(&self, blob: &str) -> Result<(), StoreError> {
        self.blob.replace(Some(blob.to_string()));

        Ok(())
    }
}

/// JSON record store over a blob slot.
#[derive(Debug)]
pub struct Store<S> {
    slot: S,
}

impl<S: BlobSlot> Store<S> {
    /// Wrap a slot.
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    /// Underlying slot.
    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Read the stored collection.
    ///
    /// An absent, unreadable or non-array blob yields an empty collection, and
    /// array elements that are not records are skipped.
    pub fn load(&self) -> Vec<Record> {
        let blob = match self.slot.read() {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(error) => {
                warn!(%error, "failed to read stored records");
                return Vec::new();
            }
        };

        let elements = match serde_json::from_str::<Value>(&blob) {
            Ok(Value::Array(elements)) => elements,
            Ok(_) => {
                warn!("stored records are not an array, starting empty");
                return Vec::new();
            }
            Err(error) => {
                warn!(%error, "stored records are corrupt, starting empty");
                return Vec::new();
            }
        };

        let total = elements.len();

        let records: Vec<Record> = elements
            .into_iter()
            .filter_map(|element| match serde_json::from_value(element) {
                Ok(record) => Some(record),
                Err(error) => {
                    warn!(%error, "skipping malformed stored record");
                    None
                }
            })
            .collect();

        debug!(loaded = records.len(), total, "loaded records");

        records
    }

    /// Overwrite the stored collection.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when encoding or writing fails.
    pub fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(records).map_err(StoreError::Encode)?;

        self.slot.write(&blob)?;

        debug!(count = records.len(), "saved records");

        Ok(())
    }
}
