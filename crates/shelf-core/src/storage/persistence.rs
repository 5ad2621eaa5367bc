//! Collection file persistence
//!
//! Handles saving and loading the collection to/from a single JSON file.
//! Uses atomic writes (write to temp file, then rename) so a crash while
//! saving never leaves a half-written collection behind.
//!
//! Storage location: `~/.local/share/shelf/collection.json` (configurable
//! via `Config`)

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::{StorageError, StorageResult};
use crate::collection::Collection;
use crate::config::Config;

/// Indentation used when writing the collection file
const INDENT: &[u8] = b"    ";

/// How a collection came to be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// The file did not exist; it will be created on the first save
    Missing,
    /// The file existed but held no data
    Empty,
    /// The file was parsed successfully
    Existing,
}

/// Result of a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub collection: Collection,
    pub origin: LoadOrigin,
}

impl Loaded {
    fn fresh(origin: LoadOrigin) -> Self {
        Self {
            collection: Collection::new(),
            origin,
        }
    }
}

/// Persistence layer for the collection file
#[derive(Debug)]
pub struct JsonPersistence {
    path: PathBuf,
}

impl JsonPersistence {
    /// Create a persistence handler for a specific file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a persistence handler for the configured collection file
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.collection_path())
    }

    /// Path of the collection file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the collection file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the collection from disk
    ///
    /// A missing or blank file yields an empty collection. A file that is
    /// not a JSON array of records is reported as an error and left
    /// untouched.
    pub fn load(&self) -> StorageResult<Loaded> {
        let path = &self.path;

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No collection file at {:?}; starting empty", path);
                return Ok(Loaded::fresh(LoadOrigin::Missing));
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(StorageError::CorruptDocument {
                    path: path.clone(),
                    details: e.to_string(),
                });
            }
            Err(e) => return Err(StorageError::from_read_io(e, path.clone())),
        };

        if content.trim().is_empty() {
            warn!("Collection file {:?} is empty; starting empty", path);
            return Ok(Loaded::fresh(LoadOrigin::Empty));
        }

        let value: Value = serde_json::from_str(&content).map_err(|e| corrupt(path, e))?;

        if let Some(entries) = legacy_entries(&value) {
            return Err(StorageError::LegacyFormat {
                path: path.clone(),
                entries,
            });
        }

        let collection: Collection =
            serde_json::from_value(value).map_err(|e| corrupt(path, e))?;

        debug!("Loaded {} records from {:?}", collection.len(), path);
        Ok(Loaded {
            collection,
            origin: LoadOrigin::Existing,
        })
    }

    /// Save the collection, replacing the file in full
    pub fn save(&self, collection: &Collection) -> StorageResult<()> {
        let bytes = encode(collection)?;
        atomic_write(&self.path, &bytes)?;
        debug!("Saved {} records to {:?}", collection.len(), self.path);
        Ok(())
    }

    /// Move an unreadable collection file aside
    ///
    /// Returns the path the file was moved to. Existing backups are never
    /// overwritten.
    pub fn backup_corrupt(&self) -> StorageResult<PathBuf> {
        let backup_path = next_backup_path(&self.path);
        fs::rename(&self.path, &backup_path).map_err(|source| {
            StorageError::AtomicWriteFailed {
                from: self.path.clone(),
                to: backup_path.clone(),
                source,
            }
        })?;
        warn!("Moved unreadable collection {:?} to {:?}", self.path, backup_path);
        Ok(backup_path)
    }
}

fn corrupt(path: &Path, error: serde_json::Error) -> StorageError {
    StorageError::CorruptDocument {
        path: path.to_path_buf(),
        details: error.to_string(),
    }
}

/// Number of entries if `value` is the old array-of-strings layout
fn legacy_entries(value: &Value) -> Option<usize> {
    let items = value.as_array()?;
    let is_legacy = !items.is_empty() && items.iter().all(Value::is_string);
    is_legacy.then_some(items.len())
}

/// Serialize with 4-space indentation
fn encode(collection: &Collection) -> StorageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    collection
        .serialize(&mut serializer)
        .map_err(StorageError::Encode)?;
    buf.push(b'\n');
    Ok(buf)
}

fn next_backup_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "collection.json".to_string());

    let mut candidate = path.with_file_name(format!("{}.corrupt.backup", file_name));
    let mut n = 1;
    while candidate.exists() {
        candidate = path.with_file_name(format!("{}.corrupt.{}.backup", file_name, n));
        n += 1;
    }
    candidate
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    // Same directory so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
