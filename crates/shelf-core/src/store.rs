//! Session store
//!
//! The `Store` owns the in-memory collection for the lifetime of a
//! session. It is loaded from disk once when opened and written back in
//! full after every mutation.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open_with_config(Config::load()?)?;
//!
//! store.add(Record::new(MediaKind::Book, "Dune"))?;
//!
//! let books = store.list(Some(MediaKind::Book));
//! ```
//!
//! If a save fails the change stays in memory and the store is marked
//! dirty until a later `flush()` succeeds. If a reload finds the file
//! unreadable, writes are held back until the file is fixed or moved
//! aside with `set_aside_unreadable()`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::collection::{Collection, CollectionError, Entry, SearchField};
use crate::config::Config;
use crate::models::{MediaKind, Position, Record, RecordPatch};
use crate::storage::{JsonPersistence, LoadOrigin, StorageError, StorageResult};

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The operation was rejected; nothing changed
    #[error(transparent)]
    Collection(#[from] CollectionError),

    /// The change was applied in memory but writing it to disk failed
    #[error("Change kept in memory but not saved: {0}")]
    NotSaved(#[source] StorageError),

    /// Reading the collection file failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// The underlying storage error, if any
    pub fn storage(&self) -> Option<&StorageError> {
        match self {
            StoreError::NotSaved(e) | StoreError::Storage(e) => Some(e),
            StoreError::Collection(_) => None,
        }
    }
}

/// Session-owned collection backed by one JSON file
#[derive(Debug)]
pub struct Store {
    /// The records, as the user currently sees them
    collection: Collection,
    /// Collection file handler
    persistence: JsonPersistence,
    /// How the collection was found on the last load
    origin: LoadOrigin,
    /// True while memory holds changes the last save failed to write
    dirty: bool,
    /// True while the file on disk is unreadable and must not be overwritten
    held: bool,
}

impl Store {
    /// Open the store with a specific configuration
    ///
    /// A missing file opens an empty store. An unreadable file is an
    /// error; see [`Store::recover`].
    pub fn open_with_config(config: Config) -> StorageResult<Self> {
        let persistence = JsonPersistence::from_config(&config);
        let loaded = persistence.load()?;

        info!(
            "Opened collection {:?} with {} records",
            persistence.path(),
            loaded.collection.len()
        );

        Ok(Self {
            collection: loaded.collection,
            persistence,
            origin: loaded.origin,
            dirty: false,
            held: false,
        })
    }

    /// Move an unreadable collection file aside and open an empty store
    ///
    /// Returns the store and the path of the backup.
    pub fn recover(config: Config) -> StorageResult<(Self, PathBuf)> {
        let persistence = JsonPersistence::from_config(&config);
        let backup_path = persistence.backup_corrupt()?;

        Ok((
            Self {
                collection: Collection::new(),
                persistence,
                origin: LoadOrigin::Missing,
                dirty: false,
                held: false,
            },
            backup_path,
        ))
    }

    /// Path of the collection file
    pub fn path(&self) -> &Path {
        self.persistence.path()
    }

    /// How the collection file was found on the last load
    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }

    /// True if memory holds changes that are not on disk
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True if a reload found the file unreadable and writes are held back
    pub fn is_held(&self) -> bool {
        self.held
    }

    // ==================== Queries ====================

    pub fn records(&self) -> &[Record] {
        self.collection.records()
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn get(&self, position: Position) -> Option<&Record> {
        self.collection.get(position)
    }

    /// Records in order, optionally restricted to one kind
    pub fn list(&self, kind: Option<MediaKind>) -> Vec<Entry<'_>> {
        self.collection.list(kind)
    }

    /// Case-insensitive substring search
    pub fn search(&self, field: SearchField, needle: &str) -> Vec<Entry<'_>> {
        self.collection.search(field, needle)
    }

    // ==================== Mutations ====================

    /// Append a record and save
    pub fn add(&mut self, record: Record) -> Result<Position, StoreError> {
        self.check_writable()?;
        let position = self.collection.add(record);
        info!("Added record at position {}", position);
        self.save_after_change()?;
        Ok(position)
    }

    /// Apply a partial update and save
    ///
    /// Returns the record as it is after the edit.
    pub fn edit(&mut self, position: Position, patch: RecordPatch) -> Result<Record, StoreError> {
        self.check_writable()?;
        let edited = self.collection.edit(position, patch)?.clone();
        info!("Edited record at position {}", position);
        self.save_after_change()?;
        Ok(edited)
    }

    /// Remove a record and save
    pub fn delete(&mut self, position: Position) -> Result<Record, StoreError> {
        self.check_writable()?;
        let removed = self.collection.delete(position)?;
        info!("Deleted record at position {}", position);
        self.save_after_change()?;
        Ok(removed)
    }

    /// Write the in-memory collection to disk
    ///
    /// Clears the dirty flag on success.
    pub fn flush(&mut self) -> StorageResult<()> {
        if self.held {
            return Err(self.held_error());
        }
        self.persistence.save(&self.collection)?;
        self.dirty = false;
        Ok(())
    }

    /// Re-read the collection file, replacing the in-memory collection
    ///
    /// Pending changes are flushed first; if that fails nothing is
    /// reloaded. If the file turns out to be corrupt or in the legacy
    /// format, the in-memory collection is kept and writes are held back
    /// until the file is fixed or moved aside.
    pub fn reload(&mut self) -> Result<LoadOrigin, StoreError> {
        if self.dirty {
            self.flush().map_err(StoreError::NotSaved)?;
        }

        let loaded = match self.persistence.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                if e.is_unreadable_document() {
                    warn!("Collection file became unreadable, holding writes: {}", e);
                    self.held = true;
                }
                return Err(e.into());
            }
        };
        self.collection = loaded.collection;
        self.origin = loaded.origin;
        self.held = false;
        info!("Reloaded {} records", self.collection.len());
        Ok(self.origin)
    }

    /// Move the unreadable file aside and write the in-memory collection
    /// in its place
    ///
    /// Returns the path of the backup.
    pub fn set_aside_unreadable(&mut self) -> StorageResult<PathBuf> {
        let backup_path = self.persistence.backup_corrupt()?;
        info!("Moved unreadable collection to {:?}", backup_path);
        self.held = false;
        self.dirty = true;
        self.flush()?;
        Ok(backup_path)
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.held {
            return Err(StoreError::Storage(self.held_error()));
        }
        Ok(())
    }

    fn held_error(&self) -> StorageError {
        StorageError::SavesHeld {
            path: self.persistence.path().to_path_buf(),
        }
    }

    fn save_after_change(&mut self) -> Result<(), StoreError> {
        self.flush().map_err(|e| {
            warn!("Save failed, keeping change in memory: {}", e);
            self.dirty = true;
            StoreError::NotSaved(e)
        })
    }
}
