//! Storage layer
//!
//! Handles persistence of the collection as a single JSON file.
//!
//! The file holds one JSON array of record objects. It is read in full
//! when a store opens and replaced in full on every save.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::{JsonPersistence, LoadOrigin, Loaded};
