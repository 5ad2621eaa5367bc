//! shelf core library
//!
//! This crate provides the core functionality for shelf, a personal
//! catalogue of books, films and music kept in a single JSON file.
//!
//! # Architecture
//!
//! - **Store**: owns the in-memory collection for a session, loaded once
//!   and written back after every change
//! - **JSON file**: the only persisted state, replaced in full on save
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open_with_config(Config::load()?)?;
//!
//! // Add a record
//! let record = Record::new(MediaKind::Book, "Dune").with_creator("Frank Herbert");
//! store.add(record)?;
//!
//! // Query records
//! let hits = store.search(SearchField::Title, "dune");
//! ```
//!
//! # Modules
//!
//! - `store`: Session storage interface (main entry point)
//! - `collection`: Ordered records and the list/search/edit/delete operations
//! - `models`: Records, kinds, patches and positions
//! - `storage`: JSON file persistence
//! - `config`: Application configuration

pub mod collection;
pub mod config;
pub mod models;
pub mod storage;
pub mod store;

pub use collection::{Collection, CollectionError, Entry, SearchField};
pub use config::Config;
pub use models::{MediaKind, ParseKindError, Position, PositionError, Record, RecordPatch};
pub use storage::{JsonPersistence, LoadOrigin, Loaded, StorageError};
pub use store::{Store, StoreError};
