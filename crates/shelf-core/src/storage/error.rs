//! Storage error handling
//!
//! Provides typed errors for storage operations with descriptive messages
//! and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Collection file exists but is not a JSON array of records
    #[error("Collection file '{path}' is unreadable: {details}")]
    CorruptDocument { path: PathBuf, details: String },

    /// Collection file uses the old array-of-strings layout
    #[error("Collection file '{path}' uses the old plain-text list format ({entries} entries), which is not supported")]
    LegacyFormat { path: PathBuf, entries: usize },

    /// The file on disk became unreadable; writing would destroy it
    #[error("Not writing to '{path}': the file on disk is unreadable and has not been moved aside")]
    SavesHeld { path: PathBuf },

    /// Failed to encode the collection
    #[error("Failed to encode collection: {0}")]
    Encode(#[source] serde_json::Error),

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Create an error from a write-side I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            // StorageFull is not stable on every toolchain, so also
            // check the message
            _ if is_disk_full_error(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Create an error from a read-side I/O error with path context
    pub fn from_read_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            _ => StorageError::ReadError {
                path,
                source: error,
            },
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StorageError::DiskFull { .. }
                | StorageError::PermissionDenied { .. }
                | StorageError::CorruptDocument { .. }
                | StorageError::LegacyFormat { .. }
                | StorageError::SavesHeld { .. }
        )
    }

    /// True for errors where the file exists but cannot be used as a collection
    pub fn is_unreadable_document(&self) -> bool {
        matches!(
            self,
            StorageError::CorruptDocument { .. } | StorageError::LegacyFormat { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => {
                Some("Free up disk space and try again. Your changes are kept in memory until then.")
            }
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions. You may need to run with different permissions or change ownership.")
            }
            StorageError::CorruptDocument { .. } => {
                Some("Fix the file by hand, or move it aside and start with an empty collection.")
            }
            StorageError::LegacyFormat { .. } => {
                Some("Move the old file aside and start a new collection; entries in the old format have no kind, creator or genre.")
            }
            StorageError::SavesHeld { .. } => {
                Some("Fix the file and reload, or reload and agree to move it aside.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StorageError::WriteError { .. } | StorageError::AtomicWriteFailed { .. } => {
                Some("Your changes are kept in memory. Retry the save, or reload to discard them.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.is_recoverable());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = StorageError::from_io(io_err, PathBuf::from("/missing/file"));

        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/disk"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_read_side_classification() {
        let io_err = io::Error::new(
            io::ErrorKind::InvalidData,
            "stream did not contain valid UTF-8",
        );
        let err = StorageError::from_read_io(io_err, PathBuf::from("/data/collection.json"));

        assert!(matches!(err, StorageError::ReadError { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_corrupt_document_display() {
        let err = StorageError::CorruptDocument {
            path: PathBuf::from("/data/collection.json"),
            details: "expected value at line 1 column 1".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("unreadable"));
        assert!(msg.contains("/data/collection.json"));
        assert!(err.is_unreadable_document());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_legacy_format_display() {
        let err = StorageError::LegacyFormat {
            path: PathBuf::from("coleccion.json"),
            entries: 3,
        };

        assert!(err.to_string().contains("3 entries"));
        assert!(err.is_unreadable_document());
    }

    #[test]
    fn test_saves_held_is_not_an_unreadable_document() {
        let err = StorageError::SavesHeld {
            path: PathBuf::from("collection.json"),
        };

        assert!(err.to_string().contains("unreadable"));
        assert!(!err.is_unreadable_document());
        assert!(err.recovery_suggestion().unwrap().contains("reload"));
    }
}
