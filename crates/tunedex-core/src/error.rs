//! Error types for Tunedex core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Tunedex core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A path segment named a key that does not exist in the collection.
    #[error("Key not found: '{key}' (resolving {path})")]
    NotFound {
        /// The missing key.
        key: String,
        /// Encoded path being resolved.
        path: String,
    },

    /// Path is malformed, empty where a segment was required, or too long.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Key is empty or contains the path delimiter.
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey {
        /// The rejected key text.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Playlist item index is outside the playlist.
    #[error("Index {index} out of range (playlist has {len} items)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of items in the playlist.
        len: usize,
    },

    /// Path given for removal does not address the item at the index.
    #[error("Path mismatch at index {index}: item is {expected}, got {given}")]
    PathMismatch {
        /// Requested index.
        index: usize,
        /// Encoded path of the stored item.
        expected: String,
        /// Encoded path supplied by the caller.
        given: String,
    },

    /// Token is not a numeral in the given style.
    #[error("Invalid {style} numeral: '{token}'")]
    InvalidNumeral {
        /// The rejected token.
        token: String,
        /// Numeral style that was attempted.
        style: String,
    },

    /// Attribute exists but holds a value of another type.
    #[error("Attribute '{field}' is {found}, expected {expected}")]
    AttributeType {
        /// Attribute name.
        field: String,
        /// Requested type.
        expected: &'static str,
        /// Stored type.
        found: &'static str,
    },

    /// Rating outside the accepted range.
    #[error("Invalid rating: {0} (expected 0-5)")]
    InvalidRating(u8),

    /// Named playlist does not exist.
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    /// Named playlist already exists.
    #[error("Playlist already exists: {0}")]
    PlaylistAlreadyExists(String),

    /// Snapshot could not be written after an in-memory commit.
    #[error("Persistence failed at {path}: {reason}")]
    Persistence {
        /// Target of the write.
        path: PathBuf,
        /// Error message.
        reason: String,
    },

    /// A store lock was poisoned by a panicking writer.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a persistence error for the given target.
    pub fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a lock-poisoned error naming the store.
    pub fn poisoned(store: &str) -> Self {
        Self::LockPoisoned(format!("{store} lock poisoned"))
    }
}
