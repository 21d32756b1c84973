//! Error types for record store access.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced by [`TimezoneStore`](super::TimezoneStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not answer.
    #[error("record store unavailable: {message}")]
    Unavailable {
        /// Backend-specific description.
        message: String,
    },
    /// A lock guarding the records was poisoned.
    #[error("record store lock poisoned")]
    Poisoned,
    /// The seed file could not be read.
    #[error("failed to read records from '{path}': {source}")]
    Read {
        /// Seed file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The seed file is not a JSON array of records.
    #[error("failed to parse records in '{path}': {source}")]
    Parse {
        /// Seed file path.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Another user already holds the alias.
    #[error("alias '{alias}' already belongs to user {owner}")]
    AliasTaken {
        /// Requested alias.
        alias: String,
        /// Current holder.
        owner: u64,
    },
}

impl StoreError {
    /// Creates an unavailable error with a custom message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
