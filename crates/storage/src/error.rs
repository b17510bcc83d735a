// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use strata_core::diagnostic::storage::{artifact_store_error, codec_error, meta_store_error};
use thiserror::Error;

/// Error type for the metadata and artifact stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation on artifacts failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata store backend failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored bytes do not decode to the expected shape.
    #[error("corrupted store state: {0}")]
    Corrupted(String),

    /// The artifact store quota would be exceeded.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
}

impl StorageError {
    /// Whether this failure is the staging-area running out of space, as
    /// opposed to a broken store.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded(_))
    }
}

impl From<StorageError> for strata_core::Error {
    fn from(err: StorageError) -> Self {
        strata_core::error!(match err {
            StorageError::Sqlite(e) => meta_store_error(e.to_string()),
            StorageError::Io(e) => artifact_store_error(e.to_string()),
            StorageError::QuotaExceeded(msg) => artifact_store_error(msg),
            StorageError::Corrupted(msg) => codec_error(msg),
        })
    }
}
