// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt::{Display, Formatter};

use strata_core::diagnostic::catalog::{table_already_exists, table_not_found};
use strata_core::diagnostic::change::{
    build_failed, change_cancelled, change_in_progress, commit_failed,
};

/// Error type for schema-change requests, one variant per terminal failure
/// the caller can observe.
///
/// Everything except `Commit` is raised before the commit step and is fully
/// reversible: the catalog is untouched and no staged artifacts remain
/// referenced. `Commit` aborts the attempt before the catalog swap, so it is
/// reversible too; it is fatal only to this attempt.
#[derive(Debug)]
pub enum SchemaChangeError {
    /// Another schema change on the same table is in flight; retry later.
    Conflict { table: String },
    /// An active generation already exists under this name.
    AlreadyExists { table: String },
    /// No active generation exists under this name.
    NotFound { table: String },
    /// Validation or staging failed; the change was rolled back.
    Build { table: String, cause: strata_core::Error },
    /// The durable commit write failed; the change was aborted.
    Commit { table: String, cause: strata_core::Error },
    /// The change was cancelled before the commit step began.
    Cancelled { table: String },
}

impl SchemaChangeError {
    pub fn table(&self) -> &str {
        match self {
            SchemaChangeError::Conflict { table }
            | SchemaChangeError::AlreadyExists { table }
            | SchemaChangeError::NotFound { table }
            | SchemaChangeError::Build { table, .. }
            | SchemaChangeError::Commit { table, .. }
            | SchemaChangeError::Cancelled { table } => table,
        }
    }
}

impl Display for SchemaChangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaChangeError::Conflict { table } => {
                write!(f, "schema change already in progress for table '{}'", table)
            }
            SchemaChangeError::AlreadyExists { table } => {
                write!(f, "table '{}' already exists", table)
            }
            SchemaChangeError::NotFound { table } => write!(f, "table '{}' not found", table),
            SchemaChangeError::Build { table, cause } => {
                write!(f, "failed to build table '{}': {}", table, cause)
            }
            SchemaChangeError::Commit { table, cause } => {
                write!(f, "failed to commit table '{}': {}", table, cause)
            }
            SchemaChangeError::Cancelled { table } => {
                write!(f, "schema change for table '{}' was cancelled", table)
            }
        }
    }
}

impl std::error::Error for SchemaChangeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaChangeError::Build { cause, .. } | SchemaChangeError::Commit { cause, .. } => {
                Some(cause)
            }
            _ => None,
        }
    }
}

impl From<SchemaChangeError> for strata_core::Error {
    fn from(err: SchemaChangeError) -> Self {
        strata_core::error!(match err {
            SchemaChangeError::Conflict { table } => change_in_progress(&table),
            SchemaChangeError::AlreadyExists { table } => table_already_exists(&table),
            SchemaChangeError::NotFound { table } => table_not_found(&table),
            SchemaChangeError::Build { table, cause } => build_failed(&table, cause.diagnostic()),
            SchemaChangeError::Commit { table, cause } => commit_failed(&table, cause.diagnostic()),
            SchemaChangeError::Cancelled { table } => change_cancelled(&table),
        })
    }
}
