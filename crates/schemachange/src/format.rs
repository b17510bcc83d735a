// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! On-disk shape of staged generation artifacts.
//!
//! Each artifact starts with a postcard-encoded header that fully describes
//! itself, so a staged build can be verified for structural correctness
//! without consulting the catalog. The storage engine below the catalog owns
//! everything after the header.

use std::fs;
use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};
use strata_core::diagnostic::storage::codec_error;
use strata_core::{GenerationId, SchemaVersion, error};
use strata_catalog::{ArtifactSet, ColumnDef};

use crate::request::IndexToCreate;

pub(crate) const DATA_FILE: &str = "data.tbl";
pub(crate) const COMPLETION_MARKER: &str = "BUILD_COMPLETE";

pub(crate) fn index_file_name(index: &str) -> String {
    format!("idx_{}.key", index)
}

pub(crate) fn artifact_set(indexes: &[IndexToCreate]) -> ArtifactSet {
    ArtifactSet {
        data_file: DATA_FILE.to_string(),
        index_files: indexes.iter().map(|i| index_file_name(&i.name)).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub(crate) struct DataFileHeader {
    pub table: String,
    pub generation: GenerationId,
    pub schema_version: SchemaVersion,
    pub columns: Vec<ColumnDef>,
    pub row_count: u64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub(crate) struct IndexFileHeader {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub entry_count: u64,
}

pub(crate) fn write_header<T: Serialize>(path: &Path, header: &T) -> strata_core::Result<()> {
    let bytes = postcard::to_allocvec(header).map_err(|e| error!(codec_error(e.to_string())))?;
    fs::write(path, bytes).map_err(|e| error!(codec_error(e.to_string())))?;
    Ok(())
}

pub(crate) fn read_header<T: DeserializeOwned>(path: &Path) -> strata_core::Result<T> {
    let bytes = fs::read(path).map_err(|e| error!(codec_error(e.to_string())))?;
    postcard::from_bytes(&bytes)
        .map_err(|_| error!(codec_error(format!("unreadable artifact header at {:?}", path))))
}
