// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use serde::{Deserialize, Serialize};
use strata_core::{CommitSequence, GenerationId, SchemaVersion, Type};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub ty: Type,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    /// Column names, in key order.
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Physical artifacts backing one generation, as file names relative to the
/// generation's directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSet {
    pub data_file: String,
    pub index_files: Vec<String>,
}

/// One immutable, fully-built version of a table's physical layout and
/// schema. This is what [`crate::Catalog::lookup`] hands to readers and what
/// the durable generation record persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableGenerationDef {
    pub id: GenerationId,
    pub table: String,
    pub schema_version: SchemaVersion,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
    pub artifacts: ArtifactSet,
    /// Commit sequence that published this generation; replay ordering key
    /// during recovery.
    pub commit_seq: CommitSequence,
}

impl TableGenerationDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}
