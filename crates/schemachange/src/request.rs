// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::HashSet;

use strata_core::diagnostic::schema::{
    duplicate_column, duplicate_index, empty_schema, index_unknown_column, invalid_table_name,
};
use strata_core::{GenerationId, SchemaVersion, Type, return_error};
use strata_catalog::{ColumnDef, IndexDef, TableGenerationDef};

use crate::format;

const MAX_TABLE_NAME_BYTES: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnToCreate {
    pub name: String,
    pub ty: Type,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexToCreate {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// How the new generation's physical layout is produced. A fresh table is
/// always a side build; rebuild-in-place only applies to transitions that
/// start from existing data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LayoutStrategy {
    #[default]
    SideBuild,
    RebuildInPlace,
}

/// Closed set of request origins, branched explicitly by the coordinator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RequestOrigin {
    /// Direct DDL issued by a local caller.
    #[default]
    Ddl,
    /// Re-application of a leader-committed change on a follower.
    Replay,
}

/// Validated description of a requested table. Immutable once admitted: the
/// coordinator takes it by value and nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct SchemaChangeRequest {
    pub table: String,
    pub columns: Vec<ColumnToCreate>,
    pub indexes: Vec<IndexToCreate>,
    pub layout: LayoutStrategy,
    pub origin: RequestOrigin,
}

impl SchemaChangeRequest {
    pub fn add_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            layout: LayoutStrategy::default(),
            origin: RequestOrigin::default(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, ty: Type, nullable: bool) -> Self {
        self.columns.push(ColumnToCreate { name: name.into(), ty, nullable });
        self
    }

    pub fn with_index(
        mut self,
        name: impl Into<String>,
        columns: Vec<String>,
        unique: bool,
    ) -> Self {
        self.indexes.push(IndexToCreate { name: name.into(), columns, unique });
        self
    }

    pub(crate) fn validate(&self) -> strata_core::Result<()> {
        if self.table.is_empty() || self.table.len() > MAX_TABLE_NAME_BYTES {
            return_error!(invalid_table_name(&self.table));
        }

        if self.columns.is_empty() {
            return_error!(empty_schema(&self.table));
        }

        let mut columns = HashSet::new();
        for column in &self.columns {
            if !columns.insert(column.name.as_str()) {
                return_error!(duplicate_column(&self.table, &column.name));
            }
        }

        let mut indexes = HashSet::new();
        for index in &self.indexes {
            if !indexes.insert(index.name.as_str()) {
                return_error!(duplicate_index(&self.table, &index.name));
            }
            for column in &index.columns {
                if !columns.contains(column.as_str()) {
                    return_error!(index_unknown_column(&self.table, &index.name, column));
                }
            }
        }

        Ok(())
    }

    /// Descriptor for the generation this request will build. The commit
    /// sequence stays zero until the finalizer assigns one.
    pub(crate) fn to_generation(&self, id: GenerationId) -> TableGenerationDef {
        TableGenerationDef {
            id,
            table: self.table.clone(),
            schema_version: SchemaVersion(1),
            columns: self
                .columns
                .iter()
                .map(|c| ColumnDef { name: c.name.clone(), ty: c.ty, nullable: c.nullable })
                .collect(),
            indexes: self
                .indexes
                .iter()
                .map(|i| IndexDef {
                    name: i.name.clone(),
                    columns: i.columns.clone(),
                    unique: i.unique,
                })
                .collect(),
            artifacts: format::artifact_set(&self.indexes),
            commit_seq: strata_core::CommitSequence::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SchemaChangeRequest {
        SchemaChangeRequest::add_table("orders")
            .with_column("id", Type::Int8, false)
            .with_column("amount", Type::Decimal, true)
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_empty_table_name() {
        let err = SchemaChangeRequest::add_table("")
            .with_column("id", Type::Int8, false)
            .validate()
            .unwrap_err();
        assert_eq!(err.diagnostic().code, "SC_101");
    }

    #[test]
    fn test_oversized_table_name() {
        let err = SchemaChangeRequest::add_table("x".repeat(65))
            .with_column("id", Type::Int8, false)
            .validate()
            .unwrap_err();
        assert_eq!(err.diagnostic().code, "SC_101");
    }

    #[test]
    fn test_no_columns() {
        let err = SchemaChangeRequest::add_table("orders").validate().unwrap_err();
        assert_eq!(err.diagnostic().code, "SC_102");
    }

    #[test]
    fn test_duplicate_column() {
        let err = request().with_column("id", Type::Int4, false).validate().unwrap_err();
        assert_eq!(err.diagnostic().code, "SC_103");
    }

    #[test]
    fn test_index_on_unknown_column() {
        let err = request()
            .with_index("by_customer", vec!["customer".to_string()], false)
            .validate()
            .unwrap_err();
        assert_eq!(err.diagnostic().code, "SC_104");
    }

    #[test]
    fn test_duplicate_index() {
        let err = request()
            .with_index("by_id", vec!["id".to_string()], true)
            .with_index("by_id", vec!["amount".to_string()], false)
            .validate()
            .unwrap_err();
        assert_eq!(err.diagnostic().code, "SC_105");
    }

    #[test]
    fn test_to_generation_carries_schema() {
        let generation = request()
            .with_index("by_id", vec!["id".to_string()], true)
            .to_generation(GenerationId(5));

        assert_eq!(generation.id, GenerationId(5));
        assert_eq!(generation.table, "orders");
        assert_eq!(generation.columns.len(), 2);
        assert_eq!(generation.indexes.len(), 1);
        assert_eq!(generation.artifacts.index_files.len(), 1);
    }
}
