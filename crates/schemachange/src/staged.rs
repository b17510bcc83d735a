// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::path::{Path, PathBuf};

use strata_core::diagnostic::change::staged_verification_failed;
use strata_core::{CommitSequence, GenerationId, return_error};
use strata_catalog::TableGenerationDef;

use crate::format::{self, DataFileHeader, IndexFileHeader};

/// A generation under construction: artifacts on disk, not yet visible to
/// any reader.
///
/// Exclusively owned by the coordinator driving one schema change. On
/// success ownership of the artifacts transfers to the catalog entry via the
/// finalizer; on rollback the staging directory is discarded.
#[derive(Debug)]
pub struct StagedBuild {
    generation: TableGenerationDef,
    dir: PathBuf,
}

impl StagedBuild {
    pub(crate) fn new(generation: TableGenerationDef, dir: PathBuf) -> Self {
        Self { generation, dir }
    }

    pub fn generation(&self) -> &TableGenerationDef {
        &self.generation
    }

    pub fn id(&self) -> GenerationId {
        self.generation.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Structural self-check of the staged artifacts, without consulting the
    /// catalog: the artifacts must describe exactly the schema this build
    /// was asked for, and every declared index must be present and
    /// internally consistent.
    pub fn verify(&self) -> strata_core::Result<()> {
        let table = &self.generation.table;

        let marker = self.dir.join(format::COMPLETION_MARKER);
        if !marker.is_file() {
            return_error!(staged_verification_failed(table, "completion marker is missing"));
        }
        let marked: GenerationId = format::read_header(&marker)?;
        if marked != self.generation.id {
            return_error!(staged_verification_failed(
                table,
                format!("completion marker names generation {}, expected {}", marked, self.generation.id)
            ));
        }

        let header: DataFileHeader =
            format::read_header(&self.dir.join(&self.generation.artifacts.data_file))?;
        if header.table != *table
            || header.generation != self.generation.id
            || header.schema_version != self.generation.schema_version
        {
            return_error!(staged_verification_failed(
                table,
                "data file identity does not match the requested generation"
            ));
        }
        if header.columns != self.generation.columns {
            return_error!(staged_verification_failed(
                table,
                "row-format self-description diverges from the requested schema"
            ));
        }

        for index in &self.generation.indexes {
            let path = self.dir.join(format::index_file_name(&index.name));
            if !path.is_file() {
                return_error!(staged_verification_failed(
                    table,
                    format!("declared index '{}' was not built", index.name)
                ));
            }

            let index_header: IndexFileHeader = format::read_header(&path)?;
            if index_header.name != index.name
                || index_header.columns != index.columns
                || index_header.unique != index.unique
            {
                return_error!(staged_verification_failed(
                    table,
                    format!("index '{}' self-description diverges from the schema", index.name)
                ));
            }
            if index_header.entry_count != header.row_count {
                return_error!(staged_verification_failed(
                    table,
                    format!(
                        "index '{}' holds {} entries for {} rows",
                        index.name, index_header.entry_count, header.row_count
                    )
                ));
            }
        }

        Ok(())
    }

    /// Final descriptor published by the finalizer; consumes the staged
    /// build, whose artifacts now belong to the new catalog entry.
    pub(crate) fn into_generation(self, seq: CommitSequence) -> TableGenerationDef {
        let mut generation = self.generation;
        generation.commit_seq = seq;
        generation
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use strata_core::Type;
    use strata_catalog::SystemSequence;
    use strata_storage::{ArtifactStore, ArtifactStoreConfig, MemoryMetaStore};
    use strata_testing::tempdir::temp_dir;

    use crate::builder::EnvironmentBuilder;
    use crate::request::SchemaChangeRequest;

    use super::*;

    fn staged_build(root: &Path) -> StagedBuild {
        let artifacts = Arc::new(ArtifactStore::open(ArtifactStoreConfig::new(root)).unwrap());
        let sequence = Arc::new(SystemSequence::new(Arc::new(MemoryMetaStore::new())));
        let builder = EnvironmentBuilder::new(artifacts, sequence);

        let request = SchemaChangeRequest::add_table("orders")
            .with_column("id", Type::Int8, false)
            .with_index("by_id", vec!["id".to_string()], true);
        builder.build(&request).unwrap()
    }

    #[test]
    fn test_fresh_build_verifies() {
        temp_dir(|path| {
            let staged = staged_build(path);
            staged.verify().unwrap();
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_missing_marker_fails() {
        temp_dir(|path| {
            let staged = staged_build(path);
            fs::remove_file(staged.dir().join(format::COMPLETION_MARKER)).unwrap();

            let err = staged.verify().unwrap_err();
            assert_eq!(err.diagnostic().code, "SC_003");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_missing_index_fails() {
        temp_dir(|path| {
            let staged = staged_build(path);
            fs::remove_file(staged.dir().join("idx_by_id.key")).unwrap();

            let err = staged.verify().unwrap_err();
            assert_eq!(err.diagnostic().code, "SC_003");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_tampered_data_header_fails() {
        temp_dir(|path| {
            let staged = staged_build(path);

            let other = DataFileHeader {
                table: "orders".to_string(),
                generation: staged.id(),
                schema_version: staged.generation().schema_version,
                columns: vec![],
                row_count: 0,
            };
            format::write_header(&staged.dir().join("data.tbl"), &other).unwrap();

            let err = staged.verify().unwrap_err();
            assert_eq!(err.diagnostic().code, "SC_003");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_into_generation_assigns_commit_seq() {
        temp_dir(|path| {
            let staged = staged_build(path);
            let generation = staged.into_generation(CommitSequence(7));
            assert_eq!(generation.commit_seq, CommitSequence(7));
            Ok(())
        })
        .unwrap();
    }
}
