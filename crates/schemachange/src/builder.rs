// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::path::Path;
use std::sync::Arc;

use strata_core::diagnostic::change::resource_exhausted;
use strata_core::error;
use strata_catalog::{IndexDef, SystemSequence, TableGenerationDef};
use strata_storage::ArtifactStore;
use tracing::debug;

use crate::format::{self, DataFileHeader, IndexFileHeader};
use crate::request::SchemaChangeRequest;
use crate::staged::StagedBuild;

/// Nominal bytes reserved per artifact file when admission-checking the
/// staging quota.
const INITIAL_EXTENT: u64 = 4096;

/// Constructs the on-disk artifacts for a new generation in the staging
/// area. Pure construction: nothing here is visible to readers, and a failed
/// build leaves no partial artifacts behind.
pub struct EnvironmentBuilder {
    artifacts: Arc<ArtifactStore>,
    sequence: Arc<SystemSequence>,
}

impl EnvironmentBuilder {
    pub fn new(artifacts: Arc<ArtifactStore>, sequence: Arc<SystemSequence>) -> Self {
        Self { artifacts, sequence }
    }

    /// Build a brand-new generation for a direct DDL request. The generation
    /// id comes from the durable monotonic sequence, so it cannot collide
    /// with any active or retired generation, across restarts included.
    pub fn build(&self, request: &SchemaChangeRequest) -> strata_core::Result<StagedBuild> {
        let id = self.sequence.next_generation_id()?;
        self.stage(request.to_generation(id))
    }

    /// Deterministically rebuild a leader-described generation during
    /// replay. The leader's id and schema are adopted, never re-allocated.
    pub fn rebuild(&self, generation: &TableGenerationDef) -> strata_core::Result<StagedBuild> {
        self.stage(generation.clone())
    }

    fn stage(&self, generation: TableGenerationDef) -> strata_core::Result<StagedBuild> {
        let wanted = INITIAL_EXTENT * (1 + generation.indexes.len() as u64);
        self.artifacts.ensure_capacity(wanted).map_err(|err| {
            if err.is_quota_exceeded() {
                error!(resource_exhausted(&generation.table, err.to_string()))
            } else {
                err.into()
            }
        })?;

        let id = generation.id;
        let dir = self.artifacts.create_staging(id)?;

        match self.populate(&dir, &generation) {
            Ok(()) => {
                debug!(
                    "staged generation {} for table '{}' ({} columns, {} indexes)",
                    id,
                    generation.table,
                    generation.columns.len(),
                    generation.indexes.len()
                );
                Ok(StagedBuild::new(generation, dir))
            }
            Err(err) => {
                let _ = self.artifacts.discard_staging(id);
                Err(err)
            }
        }
    }

    fn populate(&self, dir: &Path, generation: &TableGenerationDef) -> strata_core::Result<()> {
        let data_header = DataFileHeader {
            table: generation.table.clone(),
            generation: generation.id,
            schema_version: generation.schema_version,
            columns: generation.columns.clone(),
            row_count: 0,
        };
        format::write_header(&dir.join(&generation.artifacts.data_file), &data_header)?;

        for index in &generation.indexes {
            self.populate_index(dir, index)?;
        }

        // Marker written last: its presence certifies every artifact above
        // made it to disk.
        format::write_header(&dir.join(format::COMPLETION_MARKER), &generation.id)?;
        Ok(())
    }

    fn populate_index(&self, dir: &Path, index: &IndexDef) -> strata_core::Result<()> {
        // The initial data set of an added table is empty; entries arrive
        // through the storage engine once the generation is live.
        let header = IndexFileHeader {
            name: index.name.clone(),
            columns: index.columns.clone(),
            unique: index.unique,
            entry_count: 0,
        };
        format::write_header(&dir.join(format::index_file_name(&index.name)), &header)
    }
}

#[cfg(test)]
mod tests {
    use strata_core::Type;
    use strata_storage::{ArtifactStoreConfig, MemoryMetaStore};
    use strata_testing::tempdir::temp_dir;

    use super::*;

    fn builder(root: &Path, quota: Option<u64>) -> EnvironmentBuilder {
        let mut config = ArtifactStoreConfig::new(root);
        if let Some(quota) = quota {
            config = config.with_quota_bytes(quota);
        }
        let artifacts = Arc::new(ArtifactStore::open(config).unwrap());
        let sequence = Arc::new(SystemSequence::new(Arc::new(MemoryMetaStore::new())));
        EnvironmentBuilder::new(artifacts, sequence)
    }

    fn request() -> SchemaChangeRequest {
        SchemaChangeRequest::add_table("orders")
            .with_column("id", Type::Int8, false)
            .with_column("amount", Type::Decimal, true)
            .with_index("by_id", vec!["id".to_string()], true)
    }

    #[test]
    fn test_build_stages_all_artifacts() {
        temp_dir(|path| {
            let builder = builder(path, None);
            let staged = builder.build(&request()).unwrap();

            let generation = staged.generation();
            assert_eq!(generation.table, "orders");
            assert!(staged.dir().join("data.tbl").is_file());
            assert!(staged.dir().join("idx_by_id.key").is_file());
            assert!(staged.dir().join(format::COMPLETION_MARKER).is_file());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_build_allocates_fresh_generation_ids() {
        temp_dir(|path| {
            let builder = builder(path, None);
            let first = builder.build(&request()).unwrap();
            let second = builder.build(&request()).unwrap();
            assert_ne!(first.id(), second.id());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_quota_exhaustion_is_diagnosed() {
        temp_dir(|path| {
            let builder = builder(path, Some(16));
            let err = builder.build(&request()).unwrap_err();
            assert_eq!(err.diagnostic().code, "SC_006");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_rebuild_adopts_generation_id() {
        temp_dir(|path| {
            let builder = builder(path, None);
            let def = request().to_generation(strata_core::GenerationId(42));

            let staged = builder.rebuild(&def).unwrap();
            assert_eq!(staged.id(), strata_core::GenerationId(42));
            Ok(())
        })
        .unwrap();
    }
}
