// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use strata_core::diagnostic::catalog::{commit_record_corrupted, generation_record_corrupted};
use strata_core::diagnostic::storage::codec_error;
use strata_core::{
    CommitRecordKey, CommitSequence, EncodableKey, GenerationId, KeyKind, LastAppliedKey,
    TableGenerationKey, error,
};
use strata_storage::{Batch, MetaStore};

use crate::commit::{CommitOp, CommitRecord};
use crate::generation::TableGenerationDef;

/// Persistence of catalog metadata: generation records, commit records and
/// the applied watermark. Stateless; every function runs against a borrowed
/// [`MetaStore`].
pub struct CatalogStore {}

impl CatalogStore {
    /// Batch publishing a new generation: the commit record plus the
    /// generation record, applied as one durable unit.
    pub fn stage_add_table(
        record: &CommitRecord,
        generation: &TableGenerationDef,
    ) -> crate::Result<Batch> {
        debug_assert!(matches!(record.op, CommitOp::AddTable { .. }));

        let record_bytes =
            postcard::to_allocvec(record).map_err(|e| error!(codec_error(e.to_string())))?;
        let generation_bytes =
            postcard::to_allocvec(generation).map_err(|e| error!(codec_error(e.to_string())))?;

        Ok(Batch::new()
            .set(CommitRecordKey::new(record.seq).encode(), record_bytes)
            .set(
                TableGenerationKey::new(&generation.table, generation.id).encode(),
                generation_bytes,
            ))
    }

    /// Batch retiring a generation: the commit record plus removal of the
    /// generation record.
    pub fn stage_drop_table(record: &CommitRecord) -> crate::Result<Batch> {
        let CommitOp::DropTable { table, generation } = &record.op else {
            return Err(error!(codec_error("drop batch requires a DropTable record")));
        };

        let record_bytes =
            postcard::to_allocvec(record).map_err(|e| error!(codec_error(e.to_string())))?;

        Ok(Batch::new()
            .set(CommitRecordKey::new(record.seq).encode(), record_bytes)
            .remove(TableGenerationKey::new(table, *generation).encode()))
    }

    pub fn find_generation(
        store: &dyn MetaStore,
        table: &str,
        generation: GenerationId,
    ) -> crate::Result<Option<TableGenerationDef>> {
        let key = TableGenerationKey::new(table, generation).encode();
        let Some(bytes) = store.get(&key)? else {
            return Ok(None);
        };

        let def = postcard::from_bytes(&bytes)
            .map_err(|_| error!(generation_record_corrupted(table, generation)))?;
        Ok(Some(def))
    }

    /// Every persisted generation record, in key order.
    pub fn load_generations(store: &dyn MetaStore) -> crate::Result<Vec<TableGenerationDef>> {
        let mut out = Vec::new();
        for (key, bytes) in store.scan_prefix(&KeyKind::TableGeneration.prefix())? {
            let Some(decoded_key) = TableGenerationKey::decode(&key) else {
                return Err(error!(codec_error("unreadable generation record key")));
            };

            let def: TableGenerationDef = postcard::from_bytes(&bytes).map_err(|_| {
                error!(generation_record_corrupted(&decoded_key.table, decoded_key.generation))
            })?;
            out.push(def);
        }
        Ok(out)
    }

    pub fn commit_record(
        store: &dyn MetaStore,
        seq: CommitSequence,
    ) -> crate::Result<Option<CommitRecord>> {
        let Some(bytes) = store.get(&CommitRecordKey::new(seq).encode())? else {
            return Ok(None);
        };

        let record =
            postcard::from_bytes(&bytes).map_err(|_| error!(commit_record_corrupted(seq)))?;
        Ok(Some(record))
    }

    /// Commit records with a sequence strictly greater than `after`, in
    /// replay order.
    pub fn scan_commits_after(
        store: &dyn MetaStore,
        after: CommitSequence,
    ) -> crate::Result<Vec<CommitRecord>> {
        let mut out = Vec::new();
        for (key, bytes) in store.scan_prefix(&KeyKind::CommitRecord.prefix())? {
            let Some(decoded_key) = CommitRecordKey::decode(&key) else {
                return Err(error!(codec_error("unreadable commit record key")));
            };
            if decoded_key.seq <= after {
                continue;
            }

            let record: CommitRecord = postcard::from_bytes(&bytes)
                .map_err(|_| error!(commit_record_corrupted(decoded_key.seq)))?;
            out.push(record);
        }
        Ok(out)
    }

    pub fn read_watermark(store: &dyn MetaStore) -> crate::Result<CommitSequence> {
        let Some(bytes) = store.get(&LastAppliedKey {}.encode())? else {
            return Ok(CommitSequence::ZERO);
        };

        let array: [u8; 8] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| error!(codec_error("watermark record is not 8 bytes")))?;
        Ok(CommitSequence(u64::from_be_bytes(array)))
    }

    /// Advance the durable watermark. Not part of the commit batch: it is
    /// written only after the derived effects of a record (artifact
    /// promotion, catalog swap) have been applied, so recovery re-replays
    /// anything newer.
    pub fn write_watermark(store: &dyn MetaStore, seq: CommitSequence) -> crate::Result<()> {
        let current = Self::read_watermark(store)?;
        if seq <= current {
            return Ok(());
        }
        store.set(&LastAppliedKey {}.encode(), seq.0.to_be_bytes().to_vec())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use strata_core::{NodeId, SchemaVersion};
    use strata_storage::MemoryMetaStore;

    use crate::generation::{ArtifactSet, ColumnDef};
    use strata_core::Type;

    use super::*;

    fn generation(table: &str, id: u64, seq: u64) -> TableGenerationDef {
        TableGenerationDef {
            id: GenerationId(id),
            table: table.to_string(),
            schema_version: SchemaVersion(1),
            columns: vec![ColumnDef { name: "id".to_string(), ty: Type::Int8, nullable: false }],
            indexes: vec![],
            artifacts: ArtifactSet { data_file: "data".to_string(), index_files: vec![] },
            commit_seq: CommitSequence(seq),
        }
    }

    fn add_record(generation: TableGenerationDef) -> CommitRecord {
        CommitRecord {
            seq: generation.commit_seq,
            node: NodeId(1),
            op: CommitOp::AddTable { generation },
        }
    }

    #[test]
    fn test_add_table_roundtrip() {
        let store = MemoryMetaStore::new();
        let generation = generation("orders", 1, 1);
        let record = add_record(generation.clone());

        store.apply(CatalogStore::stage_add_table(&record, &generation).unwrap()).unwrap();

        let loaded =
            CatalogStore::find_generation(&store, "orders", GenerationId(1)).unwrap().unwrap();
        assert_eq!(loaded, generation);

        let loaded_record =
            CatalogStore::commit_record(&store, CommitSequence(1)).unwrap().unwrap();
        assert_eq!(loaded_record, record);
    }

    #[test]
    fn test_drop_removes_generation_record() {
        let store = MemoryMetaStore::new();
        let generation = generation("orders", 1, 1);
        let record = add_record(generation.clone());
        store.apply(CatalogStore::stage_add_table(&record, &generation).unwrap()).unwrap();

        let drop_record = CommitRecord {
            seq: CommitSequence(2),
            node: NodeId(1),
            op: CommitOp::DropTable { table: "orders".to_string(), generation: GenerationId(1) },
        };
        store.apply(CatalogStore::stage_drop_table(&drop_record).unwrap()).unwrap();

        assert!(
            CatalogStore::find_generation(&store, "orders", GenerationId(1)).unwrap().is_none()
        );
        assert_eq!(CatalogStore::load_generations(&store).unwrap(), vec![]);
    }

    #[test]
    fn test_scan_commits_after() {
        let store = MemoryMetaStore::new();
        for seq in 1..=5u64 {
            let generation = generation(&format!("t{}", seq), seq, seq);
            let record = add_record(generation.clone());
            store.apply(CatalogStore::stage_add_table(&record, &generation).unwrap()).unwrap();
        }

        let records = CatalogStore::scan_commits_after(&store, CommitSequence(3)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].seq, CommitSequence(4));
        assert_eq!(records[1].seq, CommitSequence(5));
    }

    #[test]
    fn test_watermark_roundtrip_and_monotonicity() {
        let store = MemoryMetaStore::new();
        assert_eq!(CatalogStore::read_watermark(&store).unwrap(), CommitSequence::ZERO);

        CatalogStore::write_watermark(&store, CommitSequence(4)).unwrap();
        CatalogStore::write_watermark(&store, CommitSequence(2)).unwrap();
        assert_eq!(CatalogStore::read_watermark(&store).unwrap(), CommitSequence(4));
    }

    #[test]
    fn test_catalog_load_from_store() {
        let store: Arc<dyn MetaStore> = Arc::new(MemoryMetaStore::new());
        let generation = generation("orders", 1, 1);
        let record = add_record(generation.clone());
        store.apply(CatalogStore::stage_add_table(&record, &generation).unwrap()).unwrap();
        CatalogStore::write_watermark(store.as_ref(), CommitSequence(1)).unwrap();

        let catalog = crate::Catalog::load(store.as_ref()).unwrap();
        assert_eq!(catalog.lookup("orders").unwrap().id, GenerationId(1));
        assert_eq!(catalog.last_applied(), CommitSequence(1));
    }
}
