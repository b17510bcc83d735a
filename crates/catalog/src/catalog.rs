// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use strata_core::CommitSequence;
use strata_storage::MetaStore;
use tracing::warn;

use crate::generation::TableGenerationDef;
use crate::store::CatalogStore;

/// Process-wide mapping from table name to the active generation.
///
/// Readers get an `Arc` snapshot and may keep using it across later swaps; a
/// generation's artifacts are only retired after its last reader drops the
/// snapshot. Exactly one generation is active per name at any instant, and
/// `swap`/`remove` are only called by the finalizer while it holds the
/// per-table admission marker.
pub struct Catalog {
    tables: DashMap<String, Arc<TableGenerationDef>>,
    last_applied: AtomicU64,
}

impl Catalog {
    pub fn new() -> Self {
        Self { tables: DashMap::new(), last_applied: AtomicU64::new(0) }
    }

    /// Rebuild the catalog from persisted generation records, as done at
    /// process start before reconciliation runs.
    pub fn load(store: &dyn MetaStore) -> crate::Result<Self> {
        let catalog = Self::new();

        for generation in CatalogStore::load_generations(store)? {
            if let Some(existing) = catalog.tables.get(&generation.table) {
                // Keep the newer record; an older duplicate means a retired
                // generation record was not cleaned up.
                if existing.commit_seq >= generation.commit_seq {
                    warn!(
                        "stale generation record {} for table '{}' ignored at load",
                        generation.id, generation.table
                    );
                    continue;
                }
            }
            catalog.tables.insert(generation.table.clone(), Arc::new(generation));
        }

        catalog.last_applied.store(CatalogStore::read_watermark(store)?.0, Ordering::SeqCst);

        Ok(catalog)
    }

    /// Snapshot of the active generation for `table`, if any.
    pub fn lookup(&self, table: &str) -> Option<Arc<TableGenerationDef>> {
        self.tables.get(table).map(|entry| entry.value().clone())
    }

    /// Publish `generation` as the active one for its table name, returning
    /// the previous generation. In-memory pointer update only; no I/O
    /// happens under the map entry.
    pub fn swap(&self, generation: Arc<TableGenerationDef>) -> Option<Arc<TableGenerationDef>> {
        self.tables.insert(generation.table.clone(), generation)
    }

    /// Remove the active generation for `table`, returning it.
    pub fn remove(&self, table: &str) -> Option<Arc<TableGenerationDef>> {
        self.tables.remove(table).map(|(_, generation)| generation)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Highest commit sequence this catalog has applied.
    pub fn last_applied(&self) -> CommitSequence {
        CommitSequence(self.last_applied.load(Ordering::SeqCst))
    }

    /// Monotonically advance the applied watermark.
    pub fn advance_last_applied(&self, seq: CommitSequence) {
        self.last_applied.fetch_max(seq.0, Ordering::SeqCst);
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
