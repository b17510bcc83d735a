// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use strata_core::NodeIdentity;
use strata_catalog::{Catalog, CatalogStore, CommitOp, CommitRecord, SystemSequence, TableGenerationDef};
use strata_replication::{ReplicationWorker, SchemaChangeRecord};
use strata_storage::{ArtifactStore, MetaStore};
use tracing::{info, warn};

use crate::staged::StagedBuild;

/// Publishes a staged build atomically: durable metadata first, then the
/// derived effects.
///
/// The durable commit batch is the single source of truth. Artifact
/// promotion, the in-memory catalog swap and the replication emission are
/// all derived from it and idempotently re-derivable by [`Finalizer::replay`],
/// which is exactly what crash recovery and follower replay do.
pub struct Finalizer {
    catalog: Arc<Catalog>,
    meta: Arc<dyn MetaStore>,
    artifacts: Arc<ArtifactStore>,
    sequence: Arc<SystemSequence>,
    identity: Arc<dyn NodeIdentity>,
    replication: Option<Arc<ReplicationWorker>>,
}

impl Finalizer {
    pub fn new(
        catalog: Arc<Catalog>,
        meta: Arc<dyn MetaStore>,
        artifacts: Arc<ArtifactStore>,
        sequence: Arc<SystemSequence>,
        identity: Arc<dyn NodeIdentity>,
        replication: Option<Arc<ReplicationWorker>>,
    ) -> Self {
        Self { catalog, meta, artifacts, sequence, identity, replication }
    }

    /// Commit a staged build on the leader. Returns the now-visible
    /// generation.
    ///
    /// A failed durable write aborts cleanly: staging is discarded and the
    /// catalog is untouched. Once the durable write has succeeded the
    /// transition runs to completion; an error past that point leaves the
    /// record authoritative and recovery re-derives the rest.
    pub fn commit(&self, staged: StagedBuild) -> strata_core::Result<Arc<TableGenerationDef>> {
        let seq = self.sequence.next_commit_sequence()?;
        let id = staged.id();
        let generation = staged.into_generation(seq);

        let record = CommitRecord {
            seq,
            node: self.identity.node_id(),
            op: CommitOp::AddTable { generation: generation.clone() },
        };

        let batch = CatalogStore::stage_add_table(&record, &generation)?;
        if let Err(err) = self.meta.apply(batch) {
            let _ = self.artifacts.discard_staging(id);
            return Err(err.into());
        }

        self.artifacts.promote(id)?;

        let generation = Arc::new(generation);
        self.catalog.swap(generation.clone());
        self.catalog.advance_last_applied(seq);
        self.persist_watermark(&record);

        self.emit(&record);

        info!(
            "table '{}' generation {} visible at commit {}",
            generation.table, generation.id, seq
        );
        Ok(generation)
    }

    /// Commit the retirement of an active generation (drop table).
    pub fn commit_drop(&self, existing: &TableGenerationDef) -> strata_core::Result<()> {
        let seq = self.sequence.next_commit_sequence()?;

        let record = CommitRecord {
            seq,
            node: self.identity.node_id(),
            op: CommitOp::DropTable { table: existing.table.clone(), generation: existing.id },
        };

        self.meta.apply(CatalogStore::stage_drop_table(&record)?)?;

        self.catalog.remove(&existing.table);
        self.catalog.advance_last_applied(seq);
        self.persist_watermark(&record);

        // Open readers keep the generation descriptor through their Arc;
        // the unlinked files stay readable through handles the storage
        // engine already holds.
        if let Err(err) = self.artifacts.retire_live(existing.id) {
            warn!("failed to retire generation {} artifacts: {}", existing.id, err);
        }

        self.emit(&record);

        info!("table '{}' dropped at commit {}", existing.table, seq);
        Ok(())
    }

    /// Idempotently re-apply a durable commit record. Used by startup
    /// reconciliation and by followers replaying a leader's record; replaying
    /// the same record twice yields an identical catalog end state.
    pub fn replay(&self, record: &CommitRecord) -> strata_core::Result<()> {
        match &record.op {
            CommitOp::AddTable { generation } => {
                if let Some(active) = self.catalog.lookup(&generation.table) {
                    if active.id == generation.id {
                        // Already swapped in; the artifacts may still be
                        // sitting in staging if we crashed mid-commit.
                        if !self.artifacts.is_live(generation.id) {
                            self.artifacts.promote(generation.id)?;
                        }
                        self.finish_replay(record)?;
                        return Ok(());
                    }
                }

                self.meta.apply(CatalogStore::stage_add_table(record, generation)?)?;
                self.artifacts.promote(generation.id)?;
                self.catalog.swap(Arc::new(generation.clone()));
                self.sequence.observe_generation_id(generation.id)?;
                self.finish_replay(record)?;
            }
            CommitOp::DropTable { table, generation } => {
                self.meta.apply(CatalogStore::stage_drop_table(record)?)?;
                self.catalog.remove(table);
                if let Err(err) = self.artifacts.retire_live(*generation) {
                    warn!("failed to retire generation {} artifacts: {}", generation, err);
                }
                self.finish_replay(record)?;
            }
        }
        Ok(())
    }

    fn finish_replay(&self, record: &CommitRecord) -> strata_core::Result<()> {
        self.catalog.advance_last_applied(record.seq);
        self.persist_watermark(record);
        self.sequence.observe_commit_sequence(record.seq)?;
        Ok(())
    }

    /// Watermark persistence is best-effort: losing it only widens the next
    /// reconciliation scan, which is idempotent anyway.
    fn persist_watermark(&self, record: &CommitRecord) {
        if let Err(err) = CatalogStore::write_watermark(self.meta.as_ref(), record.seq) {
            warn!("failed to persist applied watermark {}: {}", record.seq, err);
        }
    }

    /// Hand the record to the replication worker. Never unwinds the local
    /// commit: delivery failures are retried asynchronously until followers
    /// converge.
    fn emit(&self, record: &CommitRecord) {
        let Some(replication) = &self.replication else {
            return;
        };

        match record.encode() {
            Ok(payload) => {
                replication.send(SchemaChangeRecord::local(record.seq, record.node, payload));
            }
            Err(err) => {
                warn!("failed to encode replication record {}: {}", record.seq, err);
            }
        }
    }
}
