// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use strata_catalog::CatalogStore;
use tracing::{debug, info};

use crate::coordinator::SchemaChangeCoordinator;

/// Outcome of a startup reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Commit records re-applied because they were newer than the durable
    /// watermark.
    pub replayed: usize,
    /// Orphaned staged builds discarded.
    pub swept: usize,
}

impl SchemaChangeCoordinator {
    /// Synchronous startup reconciliation, run after [`strata_catalog::Catalog::load`]
    /// and before the node serves traffic.
    ///
    /// Re-applies every durable commit record newer than the applied
    /// watermark (a crash can leave the record written but its derived
    /// effects incomplete), then discards staged builds with no commit
    /// record, which are orphans of builds that never reached the commit
    /// step.
    pub fn reconcile(&self) -> strata_core::Result<ReconcileReport> {
        let watermark = CatalogStore::read_watermark(self.meta().as_ref())?;
        let records = CatalogStore::scan_commits_after(self.meta().as_ref(), watermark)?;

        for record in &records {
            debug!("reconciling commit {} for table '{}'", record.seq, record.table());
            self.finalizer().replay(record)?;
        }
        let replayed = records.len();

        // Every committed build was promoted above, so whatever is left in
        // the staging area never committed.
        let mut swept = 0;
        for generation in self.artifacts().list_staging()? {
            self.artifacts().discard_staging(generation)?;
            swept += 1;
        }

        if replayed > 0 || swept > 0 {
            info!(
                "reconciled catalog: {} commit(s) replayed, {} orphaned build(s) swept",
                replayed, swept
            );
        }

        Ok(ReconcileReport { replayed, swept })
    }
}
