// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use strata_core::NodeIdentity;
use strata_catalog::{AdmissionSet, Catalog, CommitOp, CommitRecord, SystemSequence};
use strata_replication::{ReplicationWorker, SchemaChangeRecord};
use strata_storage::{ArtifactStore, MetaStore};
use tracing::{debug, info, trace};

use crate::builder::EnvironmentBuilder;
use crate::context::RequestContext;
use crate::error::SchemaChangeError;
use crate::finalizer::Finalizer;
use crate::request::{RequestOrigin, SchemaChangeRequest};

/// States of one schema change. Every request ends in `Visible`,
/// `RolledBack` or `Failed`; everything before `Committing` is fully
/// reversible and leaves the catalog untouched.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChangeState {
    Validating,
    Building,
    Staged,
    Committing,
    Visible,
    RolledBack,
    Failed,
}

impl Display for ChangeState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChangeState::Validating => "validating",
            ChangeState::Building => "building",
            ChangeState::Staged => "staged",
            ChangeState::Committing => "committing",
            ChangeState::Visible => "visible",
            ChangeState::RolledBack => "rolled_back",
            ChangeState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Orchestrates validation, build, staging and finalization of schema
/// changes against a live catalog.
///
/// Changes on the same table are serialized through the per-table admission
/// set; changes on different tables proceed concurrently. Query traffic is
/// never blocked by a build; readers only contend on the short in-memory
/// swap inside the finalizer.
pub struct SchemaChangeCoordinator {
    catalog: Arc<Catalog>,
    admission: Arc<AdmissionSet>,
    meta: Arc<dyn MetaStore>,
    artifacts: Arc<ArtifactStore>,
    builder: EnvironmentBuilder,
    finalizer: Finalizer,
}

impl SchemaChangeCoordinator {
    pub fn new(
        catalog: Arc<Catalog>,
        meta: Arc<dyn MetaStore>,
        artifacts: Arc<ArtifactStore>,
        identity: Arc<dyn NodeIdentity>,
        replication: Option<Arc<ReplicationWorker>>,
    ) -> Self {
        let sequence = Arc::new(SystemSequence::new(meta.clone()));
        let builder = EnvironmentBuilder::new(artifacts.clone(), sequence.clone());
        let finalizer = Finalizer::new(
            catalog.clone(),
            meta.clone(),
            artifacts.clone(),
            sequence,
            identity,
            replication,
        );

        Self {
            catalog,
            admission: Arc::new(AdmissionSet::new()),
            meta,
            artifacts,
            builder,
            finalizer,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Introduce a new table into the live catalog.
    ///
    /// Synchronous from the caller's point of view: returns only once the
    /// new generation is visible to new transactions, or a terminal failure
    /// state was reached. Partial states are never exposed.
    pub fn request_add_table(
        &self,
        request: SchemaChangeRequest,
        ctx: &RequestContext,
    ) -> Result<(), SchemaChangeError> {
        debug_assert_eq!(request.origin, RequestOrigin::Ddl);

        let table = request.table.clone();
        let _admission = self
            .admission
            .admit(&table)
            .map_err(|_| SchemaChangeError::Conflict { table: table.clone() })?;

        debug!("add table '{}' requested by session '{}' (txn {})", table, ctx.session, ctx.txn.0);

        // The admission marker is released when the guard drops, on every
        // exit path below.
        self.run_add_table(request, ctx)
    }

    fn run_add_table(
        &self,
        request: SchemaChangeRequest,
        ctx: &RequestContext,
    ) -> Result<(), SchemaChangeError> {
        let table = request.table.clone();

        self.transition(&table, ChangeState::Validating);
        if ctx.cancellation.is_cancelled() {
            self.transition(&table, ChangeState::RolledBack);
            return Err(SchemaChangeError::Cancelled { table });
        }
        if self.catalog.contains(&table) {
            self.transition(&table, ChangeState::RolledBack);
            return Err(SchemaChangeError::AlreadyExists { table });
        }
        if let Err(cause) = request.validate() {
            self.transition(&table, ChangeState::RolledBack);
            return Err(SchemaChangeError::Build { table, cause });
        }

        self.transition(&table, ChangeState::Building);
        let staged = match self.builder.build(&request) {
            Ok(staged) => staged,
            Err(cause) => {
                self.transition(&table, ChangeState::RolledBack);
                return Err(SchemaChangeError::Build { table, cause });
            }
        };

        self.transition(&table, ChangeState::Staged);
        if let Err(cause) = staged.verify() {
            let _ = self.artifacts.discard_staging(staged.id());
            self.transition(&table, ChangeState::RolledBack);
            return Err(SchemaChangeError::Build { table, cause });
        }
        if ctx.cancellation.is_cancelled() {
            let _ = self.artifacts.discard_staging(staged.id());
            self.transition(&table, ChangeState::RolledBack);
            return Err(SchemaChangeError::Cancelled { table });
        }

        // Point of no return: cancellation is no longer honored, the commit
        // step runs to completion or fails outright.
        self.transition(&table, ChangeState::Committing);
        match self.finalizer.commit(staged) {
            Ok(_generation) => {
                self.transition(&table, ChangeState::Visible);
                Ok(())
            }
            Err(cause) => {
                self.transition(&table, ChangeState::Failed);
                Err(SchemaChangeError::Commit { table, cause })
            }
        }
    }

    /// Retire an active table, the symmetric transition to
    /// [`Self::request_add_table`]. No build phase: validation leads
    /// straight to the commit step.
    pub fn request_drop_table(
        &self,
        table: &str,
        ctx: &RequestContext,
    ) -> Result<(), SchemaChangeError> {
        let _admission = self
            .admission
            .admit(table)
            .map_err(|_| SchemaChangeError::Conflict { table: table.to_string() })?;

        debug!("drop table '{}' requested by session '{}' (txn {})", table, ctx.session, ctx.txn.0);

        self.transition(table, ChangeState::Validating);
        if ctx.cancellation.is_cancelled() {
            self.transition(table, ChangeState::RolledBack);
            return Err(SchemaChangeError::Cancelled { table: table.to_string() });
        }
        let Some(existing) = self.catalog.lookup(table) else {
            self.transition(table, ChangeState::RolledBack);
            return Err(SchemaChangeError::NotFound { table: table.to_string() });
        };

        self.transition(table, ChangeState::Committing);
        match self.finalizer.commit_drop(&existing) {
            Ok(()) => {
                self.transition(table, ChangeState::Visible);
                Ok(())
            }
            Err(cause) => {
                self.transition(table, ChangeState::Failed);
                Err(SchemaChangeError::Commit { table: table.to_string(), cause })
            }
        }
    }

    /// Apply a leader-committed record delivered over the replication
    /// transport.
    pub fn apply_replicated(
        &self,
        record: &SchemaChangeRecord,
        ctx: &RequestContext,
    ) -> strata_core::Result<()> {
        let commit = CommitRecord::decode(&record.payload)?;
        self.apply_commit_record(&commit, ctx).map_err(strata_core::Error::from)
    }

    /// Replay a leader's commit record, adopting its generation id and
    /// commit sequence. Re-application of an already-applied record is a
    /// no-op success.
    pub fn apply_commit_record(
        &self,
        record: &CommitRecord,
        ctx: &RequestContext,
    ) -> Result<(), SchemaChangeError> {
        let table = record.table().to_string();
        let _admission = self
            .admission
            .admit(&table)
            .map_err(|_| SchemaChangeError::Conflict { table: table.clone() })?;

        debug!(
            "replaying commit {} for table '{}' (session '{}')",
            record.seq, table, ctx.session
        );

        self.transition(&table, ChangeState::Validating);
        match &record.op {
            CommitOp::AddTable { generation } => {
                if let Some(active) = self.catalog.lookup(&table) {
                    if active.id == generation.id {
                        trace!(
                            "commit {} already applied for table '{}', replay is a no-op",
                            record.seq, table
                        );
                        return Ok(());
                    }
                    self.transition(&table, ChangeState::RolledBack);
                    return Err(SchemaChangeError::AlreadyExists { table });
                }

                self.transition(&table, ChangeState::Building);
                let staged = match self.builder.rebuild(generation) {
                    Ok(staged) => staged,
                    Err(cause) => {
                        self.transition(&table, ChangeState::RolledBack);
                        return Err(SchemaChangeError::Build { table, cause });
                    }
                };

                self.transition(&table, ChangeState::Staged);
                if let Err(cause) = staged.verify() {
                    let _ = self.artifacts.discard_staging(staged.id());
                    self.transition(&table, ChangeState::RolledBack);
                    return Err(SchemaChangeError::Build { table, cause });
                }

                self.transition(&table, ChangeState::Committing);
                if let Err(cause) = self.finalizer.replay(record) {
                    self.transition(&table, ChangeState::Failed);
                    return Err(SchemaChangeError::Commit { table, cause });
                }
            }
            CommitOp::DropTable { .. } => {
                if self.catalog.lookup(&table).is_none() {
                    trace!(
                        "commit {} already applied for table '{}', replay is a no-op",
                        record.seq, table
                    );
                    return Ok(());
                }

                self.transition(&table, ChangeState::Committing);
                if let Err(cause) = self.finalizer.replay(record) {
                    self.transition(&table, ChangeState::Failed);
                    return Err(SchemaChangeError::Commit { table, cause });
                }
            }
        }

        self.transition(&table, ChangeState::Visible);
        info!("replayed commit {} for table '{}'", record.seq, table);
        Ok(())
    }

    pub(crate) fn finalizer(&self) -> &Finalizer {
        &self.finalizer
    }

    pub(crate) fn meta(&self) -> &Arc<dyn MetaStore> {
        &self.meta
    }

    pub(crate) fn artifacts(&self) -> &Arc<ArtifactStore> {
        &self.artifacts
    }

    fn transition(&self, table: &str, state: ChangeState) {
        trace!("schema change for table '{}' entered state {}", table, state);
    }
}
