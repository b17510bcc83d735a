// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

// Not every test binary touches every fixture.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use strata_catalog::Catalog;
use strata_core::FixedNodeIdentity;
use strata_replication::{MemorySink, ReplicationWorker, ReplicationWorkerConfig};
use strata_schemachange::SchemaChangeCoordinator;
use strata_storage::{
    ArtifactStore, ArtifactStoreConfig, DurabilityMode, MemoryMetaStore, MetaStore,
    SqliteMetaStore,
};

pub struct TestDb {
    pub catalog: Arc<Catalog>,
    pub coordinator: SchemaChangeCoordinator,
    pub meta: Arc<dyn MetaStore>,
    pub artifacts: Arc<ArtifactStore>,
    pub sink: Arc<MemorySink>,
    pub worker: Arc<ReplicationWorker>,
}

fn build(meta: Arc<dyn MetaStore>, root: &Path, quota: Option<u64>) -> TestDb {
    let mut config = ArtifactStoreConfig::new(root.join("artifacts"));
    if let Some(quota) = quota {
        config = config.with_quota_bytes(quota);
    }
    let artifacts = Arc::new(ArtifactStore::open(config).unwrap());

    let catalog = Arc::new(Catalog::load(meta.as_ref()).unwrap());

    let sink = Arc::new(MemorySink::new());
    let worker = Arc::new(ReplicationWorker::spawn(
        sink.clone(),
        ReplicationWorkerConfig { max_attempts: 20, retry_delay: Duration::from_millis(1) },
    ));

    let coordinator = SchemaChangeCoordinator::new(
        catalog.clone(),
        meta.clone(),
        artifacts.clone(),
        Arc::new(FixedNodeIdentity::default()),
        Some(worker.clone()),
    );

    TestDb { catalog, coordinator, meta, artifacts, sink, worker }
}

/// Ephemeral database over an in-memory metadata store.
pub fn open_memory(root: &Path) -> TestDb {
    build(Arc::new(MemoryMetaStore::new()), root, None)
}

/// Same, with a byte quota on the artifact store.
pub fn open_memory_with_quota(root: &Path, quota: u64) -> TestDb {
    build(Arc::new(MemoryMetaStore::new()), root, Some(quota))
}

/// Durable database rooted at `root`; reopening the same root resumes from
/// the persisted catalog, as a restarted node would.
pub fn open_disk(root: &Path) -> TestDb {
    let meta: Arc<dyn MetaStore> =
        Arc::new(SqliteMetaStore::open(root.join("meta.db"), DurabilityMode::Full).unwrap());
    build(meta, root, None)
}
