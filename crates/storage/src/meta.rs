// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use strata_core::EncodedKey;

use crate::Result;

/// How strictly metadata writes are flushed before a commit is acknowledged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// Every commit batch is synced to stable storage before returning.
    #[default]
    Full,
    /// Commit batches may be acknowledged from the OS cache. Survives
    /// process crashes but not power loss; used by throwaway environments.
    Relaxed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    Set { key: EncodedKey, value: Vec<u8> },
    Remove { key: EncodedKey },
}

/// An ordered group of writes applied atomically by [`MetaStore::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: EncodedKey, value: Vec<u8>) -> Self {
        self.ops.push(BatchOp::Set { key, value });
        self
    }

    pub fn remove(mut self, key: EncodedKey) -> Self {
        self.ops.push(BatchOp::Remove { key });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }
}

/// Unversioned durable key/value store holding catalog metadata, commit
/// records and system sequences.
///
/// [`MetaStore::apply`] is the single-source-of-truth write: the batch must
/// become visible atomically, and with [`DurabilityMode::Full`] must be on
/// stable storage before it returns.
pub trait MetaStore: Send + Sync {
    fn get(&self, key: &EncodedKey) -> Result<Option<Vec<u8>>>;

    fn set(&self, key: &EncodedKey, value: Vec<u8>) -> Result<()>;

    fn remove(&self, key: &EncodedKey) -> Result<()>;

    /// All entries whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(EncodedKey, Vec<u8>)>>;

    /// Apply every op in `batch` as one atomic, durable unit.
    fn apply(&self, batch: Batch) -> Result<()>;
}
