// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crossbeam_skiplist::SkipMap;
use strata_core::EncodedKey;

use crate::meta::{Batch, BatchOp, MetaStore};
use crate::Result;

/// In-memory [`MetaStore`] used by unit tests and ephemeral databases.
/// Provides atomic visibility of batches under a write lock but, by nature,
/// no durability.
#[derive(Default)]
pub struct MemoryMetaStore {
    entries: SkipMap<EncodedKey, Vec<u8>>,
    write_lock: parking_lot::Mutex<()>,
}

impl MemoryMetaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetaStore for MemoryMetaStore {
    fn get(&self, key: &EncodedKey) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &EncodedKey, value: Vec<u8>) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.entries.insert(key.clone(), value);
        Ok(())
    }

    fn remove(&self, key: &EncodedKey) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.entries.remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(EncodedKey, Vec<u8>)>> {
        let start = EncodedKey::new(prefix.to_vec());
        let mut out = Vec::new();
        for entry in self.entries.range(start..) {
            if !entry.key().as_slice().starts_with(prefix) {
                break;
            }
            out.push((entry.key().clone(), entry.value().clone()));
        }
        Ok(out)
    }

    fn apply(&self, batch: Batch) -> Result<()> {
        let _guard = self.write_lock.lock();
        for op in batch.ops() {
            match op {
                BatchOp::Set { key, value } => {
                    self.entries.insert(key.clone(), value.clone());
                }
                BatchOp::Remove { key } => {
                    self.entries.remove(key);
                }
            }
        }
        Ok(())
    }
}
