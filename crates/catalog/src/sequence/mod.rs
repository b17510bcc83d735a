// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use strata_core::{
    CommitSequence, EncodableKey, EncodedKey, GenerationId, SystemSequenceId, SystemSequenceKey,
};
use strata_storage::MetaStore;

use crate::sequence::generator::GeneratorU64;

mod generator;

pub(crate) const GENERATION_SEQUENCE_ID: SystemSequenceId = SystemSequenceId(1);
pub(crate) const COMMIT_SEQUENCE_ID: SystemSequenceId = SystemSequenceId(2);

static GENERATION_KEY: Lazy<EncodedKey> =
    Lazy::new(|| SystemSequenceKey::new(GENERATION_SEQUENCE_ID).encode());

static COMMIT_KEY: Lazy<EncodedKey> =
    Lazy::new(|| SystemSequenceKey::new(COMMIT_SEQUENCE_ID).encode());

/// Durable monotonic counters backing generation ids and commit sequence
/// numbers.
///
/// Values come from the metadata store, never from wall-clock time, so they
/// cannot collide across process restarts or under clock skew. One lock
/// serializes all allocations; contention is bounded by the rate of schema
/// changes, not query traffic.
pub struct SystemSequence {
    store: Arc<dyn MetaStore>,
    lock: Mutex<()>,
}

impl SystemSequence {
    pub fn new(store: Arc<dyn MetaStore>) -> Self {
        Self { store, lock: Mutex::new(()) }
    }

    pub fn next_generation_id(&self) -> crate::Result<GenerationId> {
        let _guard = self.lock.lock();
        GeneratorU64::next(self.store.as_ref(), &GENERATION_KEY, "generation").map(GenerationId)
    }

    pub fn next_commit_sequence(&self) -> crate::Result<CommitSequence> {
        let _guard = self.lock.lock();
        GeneratorU64::next(self.store.as_ref(), &COMMIT_KEY, "commit").map(CommitSequence)
    }

    /// Fast-forward the commit sequence so locally allocated numbers stay
    /// ahead of a replayed leader record.
    pub fn observe_commit_sequence(&self, seq: CommitSequence) -> crate::Result<()> {
        let _guard = self.lock.lock();
        GeneratorU64::observe(self.store.as_ref(), &COMMIT_KEY, seq.0)
    }

    /// Same fast-forward for generation ids adopted from a leader.
    pub fn observe_generation_id(&self, id: GenerationId) -> crate::Result<()> {
        let _guard = self.lock.lock();
        GeneratorU64::observe(self.store.as_ref(), &GENERATION_KEY, id.0)
    }
}

#[cfg(test)]
mod tests {
    use strata_storage::MemoryMetaStore;

    use super::*;

    #[test]
    fn test_generation_ids_are_monotonic() {
        let sequence = SystemSequence::new(Arc::new(MemoryMetaStore::new()));

        for expected in 1..100u64 {
            assert_eq!(sequence.next_generation_id().unwrap(), GenerationId(expected));
        }
    }

    #[test]
    fn test_sequences_are_independent() {
        let sequence = SystemSequence::new(Arc::new(MemoryMetaStore::new()));

        assert_eq!(sequence.next_generation_id().unwrap(), GenerationId(1));
        assert_eq!(sequence.next_commit_sequence().unwrap(), CommitSequence(1));
        assert_eq!(sequence.next_generation_id().unwrap(), GenerationId(2));
    }

    #[test]
    fn test_observe_fast_forwards() {
        let sequence = SystemSequence::new(Arc::new(MemoryMetaStore::new()));

        sequence.observe_commit_sequence(CommitSequence(41)).unwrap();
        assert_eq!(sequence.next_commit_sequence().unwrap(), CommitSequence(42));

        // Observing an older value must not move the counter backwards.
        sequence.observe_commit_sequence(CommitSequence(10)).unwrap();
        assert_eq!(sequence.next_commit_sequence().unwrap(), CommitSequence(43));
    }
}
