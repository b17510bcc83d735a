// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use strata_core::CommitSequence;

use crate::record::SchemaChangeRecord;

/// Error type for replication delivery. Never fatal to a local commit; the
/// worker retries until the sink accepts the record or gives up.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplicationError {
    /// The sink is temporarily unreachable.
    Unavailable(String),
    /// The sink rejected the record outright.
    Rejected(String),
}

impl Display for ReplicationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplicationError::Unavailable(msg) => write!(f, "replication sink unavailable: {}", msg),
            ReplicationError::Rejected(msg) => write!(f, "replication record rejected: {}", msg),
        }
    }
}

impl std::error::Error for ReplicationError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Ack {
    pub seq: CommitSequence,
}

/// Durable log transport carrying committed schema changes to followers.
pub trait ReplicationSink: Send + Sync {
    fn append(&self, record: &SchemaChangeRecord) -> Result<Ack, ReplicationError>;
}

/// In-process sink collecting appended records, with optional injected
/// failures for retry tests.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<SchemaChangeRecord>>,
    fail_next: AtomicU32,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` appends fail with `Unavailable`.
    pub fn fail_next(&self, count: u32) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<SchemaChangeRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl ReplicationSink for MemorySink {
    fn append(&self, record: &SchemaChangeRecord) -> Result<Ack, ReplicationError> {
        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(ReplicationError::Unavailable("injected failure".to_string()));
        }

        self.records.lock().push(record.clone());
        Ok(Ack { seq: record.seq })
    }
}
