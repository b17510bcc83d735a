// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use serde::{Deserialize, Serialize};
use strata_core::diagnostic::storage::codec_error;
use strata_core::{CommitSequence, GenerationId, NodeId, error};

use crate::generation::TableGenerationDef;

/// Schema transition described by a commit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommitOp {
    AddTable { generation: TableGenerationDef },
    DropTable { table: String, generation: GenerationId },
}

/// Durable description of one published schema change.
///
/// This record is the single source of truth for the transition: the
/// in-memory catalog swap, the artifact promotion and the replication
/// emission are all derived from it and re-derivable by replaying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub seq: CommitSequence,
    /// Originating cluster member; informational only.
    pub node: NodeId,
    pub op: CommitOp,
}

impl CommitRecord {
    /// Table name this record applies to.
    pub fn table(&self) -> &str {
        match &self.op {
            CommitOp::AddTable { generation } => &generation.table,
            CommitOp::DropTable { table, .. } => table,
        }
    }

    pub fn generation_id(&self) -> GenerationId {
        match &self.op {
            CommitOp::AddTable { generation } => generation.id,
            CommitOp::DropTable { generation, .. } => *generation,
        }
    }

    /// Bytes carried as the opaque payload of a replication record.
    pub fn encode(&self) -> crate::Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|e| error!(codec_error(e.to_string())))
    }

    pub fn decode(bytes: &[u8]) -> crate::Result<Self> {
        postcard::from_bytes(bytes)
            .map_err(|_| error!(codec_error("unreadable replicated commit record")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let record = CommitRecord {
            seq: CommitSequence(3),
            node: NodeId(2),
            op: CommitOp::DropTable { table: "orders".to_string(), generation: GenerationId(1) },
        };

        let bytes = record.encode().unwrap();
        assert_eq!(CommitRecord::decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_decode_garbage_is_diagnosed() {
        let err = CommitRecord::decode(&[0xff, 0xff, 0xff]).unwrap_err();
        assert_eq!(err.diagnostic().code, "ST_003");
    }
}
