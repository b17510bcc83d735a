// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use serde::{Deserialize, Serialize};
use strata_core::{CommitSequence, NodeId};

/// Whether a record was produced by this node or arrived from a peer.
///
/// Interface to the network dispatcher's locally/remotely-originated
/// classifier; the schema engine only ever sets `Local` on emission and
/// branches on `Remote` during replay.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordOrigin {
    Local,
    Remote,
}

/// Replication log record describing one committed schema change.
///
/// The payload is the postcard-encoded durable commit record; the transport
/// never interprets it, so the wire format of the log stays owned by the
/// catalog layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaChangeRecord {
    pub seq: CommitSequence,
    pub node: NodeId,
    pub origin: RecordOrigin,
    pub payload: Vec<u8>,
}

impl SchemaChangeRecord {
    pub fn local(seq: CommitSequence, node: NodeId, payload: Vec<u8>) -> Self {
        Self { seq, node, origin: RecordOrigin::Local, payload }
    }
}
