// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::CommitSequence;
use crate::diagnostic::Diagnostic;

/// Sink rejected the record; the worker will retry
pub fn append_failed(seq: CommitSequence, msg: impl Into<String>) -> Diagnostic {
    Diagnostic {
        code: "RP_001".to_string(),
        message: format!("failed to append replication record {}: {}", seq.0, msg.into()),
        label: None,
        help: Some("the local commit already succeeded; delivery is retried".to_string()),
        notes: vec![],
        cause: None,
    }
}

/// Record gave up after exhausting retries
pub fn delivery_abandoned(seq: CommitSequence, attempts: u32) -> Diagnostic {
    Diagnostic {
        code: "RP_002".to_string(),
        message: format!(
            "gave up delivering replication record {} after {} attempts",
            seq.0, attempts
        ),
        label: None,
        help: Some("followers will converge via catch-up replay".to_string()),
        notes: vec![],
        cause: None,
    }
}
