// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::diagnostic::Diagnostic;
use crate::{CommitSequence, GenerationId};

/// Table already has an active generation under this name
pub fn table_already_exists(table: &str) -> Diagnostic {
    Diagnostic {
        code: "CA_001".to_string(),
        message: format!("table '{}' already exists", table),
        label: Some(format!("an active generation is already published for '{}'", table)),
        help: Some("drop the existing table first or pick a different name".to_string()),
        notes: vec![],
        cause: None,
    }
}

/// No active generation under this name
pub fn table_not_found(table: &str) -> Diagnostic {
    Diagnostic {
        code: "CA_002".to_string(),
        message: format!("table '{}' not found", table),
        label: None,
        help: None,
        notes: vec![],
        cause: None,
    }
}

/// A durable generation record could not be decoded
pub fn generation_record_corrupted(table: &str, generation: GenerationId) -> Diagnostic {
    Diagnostic {
        code: "CA_003".to_string(),
        message: format!(
            "generation record for table '{}' (generation {}) is corrupted",
            table, generation.0
        ),
        label: None,
        help: Some("the catalog metadata store may be damaged".to_string()),
        notes: vec![],
        cause: None,
    }
}

/// A durable commit record could not be decoded
pub fn commit_record_corrupted(seq: CommitSequence) -> Diagnostic {
    Diagnostic {
        code: "CA_004".to_string(),
        message: format!("commit record {} is corrupted", seq.0),
        label: None,
        help: Some("the catalog metadata store may be damaged".to_string()),
        notes: vec![],
        cause: None,
    }
}
