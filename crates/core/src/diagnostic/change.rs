// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::diagnostic::Diagnostic;

/// Another schema change is already admitted for this table
pub fn change_in_progress(table: &str) -> Diagnostic {
    Diagnostic {
        code: "SC_001".to_string(),
        message: format!("schema change already in progress for table '{}'", table),
        label: None,
        help: Some("wait for the in-flight change to finish and retry".to_string()),
        notes: vec![],
        cause: None,
    }
}

/// Environment build failed while staging artifacts
pub fn build_failed(table: &str, cause: Diagnostic) -> Diagnostic {
    Diagnostic {
        code: "SC_002".to_string(),
        message: format!("failed to build new generation for table '{}'", table),
        label: None,
        help: Some("the change was rolled back; the catalog is unchanged".to_string()),
        notes: vec![],
        cause: Some(Box::new(cause)),
    }
}

/// Staged artifacts do not match the requested schema
pub fn staged_verification_failed(table: &str, detail: impl Into<String>) -> Diagnostic {
    Diagnostic {
        code: "SC_003".to_string(),
        message: format!("staged build for table '{}' failed verification", table),
        label: Some(detail.into()),
        help: None,
        notes: vec![],
        cause: None,
    }
}

/// Durable commit write failed before the catalog swap
pub fn commit_failed(table: &str, cause: Diagnostic) -> Diagnostic {
    Diagnostic {
        code: "SC_004".to_string(),
        message: format!("failed to commit new generation for table '{}'", table),
        label: None,
        help: Some("the change was aborted; the catalog is unchanged".to_string()),
        notes: vec![],
        cause: Some(Box::new(cause)),
    }
}

/// Change was cancelled before the commit step began
pub fn change_cancelled(table: &str) -> Diagnostic {
    Diagnostic {
        code: "SC_005".to_string(),
        message: format!("schema change for table '{}' was cancelled", table),
        label: None,
        help: None,
        notes: vec![],
        cause: None,
    }
}

/// Staging area cannot hold the new artifacts
pub fn resource_exhausted(table: &str, detail: impl Into<String>) -> Diagnostic {
    Diagnostic {
        code: "SC_006".to_string(),
        message: format!("resource exhausted while building table '{}'", table),
        label: Some(detail.into()),
        help: Some("free storage space or raise the staging quota".to_string()),
        notes: vec![],
        cause: None,
    }
}
