// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::diagnostic::Diagnostic;

/// Metadata store operation failed
pub fn meta_store_error(msg: impl Into<String>) -> Diagnostic {
    Diagnostic {
        code: "ST_001".to_string(),
        message: format!("metadata store error: {}", msg.into()),
        label: None,
        help: Some("check the metadata store path and availability".to_string()),
        notes: vec![],
        cause: None,
    }
}

/// Artifact store operation failed
pub fn artifact_store_error(msg: impl Into<String>) -> Diagnostic {
    Diagnostic {
        code: "ST_002".to_string(),
        message: format!("artifact store error: {}", msg.into()),
        label: None,
        help: None,
        notes: vec![],
        cause: None,
    }
}

/// Stored bytes failed to decode
pub fn codec_error(msg: impl Into<String>) -> Diagnostic {
    Diagnostic {
        code: "ST_003".to_string(),
        message: format!("codec error: {}", msg.into()),
        label: None,
        help: Some("this may indicate data corruption or a version mismatch".to_string()),
        notes: vec![],
        cause: None,
    }
}
