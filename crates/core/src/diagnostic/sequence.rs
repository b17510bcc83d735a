// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::diagnostic::Diagnostic;

/// Durable monotonic counter ran out of values
pub fn sequence_exhausted(name: &str) -> Diagnostic {
    Diagnostic {
        code: "SEQ_001".to_string(),
        message: format!("system sequence '{}' is exhausted", name),
        label: None,
        help: None,
        notes: vec![],
        cause: None,
    }
}
