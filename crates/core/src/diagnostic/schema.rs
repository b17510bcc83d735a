// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::diagnostic::Diagnostic;

/// Table name is empty or not representable
pub fn invalid_table_name(table: &str) -> Diagnostic {
    Diagnostic {
        code: "SC_101".to_string(),
        message: format!("invalid table name '{}'", table),
        label: None,
        help: Some("table names must be non-empty and at most 64 bytes".to_string()),
        notes: vec![],
        cause: None,
    }
}

/// Requested schema has no columns
pub fn empty_schema(table: &str) -> Diagnostic {
    Diagnostic {
        code: "SC_102".to_string(),
        message: format!("schema for table '{}' declares no columns", table),
        label: None,
        help: Some("declare at least one column".to_string()),
        notes: vec![],
        cause: None,
    }
}

/// Same column name declared twice
pub fn duplicate_column(table: &str, column: &str) -> Diagnostic {
    Diagnostic {
        code: "SC_103".to_string(),
        message: format!("duplicate column '{}' in table '{}'", column, table),
        label: None,
        help: None,
        notes: vec![],
        cause: None,
    }
}

/// Index references a column the schema does not declare
pub fn index_unknown_column(table: &str, index: &str, column: &str) -> Diagnostic {
    Diagnostic {
        code: "SC_104".to_string(),
        message: format!(
            "index '{}' on table '{}' references unknown column '{}'",
            index, table, column
        ),
        label: None,
        help: None,
        notes: vec![],
        cause: None,
    }
}

/// Same index name declared twice
pub fn duplicate_index(table: &str, index: &str) -> Diagnostic {
    Diagnostic {
        code: "SC_105".to_string(),
        message: format!("duplicate index '{}' in table '{}'", index, table),
        label: None,
        help: None,
        notes: vec![],
        cause: None,
    }
}
