// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Column value types supported by the schema engine.
///
/// The storage engine below the catalog owns the physical encoding; the
/// schema engine only needs a closed set of declarable types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Decimal,
    Utf8,
    Blob,
}

impl Type {
    /// Fixed on-disk width in bytes, `None` for variable-width types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Type::Bool => Some(1),
            Type::Int2 => Some(2),
            Type::Int4 => Some(4),
            Type::Int8 => Some(8),
            Type::Float4 => Some(4),
            Type::Float8 => Some(8),
            Type::Decimal => None,
            Type::Utf8 => None,
            Type::Blob => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Type::Bool => "BOOL",
            Type::Int2 => "INT2",
            Type::Int4 => "INT4",
            Type::Int8 => "INT8",
            Type::Float4 => "FLOAT4",
            Type::Float8 => "FLOAT8",
            Type::Decimal => "DECIMAL",
            Type::Utf8 => "UTF8",
            Type::Blob => "BLOB",
        };
        f.write_str(name)
    }
}
