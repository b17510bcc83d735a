// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::GenerationId;
use crate::key::serializer::{KeyDeserializer, KeySerializer};
use crate::key::{EncodableKey, EncodedKey, KeyKind, VERSION};

/// Durable catalog-metadata record key, one per table generation.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGenerationKey {
    pub table: String,
    pub generation: GenerationId,
}

impl TableGenerationKey {
    pub fn new(table: impl Into<String>, generation: GenerationId) -> Self {
        Self { table: table.into(), generation }
    }

    /// Prefix shared by every generation record of one table.
    pub fn table_prefix(table: &str) -> Vec<u8> {
        let mut serializer = KeySerializer::with_capacity(4 + table.len());
        serializer.extend_u8(VERSION).extend_u8(Self::KIND as u8).extend_str(table);
        serializer.to_encoded_key().0
    }
}

impl EncodableKey for TableGenerationKey {
    const KIND: KeyKind = KeyKind::TableGeneration;

    fn encode(&self) -> EncodedKey {
        let mut serializer = KeySerializer::with_capacity(12 + self.table.len());
        serializer
            .extend_u8(VERSION)
            .extend_u8(Self::KIND as u8)
            .extend_str(&self.table)
            .extend_u64(self.generation);
        serializer.to_encoded_key()
    }

    fn decode(key: &EncodedKey) -> Option<Self> {
        let mut de = KeyDeserializer::from_bytes(key.as_slice());

        let version = de.read_u8()?;
        if version != VERSION {
            return None;
        }

        let kind: KeyKind = de.read_u8()?.try_into().ok()?;
        if kind != Self::KIND {
            return None;
        }

        let table = de.read_str()?;
        let generation = de.read_u64()?;

        Some(Self { table, generation: GenerationId(generation) })
    }
}
