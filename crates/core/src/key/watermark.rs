// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::key::serializer::{KeyDeserializer, KeySerializer};
use crate::key::{EncodableKey, EncodedKey, KeyKind, VERSION};

/// Singleton key holding the highest commit sequence the catalog has applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LastAppliedKey {}

impl EncodableKey for LastAppliedKey {
    const KIND: KeyKind = KeyKind::LastApplied;

    fn encode(&self) -> EncodedKey {
        let mut serializer = KeySerializer::with_capacity(2);
        serializer.extend_u8(VERSION).extend_u8(Self::KIND as u8);
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

        Some(Self {})
    }
}
