// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::CommitSequence;
use crate::key::serializer::{KeyDeserializer, KeySerializer};
use crate::key::{EncodableKey, EncodedKey, KeyKind, VERSION};

/// Durable commit-record key; big-endian sequence keeps replay order equal
/// to key order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRecordKey {
    pub seq: CommitSequence,
}

impl CommitRecordKey {
    pub fn new(seq: CommitSequence) -> Self {
        Self { seq }
    }
}

impl EncodableKey for CommitRecordKey {
    const KIND: KeyKind = KeyKind::CommitRecord;

    fn encode(&self) -> EncodedKey {
        let mut serializer = KeySerializer::with_capacity(10);
        serializer.extend_u8(VERSION).extend_u8(Self::KIND as u8).extend_u64(self.seq);
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

        let seq = de.read_u64()?;

        Some(Self { seq: CommitSequence(seq) })
    }
}
