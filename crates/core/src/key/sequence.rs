// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::SystemSequenceId;
use crate::key::serializer::{KeyDeserializer, KeySerializer};
use crate::key::{EncodableKey, EncodedKey, KeyKind, VERSION};

#[derive(Debug, Clone, PartialEq)]
pub struct SystemSequenceKey {
    pub sequence: SystemSequenceId,
}

impl SystemSequenceKey {
    pub fn new(sequence: SystemSequenceId) -> Self {
        Self { sequence }
    }
}

impl EncodableKey for SystemSequenceKey {
    const KIND: KeyKind = KeyKind::SystemSequence;

    fn encode(&self) -> EncodedKey {
        let mut serializer = KeySerializer::with_capacity(10);
        serializer.extend_u8(VERSION).extend_u8(Self::KIND as u8).extend_u64(self.sequence);
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

        let sequence = de.read_u64()?;

        Some(Self { sequence: SystemSequenceId(sequence) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let key = SystemSequenceKey::new(SystemSequenceId(2));
        let encoded = key.encode();
        assert_eq!(SystemSequenceKey::decode(&encoded), Some(key));
    }

    #[test]
    fn test_decode_wrong_kind() {
        let encoded = EncodedKey::new(vec![VERSION, KeyKind::CommitRecord as u8, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(SystemSequenceKey::decode(&encoded), None);
    }
}
