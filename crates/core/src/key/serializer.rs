// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::key::EncodedKey;

/// Big-endian key writer; keys of the same kind sort in field order.
pub struct KeySerializer {
    buffer: Vec<u8>,
}

impl KeySerializer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buffer: Vec::with_capacity(capacity) }
    }

    pub fn extend_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn extend_u32(&mut self, value: u32) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn extend_u64(&mut self, value: impl Into<u64>) -> &mut Self {
        self.buffer.extend_from_slice(&value.into().to_be_bytes());
        self
    }

    /// Length-prefixed (u16) UTF-8 bytes. Names longer than `u16::MAX` are
    /// rejected at request validation, long before a key is built.
    pub fn extend_str(&mut self, value: &str) -> &mut Self {
        self.buffer.extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.buffer.extend_from_slice(value.as_bytes());
        self
    }

    pub fn to_encoded_key(&self) -> EncodedKey {
        EncodedKey::new(self.buffer.clone())
    }
}

pub struct KeyDeserializer<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> KeyDeserializer<'a> {
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.position.checked_add(len)?;
        if end > self.bytes.len() {
            return None;
        }
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Some(slice)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        self.take(4).map(|b| u32::from_be_bytes(b.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Option<u64> {
        self.take(8).map(|b| u64::from_be_bytes(b.try_into().unwrap()))
    }

    pub fn read_str(&mut self) -> Option<String> {
        let len = self.take(2).map(|b| u16::from_be_bytes(b.try_into().unwrap()))?;
        let bytes = self.take(len as usize)?;
        String::from_utf8(bytes.to_vec()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut serializer = KeySerializer::with_capacity(32);
        serializer.extend_u8(7).extend_u64(42u64).extend_str("orders").extend_u32(3);
        let key = serializer.to_encoded_key();

        let mut de = KeyDeserializer::from_bytes(key.as_slice());
        assert_eq!(de.read_u8(), Some(7));
        assert_eq!(de.read_u64(), Some(42));
        assert_eq!(de.read_str(), Some("orders".to_string()));
        assert_eq!(de.read_u32(), Some(3));
        assert_eq!(de.read_u8(), None);
    }

    #[test]
    fn test_u64_keys_sort_big_endian() {
        let mut low = KeySerializer::with_capacity(8);
        low.extend_u64(1u64);
        let mut high = KeySerializer::with_capacity(8);
        high.extend_u64(256u64);

        assert!(low.to_encoded_key() < high.to_encoded_key());
    }

    #[test]
    fn test_truncated_read_is_none() {
        let mut de = KeyDeserializer::from_bytes(&[0x01, 0x02]);
        assert_eq!(de.read_u64(), None);
    }
}
