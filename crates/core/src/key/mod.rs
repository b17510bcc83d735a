// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::ops::Deref;

pub use commit::CommitRecordKey;
pub use generation::TableGenerationKey;
pub use sequence::SystemSequenceKey;
pub use watermark::LastAppliedKey;

mod commit;
mod generation;
mod sequence;
pub mod serializer;
mod watermark;

pub(crate) const VERSION: u8 = 1;

#[derive(Debug, Clone, PartialOrd, Ord, Hash, PartialEq, Eq)]
pub struct EncodedKey(pub Vec<u8>);

impl Deref for EncodedKey {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl EncodedKey {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self(key.into())
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyKind {
    SystemSequence = 0x01,
    TableGeneration = 0x02,
    CommitRecord = 0x03,
    LastApplied = 0x04,
}

impl TryFrom<u8> for KeyKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(KeyKind::SystemSequence),
            0x02 => Ok(KeyKind::TableGeneration),
            0x03 => Ok(KeyKind::CommitRecord),
            0x04 => Ok(KeyKind::LastApplied),
            _ => Err(()),
        }
    }
}

impl KeyKind {
    /// Shared prefix of every encoded key of this kind, for range scans.
    pub fn prefix(&self) -> Vec<u8> {
        vec![VERSION, *self as u8]
    }
}

pub trait EncodableKey: Sized {
    const KIND: KeyKind;

    fn encode(&self) -> EncodedKey;

    fn decode(key: &EncodedKey) -> Option<Self>;
}
