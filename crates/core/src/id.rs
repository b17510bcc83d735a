// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fmt::{Display, Formatter};
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Identifies one immutable, fully-built version of a table's physical
/// layout and schema. Allocated from a durable monotonic sequence so it can
/// never collide across process restarts; followers adopt the leader's id.
#[repr(transparent)]
#[derive(
    Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize,
)]
pub struct GenerationId(pub u64);

/// Total order over durable commit records, used for replay during recovery.
#[repr(transparent)]
#[derive(
    Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize,
)]
pub struct CommitSequence(pub u64);

/// Logical schema version carried inside a generation descriptor.
#[repr(transparent)]
#[derive(
    Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize,
)]
pub struct SchemaVersion(pub u32);

/// Cluster-local node identifier stamped on commit records.
#[repr(transparent)]
#[derive(
    Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash)]
pub struct SystemSequenceId(pub u64);

macro_rules! impl_u64_id {
    ($name:ident) => {
        impl Deref for $name {
            type Target = u64;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl PartialEq<u64> for $name {
            fn eq(&self, other: &u64) -> bool {
                self.0.eq(other)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                $name(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                Display::fmt(&self.0, f)
            }
        }
    };
}

impl_u64_id!(GenerationId);
impl_u64_id!(CommitSequence);
impl_u64_id!(SystemSequenceId);

impl CommitSequence {
    /// Watermark meaning "nothing applied yet".
    pub const ZERO: CommitSequence = CommitSequence(0);

    pub fn next(&self) -> CommitSequence {
        CommitSequence(self.0 + 1)
    }
}

impl Deref for SchemaVersion {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Deref for NodeId {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}
