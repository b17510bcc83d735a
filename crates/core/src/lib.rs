// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub use error::Error;
pub use id::{CommitSequence, GenerationId, NodeId, SchemaVersion, SystemSequenceId};
pub use identity::{FixedNodeIdentity, NodeIdentity};
pub use key::{
    CommitRecordKey, EncodableKey, EncodedKey, KeyKind, LastAppliedKey, SystemSequenceKey,
    TableGenerationKey,
};
pub use value::Type;

pub mod diagnostic;
mod error;
mod id;
mod identity;
pub mod key;
mod value;

pub type Result<T> = std::result::Result<T, Error>;
