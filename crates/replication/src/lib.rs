// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub use record::{RecordOrigin, SchemaChangeRecord};
pub use sink::{Ack, MemorySink, ReplicationError, ReplicationSink};
pub use worker::{ReplicationWorker, ReplicationWorkerConfig};

mod record;
mod sink;
mod worker;
