// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub use builder::EnvironmentBuilder;
pub use context::{CancellationToken, RequestContext, TransactionHandle};
pub use coordinator::{ChangeState, SchemaChangeCoordinator};
pub use error::SchemaChangeError;
pub use finalizer::Finalizer;
pub use recover::ReconcileReport;
pub use request::{
    ColumnToCreate, IndexToCreate, LayoutStrategy, RequestOrigin, SchemaChangeRequest,
};
pub use staged::StagedBuild;

mod builder;
mod context;
mod coordinator;
mod error;
mod finalizer;
mod format;
mod recover;
mod request;
mod staged;
