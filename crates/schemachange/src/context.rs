// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use strata_storage::DurabilityMode;

/// Opaque handle to the transaction a DDL statement runs in. Owned by the
/// transaction layer; the schema engine only carries it through for logging
/// and never commits or aborts it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransactionHandle(pub u64);

/// Cooperative cancellation for an in-flight schema change. Honored at every
/// state boundary before COMMITTING; once the commit step has begun the
/// change runs to completion regardless.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Borrowed per-request collaborator: the active transaction, the caller's
/// session identity and the requested durability.
pub struct RequestContext<'a> {
    pub txn: &'a TransactionHandle,
    pub session: &'a str,
    pub durability: DurabilityMode,
    pub cancellation: CancellationToken,
}

impl<'a> RequestContext<'a> {
    pub fn new(txn: &'a TransactionHandle, session: &'a str) -> Self {
        Self {
            txn,
            session,
            durability: DurabilityMode::default(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_durability(mut self, durability: DurabilityMode) -> Self {
        self.durability = durability;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_token() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());

        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
    }
}
