// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use strata_core::diagnostic::change::change_in_progress;
use strata_core::return_error;
use tracing::trace;

/// Process-wide set of tables with an in-flight schema change.
///
/// Admission is checked and taken in one step under the lock, so two
/// concurrent changes on the same table cannot both pass. Changes on
/// different tables admit independently.
#[derive(Debug, Default)]
pub struct AdmissionSet {
    tables: Mutex<HashSet<String>>,
}

impl AdmissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically admit a schema change for `table`. The returned guard
    /// releases the marker on drop, including on every rollback path.
    pub fn admit(self: &Arc<Self>, table: &str) -> crate::Result<AdmissionGuard> {
        let mut tables = self.tables.lock();
        if !tables.insert(table.to_string()) {
            return_error!(change_in_progress(table));
        }
        trace!("admitted schema change for table '{}'", table);

        Ok(AdmissionGuard { set: Arc::clone(self), table: table.to_string() })
    }

    pub fn is_admitted(&self, table: &str) -> bool {
        self.tables.lock().contains(table)
    }
}

/// RAII admission marker for one table.
#[derive(Debug)]
pub struct AdmissionGuard {
    set: Arc<AdmissionSet>,
    table: String,
}

impl AdmissionGuard {
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        self.set.tables.lock().remove(&self.table);
        trace!("released schema change admission for table '{}'", self.table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_and_release() {
        let set = Arc::new(AdmissionSet::new());

        let guard = set.admit("orders").unwrap();
        assert!(set.is_admitted("orders"));

        drop(guard);
        assert!(!set.is_admitted("orders"));
    }

    #[test]
    fn test_second_admission_conflicts() {
        let set = Arc::new(AdmissionSet::new());

        let _guard = set.admit("orders").unwrap();
        let err = set.admit("orders").unwrap_err();
        assert_eq!(err.diagnostic().code, "SC_001");
    }

    #[test]
    fn test_release_readmits() {
        let set = Arc::new(AdmissionSet::new());

        drop(set.admit("orders").unwrap());
        assert!(set.admit("orders").is_ok());
    }

    #[test]
    fn test_different_tables_are_independent() {
        let set = Arc::new(AdmissionSet::new());

        let _orders = set.admit("orders").unwrap();
        let _customers = set.admit("customers").unwrap();

        assert!(set.is_admitted("orders"));
        assert!(set.is_admitted("customers"));
    }
}
