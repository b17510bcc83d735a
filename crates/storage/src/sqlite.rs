// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use strata_core::EncodedKey;
use tracing::debug;

use crate::meta::{Batch, BatchOp, DurabilityMode, MetaStore};
use crate::Result;

/// Durable [`MetaStore`] over a single-table sqlite database.
///
/// WAL mode keeps readers off the writer's lock; `synchronous` follows the
/// configured durability mode. Batches map to sqlite transactions, which is
/// where the commit protocol gets its atomicity across keys.
pub struct SqliteMetaStore {
    conn: Mutex<Connection>,
}

impl SqliteMetaStore {
    pub fn open(path: impl AsRef<Path>, durability: DurabilityMode) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        match durability {
            DurabilityMode::Full => conn.pragma_update(None, "synchronous", "FULL")?,
            DurabilityMode::Relaxed => conn.pragma_update(None, "synchronous", "NORMAL")?,
        }

        conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (key BLOB PRIMARY KEY, value BLOB NOT NULL)",
            [],
        )?;

        debug!("opened metadata store at {:?}", path.as_ref());

        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl MetaStore for SqliteMetaStore {
    fn get(&self, key: &EncodedKey) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                params![key.as_slice()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &EncodedKey, value: Vec<u8>) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key.as_slice(), value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &EncodedKey) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM meta WHERE key = ?1", params![key.as_slice()])?;
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<(EncodedKey, Vec<u8>)>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT key, value FROM meta WHERE key >= ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![prefix], |row| {
            Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (key, value) = row?;
            if !key.starts_with(prefix) {
                break;
            }
            out.push((EncodedKey::new(key), value));
        }
        Ok(out)
    }

    fn apply(&self, batch: Batch) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        for op in batch.ops() {
            match op {
                BatchOp::Set { key, value } => {
                    tx.execute(
                        "INSERT INTO meta (key, value) VALUES (?1, ?2) \
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                        params![key.as_slice(), value],
                    )?;
                }
                BatchOp::Remove { key } => {
                    tx.execute("DELETE FROM meta WHERE key = ?1", params![key.as_slice()])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use strata_testing::tempdir::temp_dir;

    use super::*;

    #[test]
    fn test_reopen_preserves_entries() {
        temp_dir(|path| {
            let db = path.join("meta.db");
            let key = EncodedKey::new(vec![1, 2]);

            {
                let store = SqliteMetaStore::open(&db, DurabilityMode::Full).unwrap();
                store.set(&key, vec![42]).unwrap();
            }

            let store = SqliteMetaStore::open(&db, DurabilityMode::Full).unwrap();
            assert_eq!(store.get(&key).unwrap(), Some(vec![42]));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_batch_is_atomic_across_keys() {
        temp_dir(|path| {
            let store =
                SqliteMetaStore::open(path.join("meta.db"), DurabilityMode::Relaxed).unwrap();

            let a = EncodedKey::new(vec![1]);
            let b = EncodedKey::new(vec![2]);
            store
                .apply(Batch::new().set(a.clone(), vec![1]).set(b.clone(), vec![2]))
                .unwrap();

            assert_eq!(store.get(&a).unwrap(), Some(vec![1]));
            assert_eq!(store.get(&b).unwrap(), Some(vec![2]));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_scan_prefix_ordered() {
        temp_dir(|path| {
            let store =
                SqliteMetaStore::open(path.join("meta.db"), DurabilityMode::Relaxed).unwrap();

            store.set(&EncodedKey::new(vec![5, 1]), vec![1]).unwrap();
            store.set(&EncodedKey::new(vec![5, 0]), vec![0]).unwrap();
            store.set(&EncodedKey::new(vec![6, 0]), vec![9]).unwrap();

            let entries = store.scan_prefix(&[5]).unwrap();
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].1, vec![0]);
            assert_eq!(entries[1].1, vec![1]);
            Ok(())
        })
        .unwrap();
    }
}
