// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use strata_core::diagnostic::sequence::sequence_exhausted;
use strata_core::{EncodedKey, return_error};
use strata_storage::MetaStore;

pub(crate) struct GeneratorU64 {}

impl GeneratorU64 {
    /// Allocate the next value of the counter stored under `key`.
    pub(crate) fn next(
        store: &dyn MetaStore,
        key: &EncodedKey,
        name: &str,
    ) -> crate::Result<u64> {
        match store.get(key)? {
            Some(bytes) => {
                let value = decode(&bytes, name)?;
                let next_value = value.saturating_add(1);

                if value == next_value {
                    return_error!(sequence_exhausted(name));
                }

                store.set(key, next_value.to_be_bytes().to_vec())?;
                Ok(value)
            }
            None => {
                store.set(key, 2u64.to_be_bytes().to_vec())?;
                Ok(1)
            }
        }
    }

    /// Ensure the counter will never hand out a value at or below `seen`.
    pub(crate) fn observe(
        store: &dyn MetaStore,
        key: &EncodedKey,
        seen: u64,
    ) -> crate::Result<()> {
        let current = match store.get(key)? {
            Some(bytes) => decode(&bytes, "observed")?,
            None => 1,
        };

        let floor = seen.saturating_add(1);
        if floor > current {
            store.set(key, floor.to_be_bytes().to_vec())?;
        }
        Ok(())
    }
}

fn decode(bytes: &[u8], name: &str) -> crate::Result<u64> {
    let array: [u8; 8] = bytes.try_into().map_err(|_| {
        strata_core::Error(strata_core::diagnostic::storage::codec_error(format!(
            "sequence '{}' holds {} bytes, expected 8",
            name,
            bytes.len()
        )))
    })?;
    Ok(u64::from_be_bytes(array))
}
