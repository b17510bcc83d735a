// Copyright (c) stratadb.com 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::fs;
use std::path::{Path, PathBuf};

use strata_core::GenerationId;
use tracing::debug;

use crate::{Result, StorageError};

const STAGING: &str = "staging";
const TABLES: &str = "tables";

#[derive(Debug, Clone)]
pub struct ArtifactStoreConfig {
    /// Root directory holding `staging/` and `tables/`.
    pub root: PathBuf,
    /// Upper bound on total bytes under the root, `None` for unbounded.
    pub quota_bytes: Option<u64>,
}

impl ArtifactStoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), quota_bytes: None }
    }

    pub fn with_quota_bytes(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }
}

/// Physical home of table generations.
///
/// A generation under construction lives in `staging/gen_<id>` and is
/// invisible to the catalog. Publication is a directory rename into
/// `tables/gen_<id>`; the rename is idempotent so crash-recovery replay can
/// repeat it safely.
pub struct ArtifactStore {
    config: ArtifactStoreConfig,
}

impl ArtifactStore {
    pub fn open(config: ArtifactStoreConfig) -> Result<Self> {
        fs::create_dir_all(config.root.join(STAGING))?;
        fs::create_dir_all(config.root.join(TABLES))?;
        Ok(Self { config })
    }

    pub fn staging_dir(&self, generation: GenerationId) -> PathBuf {
        self.config.root.join(STAGING).join(dir_name(generation))
    }

    pub fn live_dir(&self, generation: GenerationId) -> PathBuf {
        self.config.root.join(TABLES).join(dir_name(generation))
    }

    pub fn is_live(&self, generation: GenerationId) -> bool {
        self.live_dir(generation).is_dir()
    }

    pub fn create_staging(&self, generation: GenerationId) -> Result<PathBuf> {
        let dir = self.staging_dir(generation);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Fails with [`StorageError::QuotaExceeded`] if `additional` bytes would
    /// push the store past its quota.
    pub fn ensure_capacity(&self, additional: u64) -> Result<()> {
        let Some(quota) = self.config.quota_bytes else {
            return Ok(());
        };

        let used = self.used_bytes()?;
        if used.saturating_add(additional) > quota {
            return Err(StorageError::QuotaExceeded(format!(
                "{} bytes used, {} requested, quota is {}",
                used, additional, quota
            )));
        }
        Ok(())
    }

    /// Move a staged generation into the live area. A no-op when the
    /// generation is already live, so replay after a crash is safe.
    pub fn promote(&self, generation: GenerationId) -> Result<()> {
        let live = self.live_dir(generation);
        if live.is_dir() {
            return Ok(());
        }

        let staging = self.staging_dir(generation);
        if !staging.is_dir() {
            return Err(StorageError::Corrupted(format!(
                "generation {} has neither staged nor live artifacts",
                generation
            )));
        }

        fs::rename(&staging, &live)?;
        debug!("promoted generation {} artifacts", generation);
        Ok(())
    }

    pub fn discard_staging(&self, generation: GenerationId) -> Result<()> {
        let dir = self.staging_dir(generation);
        if dir.is_dir() {
            fs::remove_dir_all(&dir)?;
            debug!("discarded staged generation {}", generation);
        }
        Ok(())
    }

    pub fn retire_live(&self, generation: GenerationId) -> Result<()> {
        let dir = self.live_dir(generation);
        if dir.is_dir() {
            fs::remove_dir_all(&dir)?;
            debug!("retired generation {} artifacts", generation);
        }
        Ok(())
    }

    /// Generations currently sitting in the staging area.
    pub fn list_staging(&self) -> Result<Vec<GenerationId>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(self.config.root.join(STAGING))? {
            let entry = entry?;
            if let Some(generation) = parse_dir_name(&entry.file_name().to_string_lossy()) {
                out.push(generation);
            }
        }
        out.sort();
        Ok(out)
    }

    fn used_bytes(&self) -> Result<u64> {
        dir_size(&self.config.root)
    }
}

fn dir_name(generation: GenerationId) -> String {
    format!("gen_{}", generation.0)
}

fn parse_dir_name(name: &str) -> Option<GenerationId> {
    name.strip_prefix("gen_")?.parse::<u64>().ok().map(GenerationId)
}

fn dir_size(path: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_dir() {
            total += dir_size(&entry.path())?;
        } else {
            total += metadata.len();
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use strata_testing::tempdir::temp_dir;

    use super::*;

    #[test]
    fn test_promote_moves_staging_to_live() {
        temp_dir(|path| {
            let store = ArtifactStore::open(ArtifactStoreConfig::new(path)).unwrap();
            let generation = GenerationId(7);

            let staging = store.create_staging(generation).unwrap();
            fs::write(staging.join("data"), b"header").unwrap();

            store.promote(generation).unwrap();

            assert!(store.is_live(generation));
            assert!(!store.staging_dir(generation).exists());
            assert_eq!(fs::read(store.live_dir(generation).join("data")).unwrap(), b"header");
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_promote_is_idempotent() {
        temp_dir(|path| {
            let store = ArtifactStore::open(ArtifactStoreConfig::new(path)).unwrap();
            let generation = GenerationId(7);

            store.create_staging(generation).unwrap();
            store.promote(generation).unwrap();
            store.promote(generation).unwrap();

            assert!(store.is_live(generation));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_promote_without_artifacts_fails() {
        temp_dir(|path| {
            let store = ArtifactStore::open(ArtifactStoreConfig::new(path)).unwrap();
            let err = store.promote(GenerationId(1)).unwrap_err();
            assert!(matches!(err, StorageError::Corrupted(_)));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_quota_enforced() {
        temp_dir(|path| {
            let store =
                ArtifactStore::open(ArtifactStoreConfig::new(path).with_quota_bytes(64)).unwrap();

            let staging = store.create_staging(GenerationId(1)).unwrap();
            fs::write(staging.join("data"), vec![0u8; 48]).unwrap();

            assert!(store.ensure_capacity(8).is_ok());
            let err = store.ensure_capacity(64).unwrap_err();
            assert!(err.is_quota_exceeded());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_staging_after_partial_builds() {
        temp_dir(|path| {
            let store = ArtifactStore::open(ArtifactStoreConfig::new(path)).unwrap();
            store.create_staging(GenerationId(3)).unwrap();
            store.create_staging(GenerationId(1)).unwrap();

            assert_eq!(store.list_staging().unwrap(), vec![GenerationId(1), GenerationId(3)]);

            store.discard_staging(GenerationId(1)).unwrap();
            assert_eq!(store.list_staging().unwrap(), vec![GenerationId(3)]);
            Ok(())
        })
        .unwrap();
    }
}
