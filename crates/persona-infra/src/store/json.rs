//! JSON file implementation of [`RegistryStore`].
//!
//! The whole registry lives in `{data_dir}/registry.json`. Saves go through a
//! temp file that is synced and renamed over the original, so a crash leaves
//! either the previous document or the new one.

use tokio::io::AsyncWriteExt;

use std::io;
use std::path::{Path, PathBuf};

use persona_core::repository::registry::RegistryStore;
use persona_types::config::StorageConfig;
use persona_types::error::StoreError;
use persona_types::registry::Registry;

use crate::filesystem::{backups_dir, registry_path, registry_tmp_path};
use crate::store::backup;

pub struct JsonRegistryStore {
    data_dir: PathBuf,
    storage: StorageConfig,
}

impl JsonRegistryStore {
    pub fn new(data_dir: impl Into<PathBuf>, storage: StorageConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            storage,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn registry_path(&self) -> PathBuf {
        registry_path(&self.data_dir)
    }

    /// Backup file names, newest first.
    pub async fn list_backups(&self) -> Result<Vec<String>, StoreError> {
        backup::list_backups(&backups_dir(&self.data_dir))
            .await
            .map_err(|e| StoreError::Unavailable(format!("failed to list backups: {e}")))
    }

    /// Parse and validate one backup. `Ok(None)` when no such backup exists.
    pub async fn read_backup(&self, name: &str) -> Result<Option<Registry>, StoreError> {
        if !backup::is_backup_name(name) {
            return Ok(None);
        }
        let path = backups_dir(&self.data_dir).join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse_registry(&content).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Unavailable(format!(
                "failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    /// Newest backup that parses and validates, if any.
    async fn recover_from_backups(&self) -> Option<(String, Registry)> {
        let names = match self.list_backups().await {
            Ok(names) => names,
            Err(err) => {
                tracing::warn!(error = %err, "cannot list backups for recovery");
                return None;
            }
        };

        for name in names {
            match self.read_backup(&name).await {
                Ok(Some(registry)) => return Some((name, registry)),
                Ok(None) => {}
                Err(err) => tracing::warn!(backup = %name, error = %err, "skipping unusable backup"),
            }
        }
        None
    }

    /// Back up the current file and prune old backups. Failures only warn.
    async fn backup_current(&self) {
        let backups = backups_dir(&self.data_dir);
        if let Err(err) = backup::create_backup(&self.registry_path(), &backups).await {
            tracing::warn!(error = %err, "failed to back up registry before save");
            return;
        }
        if let Err(err) = backup::rotate_backups(&backups, self.storage.max_backups).await {
            tracing::warn!(error = %err, "failed to rotate registry backups");
        }
    }

    async fn write_atomically(&self, content: &str) -> io::Result<()> {
        let tmp_path = registry_tmp_path(&self.data_dir);

        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(err) = tokio::fs::rename(&tmp_path, self.registry_path()).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err);
        }
        Ok(())
    }
}

fn parse_registry(content: &str) -> Result<Registry, StoreError> {
    let registry: Registry =
        serde_json::from_str(content).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    registry.validate().map_err(StoreError::Corrupt)?;
    Ok(registry)
}

impl RegistryStore for JsonRegistryStore {
    async fn load(&self) -> Result<Registry, StoreError> {
        let path = self.registry_path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No registry at {}, starting empty", path.display());
                return Ok(Registry::new());
            }
            Err(err) => {
                return Err(StoreError::Unavailable(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
        };

        let err = match parse_registry(&content) {
            Ok(registry) => return Ok(registry),
            Err(err) => err,
        };
        tracing::warn!(path = %path.display(), error = %err, "registry file is corrupt");

        match self.recover_from_backups().await {
            Some((name, registry)) => {
                tracing::warn!(backup = %name, bots = registry.len(), "recovered registry from backup");
                Ok(registry)
            }
            None => Err(err),
        }
    }

    async fn save(&self, registry: &Registry) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            StoreError::Write(format!(
                "failed to create {}: {e}",
                self.data_dir.display()
            ))
        })?;

        let content = serde_json::to_string_pretty(registry)
            .map_err(|e| StoreError::Write(format!("failed to encode registry: {e}")))?;

        if self.storage.auto_backup {
            self.backup_current().await;
        }

        self.write_atomically(&content).await.map_err(|e| {
            StoreError::Write(format!(
                "failed to write {}: {e}",
                self.registry_path().display()
            ))
        })?;
        tracing::debug!(path = %self.registry_path().display(), bots = registry.len(), "registry written");
        Ok(())
    }
}
