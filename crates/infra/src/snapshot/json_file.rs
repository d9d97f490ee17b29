//! JSON file snapshot store.
//!
//! The file holds a single JSON object mapping guild id to credential
//! record. Saves write a sibling `.tmp` file, fsync it and rename it over
//! the snapshot, so readers only ever see a complete file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use guildlink_core::{LinkedMap, SnapshotStore};
use guildlink_domain::{GuildLinkError, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use crate::errors::InfraError;

/// Linked-credential snapshot stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    /// Snapshot stored at `path`; the file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Check that saves can succeed: the parent directory exists (or can be
    /// created) and a file can be written next to the snapshot.
    ///
    /// # Errors
    /// `Persistence` when the location is not writable.
    pub async fn ensure_writable(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(persistence_error)?;
        }

        let probe = self.temp_path();
        fs::write(&probe, b"{}").await.map_err(persistence_error)?;
        fs::remove_file(&probe).await.map_err(persistence_error)?;
        Ok(())
    }
}

fn persistence_error(err: std::io::Error) -> GuildLinkError {
    match GuildLinkError::from(InfraError::from(err)) {
        GuildLinkError::NotFound(msg) => GuildLinkError::Persistence(msg),
        other => other,
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotFile {
    /// Missing files and malformed content load as an empty mapping.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<LinkedMap> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("snapshot.load.missing");
                return Ok(LinkedMap::new());
            }
            Err(err) => return Err(persistence_error(err)),
        };

        match serde_json::from_slice::<LinkedMap>(&bytes) {
            Ok(links) => Ok(links),
            Err(err) => {
                warn!(error = %err, "snapshot.load.malformed");
                Ok(LinkedMap::new())
            }
        }
    }

    #[instrument(skip(self, links), fields(path = %self.path.display(), linked = links.len()))]
    async fn save(&self, links: &LinkedMap) -> Result<()> {
        let data = serde_json::to_vec_pretty(links)
            .map_err(|e| GuildLinkError::Persistence(format!("failed to encode snapshot: {e}")))?;

        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(persistence_error)?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(persistence_error)?;
        file.write_all(&data).await.map_err(persistence_error)?;
        file.sync_all().await.map_err(persistence_error)?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(persistence_error)?;
        debug!(bytes = data.len(), "snapshot.saved");
        Ok(())
    }
}
