//! JSON-file backed donation store
//!
//! Keeps a [`MemoryStore`] as the working set and mirrors it to one JSON
//! document after every mutation. Writers are serialized, and each write goes
//! to a sibling temp file that is renamed over the target, so a crash leaves
//! either the old or the new snapshot on disk.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use ttc_core::{Donation, DonationId, StatusUpdate};

use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryStore;
use crate::store::DonationStore;

/// Current on-disk layout version
pub const FILE_FORMAT_VERSION: u32 = 1;

/// On-disk document
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    donations: Vec<Donation>,
}

/// Memory store mirrored to a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    ///
    /// A missing file is treated as an empty store; it is created on the
    /// first mutation.
    ///
    /// # Errors
    /// - `StoreError::Io` if the file exists but cannot be read
    /// - `StoreError::Serialization` if its contents are not a valid snapshot
    /// - `StoreError::Config` if the snapshot was written by a newer version
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
                if snapshot.version > FILE_FORMAT_VERSION {
                    return Err(StoreError::Config(format!(
                        "{} uses format version {} (supported: {})",
                        path.display(),
                        snapshot.version,
                        FILE_FORMAT_VERSION
                    )));
                }
                snapshot.donations
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::io_error(&path, e)),
        };

        tracing::info!("Loaded {} donations from {}", records.len(), path.display());

        Ok(Self {
            path,
            memory: MemoryStore::from_records(records),
            write_lock: Mutex::new(()),
        })
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> StoreResult<()> {
        let snapshot = Snapshot {
            version: FILE_FORMAT_VERSION,
            donations: self.memory.snapshot(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io_error(parent, e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io_error(&self.path, e))?;

        tracing::debug!(
            "Wrote {} donations to {}",
            snapshot.donations.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl DonationStore for JsonFileStore {
    async fn create(&self, donation: Donation) -> StoreResult<DonationId> {
        let _guard = self.write_lock.lock().await;
        let id = self.memory.insert(donation)?;
        if let Err(e) = self.persist().await {
            tracing::error!("Failed to persist donation {}: {}", id, e);
            self.memory.remove(&id);
            return Err(e);
        }
        Ok(id)
    }

    async fn update_status(&self, id: &DonationId, update: StatusUpdate) -> StoreResult<Donation> {
        let _guard = self.write_lock.lock().await;
        let (previous, updated) = self.memory.apply(id, &update)?;
        if let Err(e) = self.persist().await {
            tracing::error!("Failed to persist status of {}: {}", id, e);
            self.memory.restore(previous);
            return Err(e);
        }
        Ok(updated)
    }

    async fn get(&self, id: &DonationId) -> StoreResult<Option<Donation>> {
        self.memory.get(id).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Vec<Donation>> {
        self.memory.find_by_email(email).await
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<Donation>> {
        self.memory.list_recent(limit).await
    }

    fn backend(&self) -> &'static str {
        "json-file"
    }
}
