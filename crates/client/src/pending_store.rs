//! File-backed storage for an order parked until the customer logs in.

use std::path::{Path, PathBuf};

use vitegourmand_core::error::CoreError;
use vitegourmand_core::submission::{PendingDraftStore, PendingOrder};

/// Errors from the local file stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed stored data: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

/// Parks a single [`PendingOrder`] as a JSON file.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the parked order without removing it.
    pub fn peek(&self) -> Result<Option<PendingOrder>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn write(&self, pending: &PendingOrder) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(pending)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PendingDraftStore for FileDraftStore {
    fn save(&self, pending: &PendingOrder) -> Result<(), CoreError> {
        self.write(pending)?;
        tracing::debug!(path = %self.path.display(), "Pending order saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<PendingOrder>, CoreError> {
        match self.peek() {
            Ok(pending) => Ok(pending),
            Err(StoreError::Json(e)) => {
                // A corrupt file would otherwise block every future resume.
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable pending order");
                self.remove()?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn discard(&self) -> Result<(), CoreError> {
        self.remove()?;
        Ok(())
    }
}
