//! Locally stored session token.

use std::path::{Path, PathBuf};

use vitegourmand_core::session::SessionProvider;

use crate::pending_store::StoreError;

/// Session token kept in a file, optionally overridden by a token taken from
/// the environment.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    override_token: Option<String>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            override_token: None,
        }
    }

    /// Use `token` instead of the file contents when it is set.
    pub fn with_override(mut self, token: Option<String>) -> Self {
        self.override_token = token;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a token obtained from the login page.
    pub fn save(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token.trim())?;
        tracing::info!(path = %self.path.display(), "Session token saved");
        Ok(())
    }

    /// Forget the stored token. Missing files are fine.
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionProvider for FileSessionStore {
    fn token(&self) -> Option<String> {
        if let Some(token) = &self.override_token {
            return Some(token.clone());
        }
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cannot read session file");
                None
            }
        }
    }
}
