//! Credential persistence.
//!
//! Two slots are kept: a short-lived access credential that behaves like a
//! browser cookie and disappears after a fixed lifetime, and a durable refresh
//! credential that survives restarts. Callers only use `get`/`set`/`delete`.

use crate::config::ClientConfig;
use chrono::{DateTime, Utc};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use stellar_burgers_core::environment::Clock;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Failure to read or write a credential
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Filesystem error
    #[error("Credential storage at {path} failed: {message}")]
    Io {
        /// File that could not be accessed
        path: PathBuf,
        /// Underlying error message
        message: String,
    },
}

impl StorageError {
    fn io(path: &Path, error: &io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

/// A single credential slot
pub trait TokenStorage: Send + Sync {
    /// Read the stored credential, if any
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be read.
    fn get(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored credential
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be written.
    fn set(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the stored credential; removing an empty slot succeeds
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be written.
    fn delete(&self) -> Result<(), StorageError>;
}

struct Entry {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

/// In-memory slot, optionally expiring like a cookie
pub struct MemoryTokenStorage {
    entry: Mutex<Option<Entry>>,
    expiry: Option<(Arc<dyn Clock>, Duration)>,
}

impl MemoryTokenStorage {
    /// A slot whose value never expires
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entry: Mutex::new(None),
            expiry: None,
        }
    }

    /// A slot whose value disappears `ttl` after it was set
    #[must_use]
    pub fn expiring(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entry: Mutex::new(None),
            expiry: Some((clock, ttl)),
        }
    }
}

impl Default for MemoryTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn get(&self) -> Result<Option<String>, StorageError> {
        let mut entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);

        let expired = match (entry.as_ref(), &self.expiry) {
            (Some(Entry { expires_at: Some(at), .. }), Some((clock, _))) => clock.now() >= *at,
            _ => false,
        };
        if expired {
            tracing::debug!("Stored credential expired");
            *entry = None;
        }

        Ok(entry.as_ref().map(|entry| entry.token.clone()))
    }

    fn set(&self, token: &str) -> Result<(), StorageError> {
        // A lifetime too large for chrono is treated as no expiry.
        let expires_at = self.expiry.as_ref().and_then(|(clock, ttl)| {
            chrono::Duration::from_std(*ttl)
                .ok()
                .and_then(|ttl| clock.now().checked_add_signed(ttl))
        });

        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = Some(Entry {
            token: token.to_string(),
            expires_at,
        });
        Ok(())
    }

    fn delete(&self) -> Result<(), StorageError> {
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Slot kept in a file, surviving restarts
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Store the credential at `path`; parent directories are created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the credential file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn get(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StorageError::io(&self.path, &error)),
        }
    }

    /// Writes go through an owner-only temporary file that is renamed over the
    /// credential file, so readers never see a partial token.
    fn set(&self, token: &str) -> Result<(), StorageError> {
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, &e))?;
                parent
            },
            None => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(parent).map_err(|e| StorageError::io(parent, &e))?;
        file.write_all(token.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| StorageError::io(file.path(), &e))?;
        file.persist(&self.path)
            .map_err(|e| StorageError::io(&self.path, &e.error))?;
        Ok(())
    }

    fn delete(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(StorageError::io(&self.path, &error)),
        }
    }
}

/// The access and refresh credential slots of one client
#[derive(Clone)]
pub struct Credentials {
    access: Arc<dyn TokenStorage>,
    refresh: Arc<dyn TokenStorage>,
}

impl Credentials {
    /// Bundle two slots
    #[must_use]
    pub fn new(access: Arc<dyn TokenStorage>, refresh: Arc<dyn TokenStorage>) -> Self {
        Self { access, refresh }
    }

    /// Two non-expiring in-memory slots
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryTokenStorage::new()),
            Arc::new(MemoryTokenStorage::new()),
        )
    }

    /// Cookie-like access slot and file-backed refresh slot, as configured
    #[must_use]
    pub fn from_config(config: &ClientConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(MemoryTokenStorage::expiring(clock, config.access_token_ttl)),
            Arc::new(FileTokenStorage::new(config.refresh_token_path.clone())),
        )
    }

    /// Persist a freshly issued credential pair
    ///
    /// If the refresh slot cannot be written the new access credential is
    /// removed again, so a failed sign-in leaves no half-stored pair.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if either slot cannot be written.
    pub fn store(&self, access_token: &str, refresh_token: &str) -> Result<(), StorageError> {
        self.access.set(access_token)?;
        if let Err(error) = self.refresh.set(refresh_token) {
            if let Err(rollback) = self.access.delete() {
                tracing::warn!(%rollback, "Could not remove access credential");
            }
            return Err(error);
        }
        Ok(())
    }

    /// Remove both credentials if the refresh credential is still `refresh_token`
    ///
    /// Returns `false`, leaving the slots untouched, when a newer pair has been
    /// stored since `refresh_token` was read.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a slot cannot be read or cleared.
    pub fn clear_if_current(&self, refresh_token: &str) -> Result<bool, StorageError> {
        if self.refresh.get()?.as_deref() != Some(refresh_token) {
            return Ok(false);
        }
        self.clear()?;
        Ok(true)
    }

    /// Remove both credentials
    ///
    /// Both slots are cleared even if the first one fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`StorageError`] encountered.
    pub fn clear(&self) -> Result<(), StorageError> {
        let access = self.access.delete();
        let refresh = self.refresh.delete();
        access.and(refresh)
    }

    /// The current access credential
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot cannot be read.
    pub fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.access.get()
    }

    /// The current refresh credential
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the slot cannot be read.
    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.refresh.get()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}
