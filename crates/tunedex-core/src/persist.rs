//! Persistence hook for the path-keyed stores.
//!
//! Stores keep their state in memory behind an `RwLock` and hand a JSON
//! snapshot to a [`Persist`] implementation after every committed mutation.
//! A failed write is reported to the caller, but the in-memory change is kept.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Sink for store snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait Persist: Send + Sync {
    /// Write a full snapshot of the store.
    fn persist(&self, snapshot: &serde_json::Value) -> Result<()>;
}

/// Persistence that discards snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersist;

impl Persist for NoopPersist {
    fn persist(&self, _snapshot: &serde_json::Value) -> Result<()> {
        Ok(())
    }
}

/// Persistence to a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFilePersist {
    path: PathBuf,
}

impl JsonFilePersist {
    /// Persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the last snapshot, or the default value if none was written yet.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self) -> Result<T> {
        if !self.path.exists() {
            debug!("No snapshot at {}, starting empty", self.path.display());
            return Ok(T::default());
        }
        let content = fs::read_to_string(&self.path)?;
        let value = serde_json::from_str(&content)?;
        info!("Loaded snapshot from {}", self.path.display());
        Ok(value)
    }
}

impl Persist for JsonFilePersist {
    fn persist(&self, snapshot: &serde_json::Value) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| Error::persistence(parent, e))?;
        }

        let content = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| Error::persistence(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::persistence(&self.path, e))?;

        debug!("Persisted snapshot to {}", self.path.display());
        Ok(())
    }
}

/// In-memory state guarded by a lock and persisted after each mutation.
pub struct PersistedState<T> {
    name: &'static str,
    state: RwLock<T>,
    persist: Box<dyn Persist>,
}

impl<T: Serialize> PersistedState<T> {
    /// Wrap `state`, persisting through `persist`. `name` labels log lines and errors.
    pub fn new(name: &'static str, state: T, persist: Box<dyn Persist>) -> Self {
        Self {
            name,
            state: RwLock::new(state),
            persist,
        }
    }

    /// Run `f` with shared access to the state.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        let state = self.state.read().map_err(|_| Error::poisoned(self.name))?;
        Ok(f(&state))
    }

    /// Run `f` with exclusive access, then persist the new state.
    ///
    /// When `f` fails nothing is persisted. When persisting fails the error
    /// is returned and the mutation made by `f` stays in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        let mut state = self.state.write().map_err(|_| Error::poisoned(self.name))?;
        let out = f(&mut state)?;

        let snapshot = serde_json::to_value(&*state)?;
        if let Err(e) = self.persist.persist(&snapshot) {
            warn!("{}: failed to persist snapshot: {}", self.name, e);
            return Err(e);
        }
        Ok(out)
    }
}

impl<T> std::fmt::Debug for PersistedState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedState")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
