//! Named cursors: a path and a position within it, e.g. a place in a playlist.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::path::Path;
use crate::persist::{JsonFilePersist, Persist, PersistedState};

/// A position inside the group or playlist at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    path: Path,
    index: usize,
}

impl Cursor {
    /// Cursor at `index` within `path`.
    #[must_use]
    pub const fn new(path: Path, index: usize) -> Self {
        Self { path, index }
    }

    /// The path the cursor moves within.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Current position.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Cursors keyed by name.
#[derive(Debug)]
pub struct CursorStore {
    state: PersistedState<BTreeMap<String, Cursor>>,
}

impl CursorStore {
    /// Create a store over existing cursors.
    pub fn new(cursors: BTreeMap<String, Cursor>, persist: Box<dyn Persist>) -> Self {
        Self {
            state: PersistedState::new("cursors", cursors, persist),
        }
    }

    /// Open the store backed by a JSON file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let persist = JsonFilePersist::new(path);
        let cursors: BTreeMap<String, Cursor> = persist.load_or_default()?;
        info!("Opened cursor store ({} cursors)", cursors.len());
        Ok(Self::new(cursors, Box::new(persist)))
    }

    /// Cursor called `name`, if any.
    pub fn get(&self, name: &str) -> Result<Option<Cursor>> {
        self.state.read(|cursors| cursors.get(name).cloned())
    }

    /// Create or replace the cursor called `name`.
    pub fn set(&self, name: &str, cursor: Cursor) -> Result<()> {
        self.state.update(|cursors| {
            debug!("Cursor '{}' -> {}@{}", name, cursor.path, cursor.index);
            cursors.insert(name.to_string(), cursor);
            Ok(())
        })
    }

    /// Remove the cursor called `name`. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        self.state.update(|cursors| Ok(cursors.remove(name).is_some()))
    }

    /// Cursor names in order.
    pub fn names(&self) -> Result<Vec<String>> {
        self.state.read(|cursors| cursors.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::persist::{MockPersist, NoopPersist};
    use tempfile::TempDir;

    fn path(s: &str) -> Path {
        Path::decode(s).expect("valid path")
    }

    #[test]
    fn test_set_get_replace() {
        let store = CursorStore::new(BTreeMap::new(), Box::new(NoopPersist));
        assert!(store.get("evening").expect("get").is_none());

        store.set("evening", Cursor::new(path("Root:abc123"), 2)).expect("set");
        store.set("evening", Cursor::new(path("Root:abc123"), 3)).expect("replace");

        let cursor = store.get("evening").expect("get").expect("exists");
        assert_eq!(cursor.path(), &path("Root:abc123"));
        assert_eq!(cursor.index(), 3);
        assert_eq!(store.names().expect("names"), ["evening"]);
    }

    #[test]
    fn test_delete() {
        let store = CursorStore::new(BTreeMap::new(), Box::new(NoopPersist));
        store.set("a", Cursor::new(path("Root:a"), 0)).expect("set");
        assert!(store.delete("a").expect("delete"));
        assert!(!store.delete("a").expect("delete again"));
        assert!(store.names().expect("names").is_empty());
    }

    #[test]
    fn test_persist_failure_keeps_cursor() {
        let mut mock = MockPersist::new();
        mock.expect_persist()
            .times(1)
            .returning(|_| Err(Error::persistence("cursors.json", "denied")));

        let store = CursorStore::new(BTreeMap::new(), Box::new(mock));
        let result = store.set("a", Cursor::new(path("Root:a"), 1));
        assert!(matches!(result, Err(Error::Persistence { .. })));
        assert!(store.get("a").expect("get").is_some());
    }

    #[test]
    fn test_reopen_from_file() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let file = temp_dir.path().join("cursors.json");

        let store = CursorStore::open(&file).expect("open");
        store.set("mix", Cursor::new(path("Root:a:1"), 4)).expect("set");

        let reopened = CursorStore::open(&file).expect("reopen");
        assert_eq!(
            reopened.get("mix").expect("get"),
            Some(Cursor::new(path("Root:a:1"), 4))
        );
    }
}
