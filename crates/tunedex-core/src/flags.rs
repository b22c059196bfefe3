//! Path flag sets, used for favourites and the checklist.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::Result;
use crate::path::Path;
use crate::persist::{JsonFilePersist, Persist, PersistedState};

/// A set of flagged paths, kept in the order they were flagged.
#[derive(Debug)]
pub struct FlagStore {
    state: PersistedState<Vec<Path>>,
}

impl FlagStore {
    /// Create a store over already flagged paths. `name` labels logs and errors.
    pub fn new(name: &'static str, flagged: Vec<Path>, persist: Box<dyn Persist>) -> Self {
        Self {
            state: PersistedState::new(name, flagged, persist),
        }
    }

    /// Open the store backed by a JSON file.
    pub fn open(name: &'static str, path: impl Into<PathBuf>) -> Result<Self> {
        let persist = JsonFilePersist::new(path);
        let flagged: Vec<Path> = persist.load_or_default()?;
        info!("Opened {} ({} paths)", name, flagged.len());
        Ok(Self::new(name, flagged, Box::new(persist)))
    }

    /// Whether `path` is flagged.
    pub fn get(&self, path: &Path) -> Result<bool> {
        self.state.read(|flagged| flagged.contains(path))
    }

    /// Flag or unflag `path`. Returns whether the set changed.
    ///
    /// Unchanged sets are still persisted, keeping the snapshot current.
    pub fn set(&self, path: &Path, on: bool) -> Result<bool> {
        self.state.update(|flagged| {
            let position = flagged.iter().position(|p| p == path);
            let changed = match (position, on) {
                (None, true) => {
                    flagged.push(path.clone());
                    true
                }
                (Some(i), false) => {
                    flagged.remove(i);
                    true
                }
                _ => false,
            };
            debug!("Flag {} = {} (changed: {})", path, on, changed);
            Ok(changed)
        })
    }

    /// Flagged paths in the order they were flagged.
    pub fn list(&self) -> Result<Vec<Path>> {
        self.state.read(Clone::clone)
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
    fn test_set_and_list_in_insertion_order() {
        let store = FlagStore::new("favourites", Vec::new(), Box::new(NoopPersist));
        assert!(store.set(&path("Root:b"), true).expect("set"));
        assert!(store.set(&path("Root:a"), true).expect("set"));
        assert!(!store.set(&path("Root:b"), true).expect("set twice"));

        assert_eq!(store.list().expect("list"), [path("Root:b"), path("Root:a")]);
        assert!(store.get(&path("Root:a")).expect("get"));
        assert!(!store.get(&path("Root:c")).expect("get"));
    }

    #[test]
    fn test_unset() {
        let store = FlagStore::new("checklist", vec![path("Root:a")], Box::new(NoopPersist));
        assert!(store.set(&path("Root:a"), false).expect("unset"));
        assert!(!store.set(&path("Root:a"), false).expect("unset again"));
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn test_persist_failure_reported() {
        let mut mock = MockPersist::new();
        mock.expect_persist()
            .returning(|_| Err(Error::persistence("favourites.json", "denied")));

        let store = FlagStore::new("favourites", Vec::new(), Box::new(mock));
        let result = store.set(&path("Root:a"), true);
        assert!(matches!(result, Err(Error::Persistence { .. })));
        assert!(store.get(&path("Root:a")).expect("get"));
    }

    #[test]
    fn test_reopen_from_file() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let file = temp_dir.path().join("favourites.json");

        let store = FlagStore::open("favourites", &file).expect("open");
        store.set(&path("Root:a:1"), true).expect("set");

        let reopened = FlagStore::open("favourites", &file).expect("reopen");
        assert_eq!(reopened.list().expect("list"), [path("Root:a:1")]);
    }
}
