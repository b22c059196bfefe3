//! Playlists: ordered lists of index paths.
//!
//! An item is the path of any node in the index (a whole album, a disc, a
//! single track). Items are addressed by position; removal checks that the
//! caller still refers to the same item, so a stale view cannot delete the
//! wrong entry after another client changed the list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::path::Path;
use crate::persist::{JsonFilePersist, Persist, PersistedState};

/// An ordered list of paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    items: Vec<Path>,
}

impl Playlist {
    /// Create an empty playlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in order.
    #[must_use]
    pub fn items(&self) -> &[Path] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the playlist has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item. Duplicates are allowed.
    pub fn add(&mut self, path: Path) {
        self.items.push(path);
    }

    /// Remove the item at `index`.
    ///
    /// `path` must be the item itself or a path inside it; the whole item is
    /// removed either way. Later items shift down by one.
    pub fn remove(&mut self, index: usize, path: &Path) -> Result<Path> {
        let item = self.items.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.items.len(),
        })?;
        if !item.is_prefix_of(path) {
            return Err(Error::PathMismatch {
                index,
                expected: item.encode(),
                given: path.encode(),
            });
        }
        Ok(self.items.remove(index))
    }
}

/// Named playlists shared between clients and persisted after every change.
#[derive(Debug)]
pub struct PlaylistStore {
    state: PersistedState<BTreeMap<String, Playlist>>,
}

impl PlaylistStore {
    /// Create a store over existing playlists.
    pub fn new(playlists: BTreeMap<String, Playlist>, persist: Box<dyn Persist>) -> Self {
        Self {
            state: PersistedState::new("playlists", playlists, persist),
        }
    }

    /// Open the store backed by a JSON file, loading its current content.
    pub fn open(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        let persist = JsonFilePersist::new(path);
        let playlists: BTreeMap<String, Playlist> = persist.load_or_default()?;
        info!(
            "Opened playlist store {} ({} playlists)",
            persist.path().display(),
            playlists.len()
        );
        Ok(Self::new(playlists, Box::new(persist)))
    }

    /// Playlist names in order.
    pub fn names(&self) -> Result<Vec<String>> {
        self.state.read(|playlists| playlists.keys().cloned().collect())
    }

    /// Copy of a playlist.
    pub fn get(&self, name: &str) -> Result<Option<Playlist>> {
        self.state.read(|playlists| playlists.get(name).cloned())
    }

    /// Create an empty playlist.
    pub fn create(&self, name: &str) -> Result<()> {
        self.state.update(|playlists| {
            if playlists.contains_key(name) {
                return Err(Error::PlaylistAlreadyExists(name.to_string()));
            }
            playlists.insert(name.to_string(), Playlist::new());
            info!("Created playlist: {}", name);
            Ok(())
        })
    }

    /// Delete a playlist.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.state.update(|playlists| {
            playlists
                .remove(name)
                .ok_or_else(|| Error::PlaylistNotFound(name.to_string()))?;
            info!("Deleted playlist: {}", name);
            Ok(())
        })
    }

    /// Append an item to a playlist.
    pub fn add_item(&self, name: &str, path: Path) -> Result<()> {
        self.state.update(|playlists| {
            let playlist = playlists
                .get_mut(name)
                .ok_or_else(|| Error::PlaylistNotFound(name.to_string()))?;
            debug!("Playlist {}: adding {}", name, path);
            playlist.add(path);
            Ok(())
        })
    }

    /// Remove an item from a playlist, see [`Playlist::remove`].
    pub fn remove_item(&self, name: &str, index: usize, path: &Path) -> Result<Path> {
        self.state.update(|playlists| {
            let playlist = playlists
                .get_mut(name)
                .ok_or_else(|| Error::PlaylistNotFound(name.to_string()))?;
            let removed = playlist.remove(index, path)?;
            debug!("Playlist {}: removed {} at {}", name, removed, index);
            Ok(removed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MockPersist, NoopPersist};

    fn path(s: &str) -> Path {
        Path::decode(s).expect("valid path")
    }

    #[test]
    fn test_playlist_add() {
        let mut p = Playlist::new();
        p.add(path("Root:a"));
        assert_eq!(p.len(), 1);
        p.add(path("Root:b"));
        assert_eq!(p.items(), [path("Root:a"), path("Root:b")]);
    }

    #[test]
    fn test_playlist_add_allows_duplicates() {
        let mut p = Playlist::new();
        p.add(path("Root:a"));
        p.add(path("Root:a"));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_playlist_remove_item() {
        let mut p = Playlist::new();
        p.add(path("Root:a"));
        let removed = p.remove(0, &path("Root:a")).expect("Should remove");
        assert_eq!(removed, path("Root:a"));
        assert!(p.is_empty());
    }

    #[test]
    fn test_playlist_remove_invalid_path() {
        let mut p = Playlist::new();
        p.add(path("Root:a"));
        let err = p.remove(0, &path("Root:b")).expect_err("mismatch");
        assert!(matches!(err, Error::PathMismatch { index: 0, .. }));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_playlist_remove_invalid_sub_path() {
        let mut p = Playlist::new();
        p.add(path("Root:a"));
        let err = p.remove(0, &path("Root:b:c")).expect_err("mismatch");
        assert!(matches!(err, Error::PathMismatch { .. }));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_playlist_remove_parent_path_of_item() {
        let mut p = Playlist::new();
        p.add(path("Root:a:b"));
        let err = p.remove(0, &path("Root:a")).expect_err("mismatch");
        assert!(matches!(err, Error::PathMismatch { .. }));
    }

    #[test]
    fn test_playlist_remove_multiple_items() {
        let mut p = Playlist::new();
        p.add(path("Root:a"));
        p.add(path("Root:b"));
        p.remove(1, &path("Root:b")).expect("Should remove b");
        assert_eq!(p.len(), 1);
        p.remove(0, &path("Root:a")).expect("Should remove a");
        assert!(p.is_empty());
    }

    #[test]
    fn test_playlist_item_remove_by_sub_path() {
        let mut p = Playlist::new();
        p.add(path("Root:a"));
        p.remove(0, &path("Root:a:b")).expect("sub path removes item");
        assert!(p.is_empty());

        p.add(path("Root:a"));
        p.add(path("Root:b"));
        p.remove(1, &path("Root:b")).expect("Should remove b");
        assert_eq!(p.items(), [path("Root:a")]);
        p.remove(0, &path("Root:a")).expect("Should remove a");
        assert!(p.is_empty());

        let err = p.remove(0, &path("Root:a")).expect_err("nothing left");
        assert!(matches!(err, Error::IndexOutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn test_playlist_serialization() {
        let mut p = Playlist::new();
        p.add(path("Root:a:1"));
        let json = serde_json::to_string(&p).expect("Should serialize");
        assert_eq!(json, r#"{"items":["Root:a:1"]}"#);
    }

    #[test]
    fn test_store_create_and_add() {
        let store = PlaylistStore::new(BTreeMap::new(), Box::new(NoopPersist));
        store.create("mix").expect("Should create");
        store.add_item("mix", path("Root:a")).expect("Should add");
        store.add_item("mix", path("Root:b")).expect("Should add");

        let mix = store.get("mix").expect("read").expect("exists");
        assert_eq!(mix.items(), [path("Root:a"), path("Root:b")]);
        assert_eq!(store.names().expect("read"), ["mix"]);
    }

    #[test]
    fn test_store_errors() {
        let store = PlaylistStore::new(BTreeMap::new(), Box::new(NoopPersist));
        store.create("mix").expect("Should create");
        assert!(matches!(
            store.create("mix"),
            Err(Error::PlaylistAlreadyExists(_))
        ));
        assert!(matches!(
            store.add_item("nope", path("Root:a")),
            Err(Error::PlaylistNotFound(_))
        ));
        assert!(matches!(
            store.remove_item("mix", 0, &path("Root:a")),
            Err(Error::IndexOutOfRange { .. })
        ));
        assert!(matches!(store.delete("nope"), Err(Error::PlaylistNotFound(_))));
    }

    #[test]
    fn test_store_persists_each_commit() {
        let mut mock = MockPersist::new();
        // create, add, remove: three commits; the rejected remove is not persisted
        mock.expect_persist().times(3).returning(|_| Ok(()));

        let store = PlaylistStore::new(BTreeMap::new(), Box::new(mock));
        store.create("mix").expect("Should create");
        store.add_item("mix", path("Root:a")).expect("Should add");
        assert!(store.remove_item("mix", 0, &path("Root:b")).is_err());
        store
            .remove_item("mix", 0, &path("Root:a:0"))
            .expect("Should remove");
    }

    #[test]
    fn test_store_keeps_mutation_when_persist_fails() {
        let mut mock = MockPersist::new();
        mock.expect_persist()
            .returning(|_| Err(Error::persistence("playlists.json", "read-only")));

        let mut initial = BTreeMap::new();
        initial.insert("mix".to_string(), Playlist::new());
        let store = PlaylistStore::new(initial, Box::new(mock));

        let result = store.add_item("mix", path("Root:a"));
        assert!(matches!(result, Err(Error::Persistence { .. })));
        let mix = store.get("mix").expect("read").expect("exists");
        assert_eq!(mix.len(), 1);
    }
}
