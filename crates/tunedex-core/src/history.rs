//! Play history: when each path was played.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::error::Result;
use crate::path::Path;
use crate::persist::{JsonFilePersist, Persist, PersistedState};

/// Play times (Unix epoch seconds) keyed by encoded path, oldest first.
#[derive(Debug)]
pub struct HistoryStore {
    state: PersistedState<BTreeMap<String, Vec<u64>>>,
}

impl HistoryStore {
    /// Create a store over an existing history.
    pub fn new(history: BTreeMap<String, Vec<u64>>, persist: Box<dyn Persist>) -> Self {
        Self {
            state: PersistedState::new("history", history, persist),
        }
    }

    /// Open the store backed by a JSON file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let persist = JsonFilePersist::new(path);
        let history: BTreeMap<String, Vec<u64>> = persist.load_or_default()?;
        info!("Opened play history ({} paths)", history.len());
        Ok(Self::new(history, Box::new(persist)))
    }

    /// Record a play of `path` now.
    pub fn record(&self, path: &Path) -> Result<u64> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        self.add(path, now)?;
        Ok(now)
    }

    /// Record a play of `path` at `played_at`.
    pub fn add(&self, path: &Path, played_at: u64) -> Result<()> {
        let key = path.encode();
        self.state.update(|history| {
            debug!("Played {} at {}", key, played_at);
            let plays = history.entry(key).or_default();
            let at = plays.partition_point(|&t| t <= played_at);
            plays.insert(at, played_at);
            Ok(())
        })
    }

    /// Play times of `path`, oldest first.
    pub fn get(&self, path: &Path) -> Result<Vec<u64>> {
        let key = path.encode();
        self.state
            .read(|history| history.get(&key).cloned().unwrap_or_default())
    }

    /// Every played path with its latest play time, most recent first.
    pub fn latest(&self) -> Result<Vec<(String, u64)>> {
        self.state.read(|history| {
            let mut entries: Vec<(String, u64)> = history
                .iter()
                .filter_map(|(path, plays)| plays.last().map(|&t| (path.clone(), t)))
                .collect();
            entries.sort_by(|a, b| b.1.cmp(&a.1));
            entries
        })
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
    fn test_add_keeps_plays_ordered() {
        let store = HistoryStore::new(BTreeMap::new(), Box::new(NoopPersist));
        let p = path("Root:abc123:0");
        store.add(&p, 300).expect("add");
        store.add(&p, 100).expect("add");
        store.add(&p, 200).expect("add");

        assert_eq!(store.get(&p).expect("get"), [100, 200, 300]);
        assert!(store.get(&path("Root:other")).expect("get").is_empty());
    }

    #[test]
    fn test_latest_most_recent_first() {
        let store = HistoryStore::new(BTreeMap::new(), Box::new(NoopPersist));
        store.add(&path("Root:a"), 10).expect("add");
        store.add(&path("Root:b"), 30).expect("add");
        store.add(&path("Root:a"), 20).expect("add");

        assert_eq!(
            store.latest().expect("latest"),
            [("Root:b".to_string(), 30), ("Root:a".to_string(), 20)]
        );
    }

    #[test]
    fn test_record_uses_current_time() {
        let store = HistoryStore::new(BTreeMap::new(), Box::new(NoopPersist));
        let played = store.record(&path("Root:a")).expect("record");
        assert!(played > 0);
        assert_eq!(store.get(&path("Root:a")).expect("get"), [played]);
    }

    #[test]
    fn test_persist_failure_keeps_play() {
        let mut mock = MockPersist::new();
        mock.expect_persist()
            .times(1)
            .returning(|_| Err(Error::persistence("history.json", "denied")));

        let store = HistoryStore::new(BTreeMap::new(), Box::new(mock));
        let result = store.add(&path("Root:a"), 5);
        assert!(matches!(result, Err(Error::Persistence { .. })));
        assert_eq!(store.get(&path("Root:a")).expect("get"), [5]);
    }

    #[test]
    fn test_reopen_from_file() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let file = temp_dir.path().join("history.json");

        let store = HistoryStore::open(&file).expect("open");
        store.add(&path("Root:a:1"), 42).expect("add");

        let reopened = HistoryStore::open(&file).expect("reopen");
        assert_eq!(reopened.get(&path("Root:a:1")).expect("get"), [42]);
    }
}
