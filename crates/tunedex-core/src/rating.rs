//! Per-path star ratings.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::path::Path;
use crate::persist::{JsonFilePersist, Persist, PersistedState};

/// A rating from 0 to 5 stars, 0 meaning unrated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// No rating.
    pub const NONE: Self = Self(0);

    /// Highest accepted value.
    pub const MAX: u8 = 5;

    /// Create a rating, failing with [`Error::InvalidRating`] above [`Rating::MAX`].
    pub fn new(value: u8) -> Result<Self> {
        if value > Self::MAX {
            return Err(Error::InvalidRating(value));
        }
        Ok(Self(value))
    }

    /// Number of stars.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this is [`Rating::NONE`].
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for Rating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..Self::MAX {
            f.write_str(if i < self.0 { "*" } else { "." })?;
        }
        Ok(())
    }
}

/// Ratings keyed by encoded path.
#[derive(Debug)]
pub struct RatingStore {
    state: PersistedState<BTreeMap<String, Rating>>,
}

impl RatingStore {
    /// Create a store over existing ratings.
    pub fn new(ratings: BTreeMap<String, Rating>, persist: Box<dyn Persist>) -> Self {
        Self {
            state: PersistedState::new("ratings", ratings, persist),
        }
    }

    /// Open the store backed by a JSON file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let persist = JsonFilePersist::new(path);
        let ratings: BTreeMap<String, Rating> = persist.load_or_default()?;
        info!("Opened rating store ({} rated paths)", ratings.len());
        Ok(Self::new(ratings, Box::new(persist)))
    }

    /// Rating of `path`, [`Rating::NONE`] if never rated.
    pub fn get(&self, path: &Path) -> Result<Rating> {
        let key = path.encode();
        self.state
            .read(|ratings| ratings.get(&key).copied().unwrap_or_default())
    }

    /// Set the rating of `path`. Setting [`Rating::NONE`] clears it.
    pub fn set(&self, path: &Path, rating: Rating) -> Result<()> {
        let key = path.encode();
        self.state.update(|ratings| {
            debug!("Rating {} -> {}", key, rating.value());
            if rating.is_none() {
                ratings.remove(&key);
            } else {
                ratings.insert(key, rating);
            }
            Ok(())
        })
    }

    /// Rated paths with their ratings, ordered by encoded path.
    pub fn list(&self) -> Result<Vec<(String, Rating)>> {
        self.state.read(|ratings| {
            ratings
                .iter()
                .map(|(path, rating)| (path.clone(), *rating))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MockPersist, NoopPersist};
    use tempfile::TempDir;

    fn path(s: &str) -> Path {
        Path::decode(s).expect("valid path")
    }

    #[test]
    fn test_rating_range() {
        assert_eq!(Rating::new(0).expect("zero"), Rating::NONE);
        assert_eq!(Rating::new(5).expect("five").value(), 5);
        assert!(matches!(Rating::new(6), Err(Error::InvalidRating(6))));
    }

    #[test]
    fn test_rating_display() {
        assert_eq!(Rating::new(3).expect("three").to_string(), "***..");
        assert_eq!(Rating::NONE.to_string(), ".....");
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        let ok: Rating = serde_json::from_str("4").expect("Should deserialize");
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_store_get_set() {
        let store = RatingStore::new(BTreeMap::new(), Box::new(NoopPersist));
        let p = path("Root:abc123");
        assert_eq!(store.get(&p).expect("read"), Rating::NONE);

        store.set(&p, Rating::new(4).expect("four")).expect("set");
        assert_eq!(store.get(&p).expect("read").value(), 4);

        store.set(&p, Rating::NONE).expect("clear");
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn test_store_persist_failure_keeps_rating() {
        let mut mock = MockPersist::new();
        mock.expect_persist()
            .times(1)
            .returning(|_| Err(Error::persistence("ratings.json", "denied")));

        let store = RatingStore::new(BTreeMap::new(), Box::new(mock));
        let p = path("Root:abc123:0");
        let result = store.set(&p, Rating::new(2).expect("two"));
        assert!(matches!(result, Err(Error::Persistence { .. })));
        assert_eq!(store.get(&p).expect("read").value(), 2);
    }

    #[test]
    fn test_store_reopen_from_file() {
        let temp_dir = TempDir::new().expect("Should create temp dir");
        let file = temp_dir.path().join("ratings.json");
        let p = path("Root:abc123");

        let store = RatingStore::open(&file).expect("open");
        store.set(&p, Rating::new(5).expect("five")).expect("set");

        let reopened = RatingStore::open(&file).expect("reopen");
        assert_eq!(reopened.get(&p).expect("read").value(), 5);
    }
}
