//! Keys and paths: the addressing primitive of the index.
//!
//! A [`Path`] is an ordered sequence of [`Key`]s starting at the conventional
//! root key. Its canonical string form joins the keys with [`DELIMITER`] and is
//! what playlists, ratings and flags persist.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Separator between keys in an encoded path.
pub const DELIMITER: char = ':';

/// Conventional first key of every path.
pub const ROOT_KEY: &str = "Root";

/// Number of hex characters kept from a name hash.
pub const HASH_KEY_LEN: usize = 6;

/// Identifier of a group among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Key from an external identifier.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidKey {
                key: id,
                reason: "key cannot be empty".to_string(),
            });
        }
        if id.contains(DELIMITER) {
            return Err(Error::InvalidKey {
                key: id,
                reason: format!("key cannot contain '{DELIMITER}'"),
            });
        }
        Ok(Self(id))
    }

    /// Key derived from a display name: the leading hex digits of its SHA-256.
    ///
    /// Distinct names may collide after truncation.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let digest = format!("{:x}", Sha256::digest(name.as_bytes()));
        Self(digest[..HASH_KEY_LEN].to_string())
    }

    /// Positional key of a track inside a leaf group.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(index.to_string())
    }

    /// The conventional root key.
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_KEY.to_string())
    }

    /// Key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Position encoded by this key, if it is a positional key.
    ///
    /// Only the canonical decimal form is positional, so `+1` and `01` are
    /// not aliases of `1`.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        let index: usize = self.0.parse().ok()?;
        (self.0 == index.to_string()).then_some(index)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Key {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

/// Ordered key sequence addressing a node from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path(Vec<Key>);

impl Path {
    /// Path from a key sequence.
    #[must_use]
    pub const fn new(keys: Vec<Key>) -> Self {
        Self(keys)
    }

    /// Path holding only the root key.
    #[must_use]
    pub fn root() -> Self {
        Self(vec![Key::root()])
    }

    /// Parse an encoded path.
    ///
    /// The empty string decodes to the empty path.
    pub fn decode(encoded: &str) -> Result<Self> {
        if encoded.is_empty() {
            return Ok(Self::default());
        }
        encoded
            .split(DELIMITER)
            .map(|segment| {
                if segment.is_empty() {
                    Err(Error::InvalidPath(format!(
                        "empty segment in '{encoded}'"
                    )))
                } else {
                    Ok(Key(segment.to_string()))
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Canonical string form.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Keys of the path.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First key, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Key> {
        self.0.first()
    }

    /// Key at a given depth.
    #[must_use]
    pub fn get(&self, depth: usize) -> Option<&Key> {
        self.0.get(depth)
    }

    /// A new path extended by one key.
    #[must_use]
    pub fn child(&self, key: Key) -> Self {
        let mut keys = Vec::with_capacity(self.0.len() + 1);
        keys.extend_from_slice(&self.0);
        keys.push(key);
        Self(keys)
    }

    /// The first `len` segments (the whole path if it is shorter).
    #[must_use]
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Whether `self` equals `other` or is an ancestor of it.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{DELIMITER}")?;
            }
            f.write_str(key.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl TryFrom<String> for Path {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::decode(&value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.encode()
    }
}

impl FromIterator<Key> for Path {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> Path {
        Path::decode(s).expect("valid path")
    }

    #[test]
    fn test_decode_encode_round_trip() {
        for encoded in ["", "Root", "Root:a1b2c3", "Root:a1b2c3:0", "Root:x:y:z:12"] {
            let decoded = path(encoded);
            assert_eq!(decoded.encode(), encoded);
            assert_eq!(Path::decode(&decoded.encode()).expect("re-decode"), decoded);
        }
    }

    #[test]
    fn test_decode_rejects_empty_segment() {
        assert!(matches!(Path::decode("Root::a"), Err(Error::InvalidPath(_))));
        assert!(matches!(Path::decode("Root:"), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_key_validation() {
        assert!(Key::new("track-42").is_ok());
        assert!(matches!(Key::new(""), Err(Error::InvalidKey { .. })));
        assert!(matches!(Key::new("a:b"), Err(Error::InvalidKey { .. })));
    }

    #[test]
    fn test_key_from_name_is_deterministic_and_truncated() {
        let a = Key::from_name("Kind of Blue");
        let b = Key::from_name("Kind of Blue");
        let c = Key::from_name("A Love Supreme");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), HASH_KEY_LEN);
        assert!(a.as_str().chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn test_positional_key() {
        assert_eq!(Key::from_index(7).as_str(), "7");
        assert_eq!(Key::from_index(7).index(), Some(7));
        assert_eq!(Key::root().index(), None);
    }

    #[test]
    fn test_positional_key_must_be_canonical() {
        assert_eq!(Key::new("0").expect("key").index(), Some(0));
        for alias in ["+1", "01", "00"] {
            assert_eq!(Key::new(alias).expect("key").index(), None, "{alias}");
        }
    }

    #[test]
    fn test_child_and_prefix() {
        let root = Path::root();
        let album = root.child(Key::from_name("Album"));
        let track = album.child(Key::from_index(0));

        assert_eq!(track.len(), 3);
        assert_eq!(track.prefix(2), album);
        assert_eq!(album.prefix(10), album);
        assert!(album.is_prefix_of(&track));
        assert!(album.is_prefix_of(&album));
        assert!(!track.is_prefix_of(&album));
        assert_eq!(root.len(), 1, "child must not modify the parent");
    }

    #[test]
    fn test_prefix_is_segment_wise() {
        assert!(!path("Root:a").is_prefix_of(&path("Root:ab")));
        assert!(path("Root:a").is_prefix_of(&path("Root:a:b")));
    }

    #[test]
    fn test_path_serializes_as_string() {
        let p = path("Root:abc:1");
        let json = serde_json::to_string(&p).expect("Should serialize");
        assert_eq!(json, r#""Root:abc:1""#);
        let back: Path = serde_json::from_str(&json).expect("Should deserialize");
        assert_eq!(back, p);
    }

    #[test]
    fn test_from_str() {
        let p: Path = "Root:a".parse().expect("parse");
        assert_eq!(p.first(), Some(&Key::root()));
        assert_eq!(p.get(1).map(Key::as_str), Some("a"));
    }
}
