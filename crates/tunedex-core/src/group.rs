//! The group tree: leaves of tracks and keyed collections of groups.
//!
//! Nodes are immutable once built and shared through `Arc`, so a built tree
//! can be read from many threads without locking. Transformations produce new
//! nodes that reuse the original tracks and field maps.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::path::{Key, Path};
use crate::track::{Track, Value};

/// Layered field map attached to a group.
///
/// An overlay holds its own values and falls back to the map it wraps.
#[derive(Debug, Default)]
pub struct Fields {
    own: BTreeMap<String, Value>,
    base: Option<Arc<Fields>>,
}

impl Fields {
    /// Empty field map.
    #[must_use]
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Field map holding the given values.
    #[must_use]
    pub fn from_values(values: BTreeMap<String, Value>) -> Arc<Self> {
        Arc::new(Self {
            own: values,
            base: None,
        })
    }

    /// Overlay shadowing `base` with `overrides`.
    #[must_use]
    pub fn overlay(base: &Arc<Self>, overrides: BTreeMap<String, Value>) -> Arc<Self> {
        if overrides.is_empty() {
            return Arc::clone(base);
        }
        Arc::new(Self {
            own: overrides,
            base: Some(Arc::clone(base)),
        })
    }

    /// Look up a field, searching overlays from the top down.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.own
            .get(name)
            .or_else(|| self.base.as_deref().and_then(|base| base.get(name)))
    }
}

/// A named group holding tracks directly.
#[derive(Debug)]
pub struct Leaf {
    name: String,
    tracks: Vec<Track>,
    fields: Arc<Fields>,
}

impl Leaf {
    /// Create a leaf group.
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            tracks,
            fields: Fields::empty(),
        }
    }

    /// A copy of this leaf with replaced tracks and extra fields layered on top.
    #[must_use]
    pub fn derive(&self, tracks: Vec<Track>, fields: BTreeMap<String, Value>) -> Self {
        Self {
            name: self.name.clone(),
            tracks,
            fields: Fields::overlay(&self.fields, fields),
        }
    }

    /// Group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tracks in order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Group field lookup.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Track addressed by a positional key.
    #[must_use]
    pub fn track(&self, key: &Key) -> Option<&Track> {
        key.index().and_then(|i| self.tracks.get(i))
    }
}

/// A named group of keyed child groups.
#[derive(Debug)]
pub struct Collection {
    name: String,
    keys: Vec<Key>,
    groups: HashMap<Key, Group>,
    fields: Arc<Fields>,
}

impl Collection {
    /// Create a collection from keyed children.
    ///
    /// Children keep the order given; a repeated key keeps its first group.
    pub fn new(name: impl Into<String>, children: impl IntoIterator<Item = (Key, Group)>) -> Self {
        let name = name.into();
        let mut keys = Vec::new();
        let mut groups = HashMap::new();
        for (key, group) in children {
            if groups.contains_key(&key) {
                debug!("Collection {}: ignoring duplicate key {}", name, key);
                continue;
            }
            keys.push(key.clone());
            groups.insert(key, group);
        }
        Self {
            name,
            keys,
            groups,
            fields: Fields::empty(),
        }
    }

    /// A copy of this collection with new children and extra fields layered on top.
    #[must_use]
    pub fn derive(
        &self,
        keys: Vec<Key>,
        groups: HashMap<Key, Group>,
        fields: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            name: self.name.clone(),
            keys,
            groups,
            fields: Fields::overlay(&self.fields, fields),
        }
    }

    /// Group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Child keys in enumeration order.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Child group for a key.
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Group> {
        self.groups.get(key)
    }

    /// Group field lookup.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the collection has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Children in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Group)> {
        self.keys
            .iter()
            .filter_map(|key| self.groups.get(key).map(|group| (key, group)))
    }

    /// All tracks below this collection, in traversal order.
    #[must_use]
    pub fn tracks(&self) -> Vec<Track> {
        self.iter().flat_map(|(_, group)| group.tracks()).collect()
    }

    /// Path of every immediate child, given the path of this collection.
    #[must_use]
    pub fn paths(&self, prefix: &Path) -> Vec<Path> {
        self.keys.iter().map(|key| prefix.child(key.clone())).collect()
    }
}

/// A node of the index tree.
#[derive(Debug, Clone)]
pub enum Group {
    /// Group of tracks.
    Leaf(Arc<Leaf>),
    /// Group of groups.
    Collection(Arc<Collection>),
}

impl Group {
    /// Group name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(leaf) => leaf.name(),
            Self::Collection(col) => col.name(),
        }
    }

    /// Group field lookup.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Leaf(leaf) => leaf.field(name),
            Self::Collection(col) => col.field(name),
        }
    }

    /// All tracks reachable from this group, in traversal order.
    #[must_use]
    pub fn tracks(&self) -> Vec<Track> {
        match self {
            Self::Leaf(leaf) => leaf.tracks().to_vec(),
            Self::Collection(col) => col.tracks(),
        }
    }

    /// The collection, if this is one.
    #[must_use]
    pub fn as_collection(&self) -> Option<&Arc<Collection>> {
        match self {
            Self::Collection(col) => Some(col),
            Self::Leaf(_) => None,
        }
    }

    /// The leaf, if this is one.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&Arc<Leaf>> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Collection(_) => None,
        }
    }

    /// Whether both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => Arc::ptr_eq(a, b),
            (Self::Collection(a), Self::Collection(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Leaf> for Group {
    fn from(leaf: Leaf) -> Self {
        Self::Leaf(Arc::new(leaf))
    }
}

impl From<Collection> for Group {
    fn from(col: Collection) -> Self {
        Self::Collection(Arc::new(col))
    }
}

/// Anything that can list tracks.
pub trait Tracker {
    /// Tracks in order.
    fn tracks(&self) -> Vec<Track>;

    /// Name of the group the tracks come from, if any.
    fn group_name(&self) -> Option<&str> {
        None
    }
}

impl Tracker for Vec<Track> {
    fn tracks(&self) -> Vec<Track> {
        self.clone()
    }
}

impl Tracker for Leaf {
    fn tracks(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    fn group_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl Tracker for Collection {
    fn tracks(&self) -> Vec<Track> {
        Self::tracks(self)
    }

    fn group_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl Tracker for Group {
    fn tracks(&self) -> Vec<Track> {
        Self::tracks(self)
    }

    fn group_name(&self) -> Option<&str> {
        Some(self.name())
    }
}

/// Find the group addressed by `path`, starting at `group`.
///
/// Every segment names a child key. At a leaf, a single remaining segment
/// is taken as the position of a track and resolves to the leaf itself.
pub fn resolve(group: &Group, path: &Path) -> Result<Group> {
    if path.is_empty() {
        return Err(Error::InvalidPath("empty path".to_string()));
    }
    resolve_keys(group, path.keys(), path)
}

fn resolve_keys(group: &Group, keys: &[Key], full: &Path) -> Result<Group> {
    let Some((key, rest)) = keys.split_first() else {
        return Ok(group.clone());
    };

    match group {
        Group::Collection(col) => {
            let child = col.get(key).ok_or_else(|| Error::NotFound {
                key: key.to_string(),
                path: full.encode(),
            })?;
            resolve_keys(child, rest, full)
        }
        Group::Leaf(leaf) => {
            if !rest.is_empty() {
                return Err(Error::InvalidPath(format!(
                    "reached leaf group '{}' with remaining path {}",
                    leaf.name(),
                    Path::new(keys.to_vec())
                )));
            }
            if leaf.track(key).is_none() {
                return Err(Error::NotFound {
                    key: key.to_string(),
                    path: full.encode(),
                });
            }
            Ok(group.clone())
        }
    }
}

/// Build a collection of the groups of `src` named by the second key of each path.
///
/// First-level keys are deduplicated keeping first-seen order. Paths too short
/// to name a child, and keys no longer present in `src`, are skipped.
#[must_use]
pub fn paths_collection(src: &Collection, paths: &[Path]) -> Collection {
    let children = paths.iter().filter_map(|path| {
        let Some(key) = path.get(1) else {
            debug!("Skipping path without a child key: {}", path);
            return None;
        };
        match src.get(key) {
            Some(group) => Some((key.clone(), group.clone())),
            None => {
                debug!("Skipping stale path: {}", path);
                None
            }
        }
    });
    Collection::new("paths collection", children)
}
