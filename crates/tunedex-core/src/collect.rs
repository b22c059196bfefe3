//! Collectors: grouping flat track lists into collections.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::attr::Attr;
use crate::group::{Collection, Group, Leaf, Tracker};
use crate::path::Key;
use crate::track::Track;
use crate::transform::sub_transform;

/// Strategy turning a list of tracks into a collection.
pub trait Collector {
    /// Group the tracks of `tracker` into a collection.
    fn collect(&self, tracker: &dyn Tracker) -> Collection;
}

/// Collector grouping tracks by the rendered value of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct By {
    attr: Attr,
}

/// Collector grouping by `attr`.
#[must_use]
pub const fn by(attr: Attr) -> By {
    By { attr }
}

impl By {
    /// The grouping attribute.
    #[must_use]
    pub const fn attr(&self) -> &Attr {
        &self.attr
    }
}

impl Collector for By {
    fn collect(&self, tracker: &dyn Tracker) -> Collection {
        let name = tracker
            .group_name()
            .map_or_else(|| format!("by {}", self.attr), str::to_string);

        let mut keys: Vec<Key> = Vec::new();
        let mut groups: HashMap<Key, (String, Vec<Track>)> = HashMap::new();
        for track in tracker.tracks() {
            let rendered = self.attr.render(&track);
            match groups.entry(Key::from_name(&rendered)) {
                Entry::Occupied(mut entry) => entry.get_mut().1.push(track),
                Entry::Vacant(entry) => {
                    keys.push(entry.key().clone());
                    entry.insert((rendered, vec![track]));
                }
            }
        }

        let children = keys.into_iter().filter_map(|key| {
            groups
                .remove(&key)
                .map(|(group_name, tracks)| (key, Group::from(Leaf::new(group_name, tracks))))
        });
        Collection::new(name, children)
    }
}

/// Apply a collector to a list of tracks.
pub fn collect(tracker: &dyn Tracker, collector: &impl Collector) -> Collection {
    let col = collector.collect(tracker);
    debug!("Collected {} groups into '{}'", col.len(), col.name());
    col
}

/// Apply a collector to every leaf below `col`, turning each leaf into a collection.
pub fn sub_collect(col: &Collection, collector: &impl Collector) -> Collection {
    sub_transform(col, &|leaf: &Leaf| Group::from(collector.collect(leaf)))
}

/// A copy of `col` whose keys are ordered by child group name.
#[must_use]
pub fn sort_keys_by_group_name(col: &Collection) -> Collection {
    let mut children: Vec<(&Key, &Group)> = col.iter().collect();
    children.sort_by(|(_, a), (_, b)| a.name().cmp(b.name()));

    let keys = children.iter().map(|(key, _)| (*key).clone()).collect();
    let groups = children
        .into_iter()
        .map(|(key, group)| (key.clone(), group.clone()))
        .collect();
    col.derive(keys, groups, BTreeMap::new())
}

/// A copy of `group` carrying its first track's value of `attr` as a group field.
///
/// Groups without tracks are returned unchanged.
#[must_use]
pub fn first_track_attr(attr: &Attr, group: &Group) -> Group {
    let Some(first) = group.tracks().into_iter().next() else {
        return group.clone();
    };
    let mut fields = BTreeMap::new();
    fields.insert(attr.name().to_string(), attr.value(&first));

    match group {
        Group::Leaf(leaf) => Group::from(leaf.derive(leaf.tracks().to_vec(), fields)),
        Group::Collection(col) => {
            let groups = col
                .iter()
                .map(|(key, child)| (key.clone(), child.clone()))
                .collect();
            Group::from(col.derive(col.keys().to_vec(), groups, fields))
        }
    }
}
