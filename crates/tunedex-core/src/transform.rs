//! Recursive tree algorithms: leaf transformations and depth-first walks.

use std::collections::{BTreeMap, HashMap};

use crate::group::{Collection, Group, Leaf};
use crate::path::{Key, Path};
use crate::track::Track;

/// Apply a leaf transformation to a group.
///
/// A leaf is passed to `f` directly; a collection is rebuilt with `f` applied
/// to every leaf below it.
pub fn transform<F>(group: &Group, f: &F) -> Group
where
    F: Fn(&Leaf) -> Group,
{
    match group {
        Group::Leaf(leaf) => f(leaf),
        Group::Collection(col) => Group::from(sub_transform(col, f)),
    }
}

/// Rebuild a collection with `f` applied to every leaf below it.
///
/// Sub-collections keep their keys, names and fields; only leaves are replaced.
pub fn sub_transform<F>(col: &Collection, f: &F) -> Collection
where
    F: Fn(&Leaf) -> Group,
{
    let groups: HashMap<Key, Group> = col
        .iter()
        .map(|(key, group)| (key.clone(), transform(group, f)))
        .collect();
    col.derive(col.keys().to_vec(), groups, BTreeMap::new())
}

/// Visit every track below `group` depth-first, in key order.
///
/// `prefix` is the path of `group`. Child paths extend it by the child key;
/// track paths extend the leaf path by the track's position. The first error
/// returned by `visit` stops the walk and is returned.
pub fn walk<E, F>(group: &Group, prefix: &Path, visit: &mut F) -> Result<(), E>
where
    F: FnMut(&Track, &Path) -> Result<(), E>,
{
    match group {
        Group::Collection(col) => walk_collection(col, prefix, visit),
        Group::Leaf(leaf) => {
            for (i, track) in leaf.tracks().iter().enumerate() {
                visit(track, &prefix.child(Key::from_index(i)))?;
            }
            Ok(())
        }
    }
}

/// [`walk`] over the children of a collection whose path is `prefix`.
pub fn walk_collection<E, F>(col: &Collection, prefix: &Path, visit: &mut F) -> Result<(), E>
where
    F: FnMut(&Track, &Path) -> Result<(), E>,
{
    for (key, child) in col.iter() {
        walk(child, &prefix.child(key.clone()), visit)?;
    }
    Ok(())
}
