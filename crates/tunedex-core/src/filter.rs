//! Filter lists: attribute values mapped to the top-level groups holding them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attr::Attr;
use crate::error::{Error, Result};
use crate::group::Collection;
use crate::path::Path;
use crate::track::{Track, Value};
use crate::transform::walk_collection;

/// One value of a filter attribute and the groups containing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterItem {
    name: String,
    paths: Vec<Path>,
}

impl FilterItem {
    /// The attribute value.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level paths (`Root:<key>`) with at least one track carrying the
    /// value, in walk order.
    #[must_use]
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }
}

/// Build the filter list of `attr` over `col`, ordered by value.
///
/// String-list attributes contribute each element separately. Empty values
/// are skipped.
pub fn filter(col: &Collection, attr: &Attr) -> Result<Vec<FilterItem>> {
    let mut items: BTreeMap<String, Vec<Path>> = BTreeMap::new();
    walk_collection(col, &Path::root(), &mut |track: &Track, path: &Path| {
        let top = path.prefix(2);
        let values = match attr.try_value(track)? {
            Value::Strings(list) => list,
            other => vec![other.to_string()],
        };
        for value in values.into_iter().filter(|v| !v.is_empty()) {
            let paths = items.entry(value).or_default();
            if !paths.contains(&top) {
                paths.push(top.clone());
            }
        }
        Ok::<(), Error>(())
    })?;

    debug!("Built filter '{}' with {} items", attr, items.len());
    Ok(items
        .into_iter()
        .map(|(name, paths)| FilterItem { name, paths })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::{by, collect};
    use crate::path::Key;
    use crate::track::{TrackRecord, field};

    fn track(album: &str, composers: &[&str]) -> Track {
        let mut record = TrackRecord::new().with(field::ALBUM, album);
        if !composers.is_empty() {
            record.insert(
                field::COMPOSER,
                composers.iter().map(ToString::to_string).collect::<Vec<_>>(),
            );
        }
        Track::from(record)
    }

    fn album_path(name: &str) -> Path {
        Path::root().child(Key::from_name(name))
    }

    fn library() -> Collection {
        let tracks = vec![
            track("Mass", &["Bach"]),
            track("Mass", &["Bach", "Anon"]),
            track("Quartets", &["Haydn", "Bach"]),
            track("Silence", &[]),
        ];
        collect(&tracks, &by(Attr::string(field::ALBUM)))
    }

    #[test]
    fn test_filter_splits_lists_and_dedups_paths() {
        let items = filter(&library(), &Attr::strings(field::COMPOSER)).expect("filter");
        let names: Vec<&str> = items.iter().map(FilterItem::name).collect();
        assert_eq!(names, ["Anon", "Bach", "Haydn"]);

        assert_eq!(items[0].paths(), [album_path("Mass")]);
        assert_eq!(items[1].paths(), [album_path("Mass"), album_path("Quartets")]);
        assert_eq!(items[2].paths(), [album_path("Quartets")]);
    }

    #[test]
    fn test_filter_on_scalar_attribute() {
        let items = filter(&library(), &Attr::string(field::ALBUM)).expect("filter");
        let names: Vec<&str> = items.iter().map(FilterItem::name).collect();
        assert_eq!(names, ["Mass", "Quartets", "Silence"]);
    }

    #[test]
    fn test_filter_type_mismatch() {
        let err = filter(&library(), &Attr::int(field::COMPOSER)).expect_err("list is not int");
        assert!(matches!(err, Error::AttributeType { expected: "int", .. }));
    }
}
