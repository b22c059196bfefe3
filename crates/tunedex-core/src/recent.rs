//! The "recently added" view of a collection.

use std::collections::HashSet;
use std::convert::Infallible;

use crate::group::Collection;
use crate::path::Path;
use crate::track::{Track, field};
use crate::transform::walk_collection;

/// The `n` most recently added top-level paths of `col`.
///
/// Paths are `Root:<child key>`, ordered by the newest `DateAdded` of any
/// track below them, without duplicates.
#[must_use]
pub fn recent(col: &Collection, n: usize) -> Vec<Path> {
    recent_by(col, n, field::DATE_ADDED)
}

/// [`recent`] ordering by an arbitrary integer date attribute.
#[must_use]
pub fn recent_by(col: &Collection, n: usize, date_field: &str) -> Vec<Path> {
    if n == 0 {
        return Vec::new();
    }

    let mut entries: Vec<(Path, i64)> = Vec::new();
    let Ok(()) = walk_collection(col, &Path::root(), &mut |track: &Track, path: &Path| {
        entries.push((path.prefix(2), track.int(date_field)));
        Ok::<(), Infallible>(())
    });

    // stable: equal dates keep walk order
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    let mut seen = HashSet::with_capacity(n);
    let mut result = Vec::with_capacity(n);
    for (path, _) in entries {
        if seen.insert(path.encode()) {
            result.push(path);
            if result.len() == n {
                break;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Attr;
    use crate::collect::{by, collect};
    use crate::track::TrackRecord;

    fn track(album: &str, added: i64) -> Track {
        Track::from(
            TrackRecord::new()
                .with(field::ALBUM, album)
                .with(field::DATE_ADDED, added),
        )
    }

    fn library() -> Collection {
        let tracks = vec![
            track("old", 100),
            track("mid", 200),
            track("old", 500),
            track("new", 400),
            track("mid", 300),
            track("ancient", 10),
        ];
        collect(&tracks, &by(Attr::string(field::ALBUM)))
    }

    fn album_path(name: &str) -> Path {
        Path::root().child(crate::path::Key::from_name(name))
    }

    #[test]
    fn test_recent_orders_by_newest_track_without_duplicates() {
        let col = library();
        let paths = recent(&col, 10);
        assert_eq!(
            paths,
            [album_path("old"), album_path("new"), album_path("mid"), album_path("ancient")]
        );
    }

    #[test]
    fn test_recent_limits_count() {
        let col = library();
        let paths = recent(&col, 2);
        assert_eq!(paths, [album_path("old"), album_path("new")]);
        assert!(recent(&col, 0).is_empty());
    }

    #[test]
    fn test_recent_ties_keep_walk_order() {
        let tracks = vec![track("b", 5), track("a", 5)];
        let col = collect(&tracks, &by(Attr::string(field::ALBUM)));
        assert_eq!(recent(&col, 2), [album_path("b"), album_path("a")]);
    }

    #[test]
    fn test_recent_truncates_nested_paths() {
        let col = library();
        let nested = crate::collect::sub_collect(&col, &by(Attr::int(field::DATE_ADDED)));
        let paths = recent(&nested, 3);
        assert!(paths.iter().all(|p| p.len() == 2));
        assert_eq!(paths[0], album_path("old"));
    }
}
