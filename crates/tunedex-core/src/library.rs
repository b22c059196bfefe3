//! The library index: a built tree over a flat list of track records.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::attr::Attr;
use crate::collect::{by, collect, sort_keys_by_group_name};
use crate::config::IndexConfig;
use crate::enumeration::{trim_enum_prefix, trim_track_num_prefix};
use crate::error::{Error, Result};
use crate::filter::{FilterItem, filter};
use crate::group::{Collection, Group, Leaf, Tracker, paths_collection, resolve};
use crate::path::{Key, Path, ROOT_KEY};
use crate::recent::recent;
use crate::track::{Track, TrackRecord, field};
use crate::transform::sub_transform;

/// Transform passes applied to every leaf of a built collection.
#[derive(Debug, Clone, Copy)]
struct LeafPasses {
    track_numbers: bool,
    enumerations: bool,
}

impl LeafPasses {
    /// Check the attributes read by the enabled passes have the expected types.
    fn check(self, track: &Track) -> Result<()> {
        if self.track_numbers || self.enumerations {
            track.try_string(field::NAME)?;
        }
        if self.track_numbers {
            track.try_int(field::TRACK_NUMBER)?;
            track.try_int(field::DISC_NUMBER)?;
        }
        Ok(())
    }

    fn apply(self, leaf: &Leaf) -> Group {
        let numbered = if self.track_numbers {
            trim_track_num_prefix(leaf)
        } else {
            Group::from(leaf.derive(leaf.tracks().to_vec(), BTreeMap::new()))
        };
        if !self.enumerations {
            return numbered;
        }
        match numbered.as_leaf() {
            Some(leaf) => trim_enum_prefix(leaf),
            None => numbered,
        }
    }
}

/// An immutable, fully built library index.
#[derive(Debug, Clone)]
pub struct Library {
    root: Arc<Collection>,
    secondary: BTreeMap<String, Arc<Collection>>,
    filters: BTreeMap<String, Vec<FilterItem>>,
    recent: Vec<Path>,
}

impl Library {
    /// Build the index over `records`.
    ///
    /// Fails with [`Error::AttributeType`] if a record stores an attribute
    /// read during the build with another type than configured.
    pub fn new(records: Vec<TrackRecord>, config: &IndexConfig) -> Result<Self> {
        let tracks: Vec<Track> = records.into_iter().map(Track::from).collect();
        let passes = LeafPasses {
            track_numbers: config.trim_track_numbers,
            enumerations: config.trim_enumerations,
        };
        for track in &tracks {
            check_track(track, config, passes).inspect_err(|e| {
                let id = track.get(field::ID).map(ToString::to_string).unwrap_or_default();
                warn!("Rejected track '{}': {}", id, e);
            })?;
        }

        let root = Arc::new(build_collection(&tracks, &config.root_attribute, passes));
        let secondary = config
            .secondary_attributes
            .iter()
            .map(|attr| {
                let col = build_collection(&tracks, attr, passes);
                debug!("Built secondary collection '{}' ({} groups)", attr, col.len());
                (attr.name().to_string(), Arc::new(col))
            })
            .collect();
        let filters: BTreeMap<String, Vec<FilterItem>> = config
            .filter_attributes
            .iter()
            .map(|attr| filter(&root, attr).map(|items| (attr.name().to_string(), items)))
            .collect::<Result<_>>()?;
        let recent = recent(&root, config.recent_count);

        info!(
            "Built library index: {} tracks in {} groups",
            tracks.len(),
            root.len()
        );
        Ok(Self {
            root,
            secondary,
            filters,
            recent,
        })
    }

    /// The root collection.
    #[must_use]
    pub fn root(&self) -> &Collection {
        &self.root
    }

    /// Group addressed by `path`. The first key must be the root key.
    pub fn resolve(&self, path: &Path) -> Result<Group> {
        let Some((first, rest)) = path.keys().split_first() else {
            return Err(Error::InvalidPath("empty path".to_string()));
        };
        if *first != Key::root() {
            return Err(Error::InvalidPath(format!(
                "path {path} does not start at {ROOT_KEY}"
            )));
        }

        let root = Group::Collection(Arc::clone(&self.root));
        if rest.is_empty() {
            return Ok(root);
        }
        resolve(&root, &Path::new(rest.to_vec())).map_err(|e| match e {
            Error::NotFound { key, .. } => Error::NotFound {
                key,
                path: path.encode(),
            },
            other => other,
        })
    }

    /// All indexed tracks in tree order, with transformed names.
    #[must_use]
    pub fn tracks(&self) -> Vec<Track> {
        self.root.tracks()
    }

    /// Secondary collection grouped by attribute `name`.
    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.secondary.get(name).map(AsRef::as_ref)
    }

    /// Names of the secondary collections.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.secondary.keys().map(String::as_str)
    }

    /// Filter list built for attribute `name`.
    #[must_use]
    pub fn filter(&self, name: &str) -> Option<&[FilterItem]> {
        self.filters.get(name).map(Vec::as_slice)
    }

    /// Names of the filter lists.
    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// The recently added top-level paths, newest first.
    #[must_use]
    pub fn recent(&self) -> &[Path] {
        &self.recent
    }

    /// A collection of the top-level groups named by `paths`.
    #[must_use]
    pub fn expand_paths(&self, paths: &[Path]) -> Collection {
        paths_collection(&self.root, paths)
    }

    /// The track whose `ID` attribute renders as `id`.
    #[must_use]
    pub fn track_by_id(&self, id: &str) -> Option<Track> {
        self.root.tracks().into_iter().find(|track| {
            track
                .get(field::ID)
                .is_some_and(|value| value.to_string() == id)
        })
    }
}

fn check_track(track: &Track, config: &IndexConfig, passes: LeafPasses) -> Result<()> {
    config.root_attribute.try_value(track)?;
    for attr in &config.secondary_attributes {
        attr.try_value(track)?;
    }
    track.try_int(field::DATE_ADDED)?;
    passes.check(track)
}

fn build_collection(tracks: &dyn Tracker, attr: &Attr, passes: LeafPasses) -> Collection {
    let grouped = collect(tracks, &by(attr.clone()));
    let sorted = sort_keys_by_group_name(&grouped);
    sub_transform(&sorted, &|leaf: &Leaf| passes.apply(leaf))
}
