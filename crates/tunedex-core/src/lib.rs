//! Tunedex Core Library
//!
//! This crate builds and queries a hierarchical index over a flat list of
//! music tracks:
//! - Grouping tracks into keyed collections by attribute
//! - Path addressing of any group or track in the tree
//! - Leaf transforms stripping track-number and enumeration prefixes
//! - The recently added list and attribute filter lists
//! - Playlists, ratings, flags, play history and cursors persisted as JSON

pub mod attr;
pub mod collect;
pub mod config;
pub mod cursor;
pub mod enumeration;
pub mod error;
pub mod filter;
pub mod flags;
pub mod group;
pub mod history;
pub mod library;
pub mod path;
pub mod persist;
pub mod playlist;
pub mod rating;
pub mod recent;
pub mod track;
pub mod transform;

pub use attr::Attr;
pub use collect::{By, Collector, by, collect, sort_keys_by_group_name, sub_collect};
pub use config::IndexConfig;
pub use cursor::{Cursor, CursorStore};
pub use enumeration::{NumeralParser, trim_enum_prefix, trim_track_num_prefix};
pub use error::{Error, Result};
pub use filter::{FilterItem, filter};
pub use flags::FlagStore;
pub use group::{Collection, Group, Leaf, Tracker, paths_collection, resolve};
pub use history::HistoryStore;
pub use library::Library;
pub use path::{Key, Path};
pub use persist::{JsonFilePersist, NoopPersist, Persist, PersistedState};
pub use playlist::{Playlist, PlaylistStore};
pub use rating::{Rating, RatingStore};
pub use recent::recent;
pub use track::{Track, TrackRecord, Value};
pub use transform::{sub_transform, transform, walk};
