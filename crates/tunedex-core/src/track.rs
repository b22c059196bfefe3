//! Track records and the typed accessor over their attributes.
//!
//! A [`Track`] is a cheap-clone handle to an immutable attribute bag. The same
//! track is referenced from every group it appears in; transformations never
//! copy or mutate it, they wrap it in an [`OverlayTrack`] instead.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Well-known attribute names.
pub mod field {
    /// External track identifier.
    pub const ID: &str = "ID";
    /// Track title.
    pub const NAME: &str = "Name";
    /// Album title.
    pub const ALBUM: &str = "Album";
    /// Performing artist(s).
    pub const ARTIST: &str = "Artist";
    /// Composer(s).
    pub const COMPOSER: &str = "Composer";
    /// Track number on its disc.
    pub const TRACK_NUMBER: &str = "TrackNumber";
    /// Disc number within a release.
    pub const DISC_NUMBER: &str = "DiscNumber";
    /// Time the track was added to the library (Unix epoch seconds).
    pub const DATE_ADDED: &str = "DateAdded";
    /// Media location, opaque to the index.
    pub const LOCATION: &str = "Location";
}

/// A tagged attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer value (numbers, timestamps).
    Int(i64),
    /// Single string value.
    String(String),
    /// List of strings (e.g. multiple artists).
    Strings(Vec<String>),
}

impl Value {
    /// Name of the stored type, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::Strings(_) => "strings",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Strings(list) => write!(f, "{}", list.join(", ")),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(list: Vec<String>) -> Self {
        Self::Strings(list)
    }
}

/// Read access to a bag of named attributes.
pub trait Attributes: fmt::Debug + Send + Sync {
    /// Look up the raw value of an attribute.
    fn attribute(&self, field: &str) -> Option<&Value>;
}

/// Concrete attribute bag as supplied by a track source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRecord {
    attributes: BTreeMap<String, Value>,
}

impl TrackRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(field.into(), value.into());
    }

    /// Iterate over attribute names.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }
}

impl Attributes for TrackRecord {
    fn attribute(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }
}

/// Shared, read-only handle to a track.
#[derive(Debug, Clone)]
pub struct Track(Arc<dyn Attributes>);

impl Track {
    /// Wrap an attribute bag.
    pub fn new(attributes: impl Attributes + 'static) -> Self {
        Self(Arc::new(attributes))
    }

    /// Raw attribute lookup.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.attribute(field)
    }

    /// String attribute, `""` when absent.
    pub fn try_string(&self, field: &str) -> Result<&str> {
        match self.get(field) {
            None => Ok(""),
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(mismatch(field, "string", other)),
        }
    }

    /// Integer attribute, `0` when absent.
    pub fn try_int(&self, field: &str) -> Result<i64> {
        match self.get(field) {
            None => Ok(0),
            Some(Value::Int(n)) => Ok(*n),
            Some(other) => Err(mismatch(field, "int", other)),
        }
    }

    /// String-list attribute, empty when absent.
    pub fn try_strings(&self, field: &str) -> Result<&[String]> {
        match self.get(field) {
            None => Ok(&[]),
            Some(Value::Strings(list)) => Ok(list),
            Some(other) => Err(mismatch(field, "strings", other)),
        }
    }

    /// String attribute, `""` when absent.
    ///
    /// # Panics
    ///
    /// Panics if the attribute holds a non-string value.
    #[must_use]
    #[allow(clippy::panic)]
    pub fn string(&self, field: &str) -> &str {
        self.try_string(field).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Integer attribute, `0` when absent.
    ///
    /// # Panics
    ///
    /// Panics if the attribute holds a non-integer value.
    #[must_use]
    #[allow(clippy::panic)]
    pub fn int(&self, field: &str) -> i64 {
        self.try_int(field).unwrap_or_else(|e| panic!("{e}"))
    }

    /// String-list attribute, empty when absent.
    ///
    /// # Panics
    ///
    /// Panics if the attribute holds a non-list value.
    #[must_use]
    #[allow(clippy::panic)]
    pub fn strings(&self, field: &str) -> &[String] {
        self.try_strings(field).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Wrap this track so the given fields report new values.
    #[must_use]
    pub fn overlay(&self, overrides: BTreeMap<String, Value>) -> Self {
        Self::new(OverlayTrack {
            inner: self.clone(),
            overrides,
        })
    }

    /// Whether both handles point at the same underlying track.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<TrackRecord> for Track {
    fn from(record: TrackRecord) -> Self {
        Self::new(record)
    }
}

fn mismatch(field: &str, expected: &'static str, found: &Value) -> Error {
    Error::AttributeType {
        field: field.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// A track whose selected fields are shadowed by override values.
#[derive(Debug)]
pub struct OverlayTrack {
    inner: Track,
    overrides: BTreeMap<String, Value>,
}

impl OverlayTrack {
    /// The wrapped track.
    #[must_use]
    pub const fn inner(&self) -> &Track {
        &self.inner
    }
}

impl Attributes for OverlayTrack {
    fn attribute(&self, field: &str) -> Option<&Value> {
        self.overrides
            .get(field)
            .or_else(|| self.inner.get(field))
    }
}

/// Compare two optional string-list values.
///
/// Two absent values are equal; an absent value never equals a present one.
///
/// # Panics
///
/// Panics if either value is present but not a string list.
#[must_use]
#[allow(clippy::panic)]
pub fn strings_equal(x: Option<&Value>, y: Option<&Value>) -> bool {
    match (x, y) {
        (None, None) => true,
        (Some(Value::Strings(a)), Some(Value::Strings(b))) => a == b,
        (None, Some(Value::Strings(_))) | (Some(Value::Strings(_)), None) => false,
        (a, b) => panic!(
            "strings_equal called on non-list values: {:?} / {:?}",
            a.map(Value::type_name),
            b.map(Value::type_name)
        ),
    }
}
