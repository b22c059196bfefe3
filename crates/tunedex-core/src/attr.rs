//! Attribute selectors used to group and render tracks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::track::{Track, Value};

/// A named track attribute together with the type it is read as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Attr {
    /// Single string attribute.
    String(String),
    /// Integer attribute.
    Int(String),
    /// String-list attribute.
    Strings(String),
}

impl Attr {
    /// String attribute selector.
    pub fn string(name: impl Into<String>) -> Self {
        Self::String(name.into())
    }

    /// Integer attribute selector.
    pub fn int(name: impl Into<String>) -> Self {
        Self::Int(name.into())
    }

    /// String-list attribute selector.
    pub fn strings(name: impl Into<String>) -> Self {
        Self::Strings(name.into())
    }

    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::String(name) | Self::Int(name) | Self::Strings(name) => name,
        }
    }

    /// Typed value of the attribute on a track, zero value when absent.
    ///
    /// Fails with [`Error::AttributeType`](crate::Error::AttributeType) if the
    /// track stores the attribute with a different type.
    pub fn try_value(&self, track: &Track) -> Result<Value> {
        Ok(match self {
            Self::String(name) => Value::String(track.try_string(name)?.to_string()),
            Self::Int(name) => Value::Int(track.try_int(name)?),
            Self::Strings(name) => Value::Strings(track.try_strings(name)?.to_vec()),
        })
    }

    /// Typed value of the attribute on a track, zero value when absent.
    ///
    /// # Panics
    ///
    /// Panics if the track stores the attribute with a different type.
    #[must_use]
    #[allow(clippy::panic)]
    pub fn value(&self, track: &Track) -> Value {
        self.try_value(track).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Display form of the attribute on a track.
    #[must_use]
    pub fn render(&self, track: &Track) -> String {
        self.value(track).to_string()
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
