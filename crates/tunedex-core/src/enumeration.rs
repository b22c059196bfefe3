//! Removal of enumeration prefixes from track names.
//!
//! Movements of a classical work are often titled `"I. Allegro"`,
//! `"II. Adagio"`, ... and albums ripped from CDs often carry `"01 Intro"`,
//! `"02 ..."`. Both passes here strip such prefixes, but only when every
//! track of the list (or of the disc) follows the pattern, so a title that
//! merely starts with a number is left alone.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::{Error, Result};
use crate::group::{Group, Leaf};
use crate::track::{Track, Value, field};

/// Group field holding the detected list style.
pub const LIST_STYLE_FIELD: &str = "ListStyle";

/// Lead-ins removed before the numeral token (matched case-insensitively).
const WORD_PREFIXES: &[&str] = &["No."];

/// Separators removed after the numeral token.
const WORD_SUFFIXES: &[&str] = &["-"];

/// Characters trimmed from the end of the numeral token.
const FIELD_SUFFIXES: &[char] = &['.', ':', '-'];

/// A numeral notation that can be recognised in a name prefix.
pub trait NumeralParser: Send + Sync {
    /// Style tag attached to groups using this notation.
    fn style(&self) -> &str;

    /// Parse a token into its value.
    fn parse(&self, token: &str) -> Result<u32>;
}

/// Plain decimal numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decimal;

impl NumeralParser for Decimal {
    fn style(&self) -> &str {
        "decimal"
    }

    fn parse(&self, token: &str) -> Result<u32> {
        token.parse().map_err(|_| Error::InvalidNumeral {
            token: token.to_string(),
            style: self.style().to_string(),
        })
    }
}

/// Roman numerals in canonical subtractive form, 1 to 3999.
///
/// Input is upper-cased before parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperRoman;

const ROMAN_VALUES: &[(u32, &str)] = &[
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

impl UpperRoman {
    /// Canonical roman form of `n`.
    #[must_use]
    pub fn format(mut n: u32) -> String {
        let mut out = String::new();
        for &(value, symbol) in ROMAN_VALUES {
            while n >= value {
                out.push_str(symbol);
                n -= value;
            }
        }
        out
    }
}

impl NumeralParser for UpperRoman {
    fn style(&self) -> &str {
        "upper-roman"
    }

    fn parse(&self, token: &str) -> Result<u32> {
        let invalid = || Error::InvalidNumeral {
            token: token.to_string(),
            style: self.style().to_string(),
        };

        let upper = token.to_ascii_uppercase();
        let mut rest = upper.as_str();
        let mut total: u32 = 0;
        for &(value, symbol) in ROMAN_VALUES {
            while let Some(tail) = rest.strip_prefix(symbol) {
                total = total.saturating_add(value);
                rest = tail;
            }
        }
        // Greedy parsing accepts forms like "IIII" or "IM"; only the
        // canonical spelling of the parsed value is a valid numeral.
        if total == 0 || !rest.is_empty() || Self::format(total) != upper {
            return Err(invalid());
        }
        Ok(total)
    }
}

/// Numeral parsers tried by default, in priority order.
#[must_use]
pub fn default_parsers() -> [&'static dyn NumeralParser; 2] {
    [&Decimal, &UpperRoman]
}

/// Remove at most one of `prefixes` (case-insensitive) from the start of `s`,
/// along with following whitespace. Returns the rest and the bytes consumed.
fn trim_prefix<'a>(s: &'a str, prefixes: &[&str]) -> (&'a str, usize) {
    for prefix in prefixes {
        if s.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        {
            let rest = s[prefix.len()..].trim_start();
            return (rest, s.len() - rest.len());
        }
    }
    (s, 0)
}

/// Split a name into its candidate numeral token and the byte length of the
/// prefix to remove. A name consisting only of the token yields the whole
/// name and a zero length.
fn enum_prefix(s: &str) -> (&str, usize) {
    let (x, mut consumed) = trim_prefix(s, WORD_PREFIXES);
    let mut words = x.splitn(2, ' ');
    let word = words.next().unwrap_or_default();
    if let Some(rest) = words.next() {
        consumed += trim_prefix(rest, WORD_SUFFIXES).1;
    }
    consumed += word.len();

    if consumed == s.len() {
        return (s, 0);
    }
    (word.trim_end_matches(FIELD_SUFFIXES), consumed)
}

/// `track` with `field_name` reporting its value minus the first `len` bytes.
fn strip_track(track: &Track, field_name: &str, len: usize) -> Track {
    let value = track.string(field_name);
    let stripped = value.get(len..).unwrap_or(value).trim_start();
    let mut overrides = BTreeMap::new();
    overrides.insert(field_name.to_string(), Value::from(stripped));
    track.overlay(overrides)
}

/// Strip a running enumeration from `field_name` of every track.
///
/// The first track's prefix picks the notation (first parser in `parsers`
/// that accepts it); every following track must carry the next number in
/// that notation. Returns the new tracks and the style, or `None` with the
/// tracks untouched when any track breaks the sequence.
pub fn trim_enum_prefix_tracks(
    field_name: &str,
    tracks: &[Track],
    parsers: &[&dyn NumeralParser],
) -> Option<(Vec<Track>, String)> {
    let (first, rest) = tracks.split_first()?;

    let (token, first_len) = enum_prefix(first.string(field_name));
    let (parser, mut counter) = parsers
        .iter()
        .find_map(|parser| parser.parse(token).ok().map(|n| (*parser, n)))?;

    let mut lengths = Vec::with_capacity(tracks.len());
    lengths.push(first_len);
    for track in rest {
        let (token, len) = enum_prefix(track.string(field_name));
        match parser.parse(token) {
            Ok(n) if counter.checked_add(1) == Some(n) => counter = n,
            _ => return None,
        }
        lengths.push(len);
    }

    let trimmed = tracks
        .iter()
        .zip(lengths)
        .map(|(track, len)| strip_track(track, field_name, len))
        .collect();
    Some((trimmed, parser.style().to_string()))
}

/// Strip track-number prefixes from `field_name`, disc by disc.
///
/// A track's prefix is removed only when it parses as a decimal equal to the
/// track's own `track_num_field`. Tracks are bucketed by `disc_num_field`;
/// each bucket is trimmed entirely or not at all, and buckets are returned in
/// ascending disc order.
pub fn trim_track_num_prefix_tracks(
    field_name: &str,
    track_num_field: &str,
    disc_num_field: &str,
    tracks: &[Track],
) -> Vec<Track> {
    let mut discs: Vec<i64> = Vec::new();
    let mut by_disc: HashMap<i64, Vec<&Track>> = HashMap::new();
    for track in tracks {
        let disc = track.int(disc_num_field);
        by_disc
            .entry(disc)
            .or_insert_with(|| {
                discs.push(disc);
                Vec::new()
            })
            .push(track);
    }
    discs.sort_unstable();

    let mut result = Vec::with_capacity(tracks.len());
    for disc in discs {
        let bucket = by_disc.remove(&disc).unwrap_or_default();
        let lengths: Option<Vec<usize>> = bucket
            .iter()
            .map(|track| {
                let (token, len) = enum_prefix(track.string(field_name));
                let n = Decimal.parse(token).ok()?;
                (i64::from(n) == track.int(track_num_field)).then_some(len)
            })
            .collect();

        match lengths {
            Some(lengths) => result.extend(
                bucket
                    .iter()
                    .zip(lengths)
                    .map(|(track, len)| strip_track(track, field_name, len)),
            ),
            None => {
                debug!("Disc {}: track numbers do not match name prefixes", disc);
                result.extend(bucket.into_iter().cloned());
            }
        }
    }
    result
}

/// Strip a running enumeration from track names, tagging the group with the
/// detected style under [`LIST_STYLE_FIELD`].
#[must_use]
pub fn trim_enum_prefix(leaf: &Leaf) -> Group {
    trim_enum_prefix_with(leaf, field::NAME, &default_parsers())
}

/// [`trim_enum_prefix`] with an explicit field and parser list.
#[must_use]
pub fn trim_enum_prefix_with(
    leaf: &Leaf,
    field_name: &str,
    parsers: &[&dyn NumeralParser],
) -> Group {
    match trim_enum_prefix_tracks(field_name, leaf.tracks(), parsers) {
        Some((tracks, style)) => {
            debug!("Group '{}': trimmed {} enumeration", leaf.name(), style);
            let mut fields = BTreeMap::new();
            fields.insert(LIST_STYLE_FIELD.to_string(), Value::String(style));
            Group::from(leaf.derive(tracks, fields))
        }
        None => Group::from(leaf.derive(leaf.tracks().to_vec(), BTreeMap::new())),
    }
}

/// Strip track-number prefixes from track names, disc by disc.
#[must_use]
pub fn trim_track_num_prefix(leaf: &Leaf) -> Group {
    let tracks = trim_track_num_prefix_tracks(
        field::NAME,
        field::TRACK_NUMBER,
        field::DISC_NUMBER,
        leaf.tracks(),
    );
    Group::from(leaf.derive(tracks, BTreeMap::new()))
}
