//! Sample range codec.
//!
//! Sets of 1-based sample indices travel as compact range strings such as
//! `1-3,5,7-10`. Runs of three or more consecutive indices are written as
//! `start-end`; runs of one or two are written as singletons, so `{4, 5}`
//! encodes as `4,5` and never as `4-5`. Decoding accepts both forms.
//!
//! Internally every decoded set is a [`RoaringBitmap`], and the set algebra
//! (union, difference, intersection) runs on bitmaps before being re-encoded.
use regex::Regex;
use roaring::RoaringBitmap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// A 1-based sample (row) index. Zero is never a valid sample.
pub type SampleIndex = u32;

/// Errors raised by the strict selection parser for user-typed ranges.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangeError {
    #[error("Invalid range format '{0}'")]
    FormatError(String),

    #[error("Empty sample selection")]
    EmptySelection,

    #[error("Sample index must start at 1 in '{0}'")]
    ZeroIndex(String),

    #[error("Inverted range '{0}': start is greater than end")]
    InvertedRange(String),

    #[error("Range '{token}' is out of bounds (1-{sample_count})")]
    OutOfBounds { token: String, sample_count: u32 },
}

/// Encodes sample indices into a normalized range string.
/// Input order and duplicates are irrelevant.
pub fn encode<I>(indices: I) -> String
where
    I: IntoIterator<Item = SampleIndex>,
{
    encode_bitmap(&indices.into_iter().collect())
}

/// Encodes a bitmap into a normalized range string.
pub fn encode_bitmap(bitmap: &RoaringBitmap) -> String {
    let mut parts = Vec::<String>::new();
    let mut run: Option<(u32, u32)> = None;
    for index in bitmap.iter() {
        run = match run {
            Some((start, end)) if end.checked_add(1) == Some(index) => Some((start, index)),
            Some((start, end)) => {
                push_run(&mut parts, start, end);
                Some((index, index))
            }
            None => Some((index, index)),
        };
    }
    if let Some((start, end)) = run {
        push_run(&mut parts, start, end);
    }
    parts.join(",")
}

fn push_run(parts: &mut Vec<String>, start: u32, end: u32) {
    match end - start {
        0 => parts.push(start.to_string()),
        1 => {
            parts.push(start.to_string());
            parts.push(end.to_string());
        }
        _ => parts.push(format!("{}-{}", start, end)),
    }
}

/// Parses one comma-separated part into inclusive bounds.
/// Non-numeric, zero and inverted parts yield None.
fn parse_part(part: &str) -> Option<(u32, u32)> {
    let part = part.trim();
    let (start, end) = match part.split_once('-') {
        Some((start, end)) => (start.trim().parse::<u32>().ok()?, end.trim().parse::<u32>().ok()?),
        None => {
            let index = part.parse::<u32>().ok()?;
            (index, index)
        }
    };
    (start > 0 && start <= end).then_some((start, end))
}

/// Decodes a range string into a bitmap, skipping malformed parts.
pub fn decode_bitmap(range: &str) -> RoaringBitmap {
    let mut bitmap = RoaringBitmap::new();
    for (start, end) in range.split(',').filter_map(parse_part) {
        bitmap.insert_range(start..=end);
    }
    bitmap
}

/// Decodes a range string into ascending, deduplicated sample indices.
pub fn decode(range: &str) -> Vec<SampleIndex> {
    decode_bitmap(range).iter().collect()
}

/// Returns true if the index falls in any part of the range string.
pub fn contains(index: SampleIndex, range: &str) -> bool {
    range
        .split(',')
        .filter_map(parse_part)
        .any(|(start, end)| start <= index && index <= end)
}

/// Union of several range strings.
pub fn union<S: AsRef<str>>(ranges: &[S]) -> String {
    let mut bitmap = RoaringBitmap::new();
    for range in ranges {
        bitmap |= decode_bitmap(range.as_ref());
    }
    encode_bitmap(&bitmap)
}

/// Indices of `base` that are not in `subtract`.
pub fn difference(base: &str, subtract: &str) -> String {
    encode_bitmap(&(decode_bitmap(base) - decode_bitmap(subtract)))
}

/// Indices present in both range strings.
pub fn intersect(a: &str, b: &str) -> String {
    encode_bitmap(&(decode_bitmap(a) & decode_bitmap(b)))
}

/// Parses a user-typed sample selection such as `1-3, 7, 9-12`.
///
/// Unlike [`decode`], every token is validated against `sample_count` and the
/// first offending token is reported. Blank tokens (e.g. a trailing comma) are
/// ignored. Returns sorted, deduplicated indices.
pub fn parse_selection(text: &str, sample_count: u32) -> Result<Vec<SampleIndex>, RangeError> {
    let pattern = Regex::new(r"^(\d+)(?:\s*-\s*(\d+))?$").expect("Hardcode regex pattern");
    let mut bitmap = RoaringBitmap::new();
    for token in text.split(',').map(str::trim).filter(|token| !token.is_empty()) {
        let captures = pattern
            .captures(token)
            .ok_or_else(|| RangeError::FormatError(token.to_owned()))?;
        let out_of_bounds = || RangeError::OutOfBounds {
            token: token.to_owned(),
            sample_count,
        };
        let start = captures[1].parse::<u32>().map_err(|_| out_of_bounds())?;
        let end = match captures.get(2) {
            Some(matcher) => matcher.as_str().parse::<u32>().map_err(|_| out_of_bounds())?,
            None => start,
        };
        if start == 0 {
            return Err(RangeError::ZeroIndex(token.to_owned()));
        }
        if start > end {
            return Err(RangeError::InvertedRange(token.to_owned()));
        }
        if end > sample_count {
            return Err(out_of_bounds());
        }
        bitmap.insert_range(start..=end);
    }
    if bitmap.is_empty() {
        return Err(RangeError::EmptySelection);
    }
    Ok(bitmap.iter().collect())
}

/// The sample set of a modifier: a bitmap that reads and writes as a range string.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleRange {
    bitmap: RoaringBitmap,
}

impl SampleRange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bitmap(bitmap: RoaringBitmap) -> Self {
        Self { bitmap }
    }

    pub fn single(index: SampleIndex) -> Self {
        let mut range = Self::new();
        range.insert(index);
        range
    }

    pub fn bitmap(&self) -> &RoaringBitmap {
        &self.bitmap
    }

    #[inline]
    pub fn contains(&self, index: SampleIndex) -> bool {
        self.bitmap.contains(index)
    }

    pub fn len(&self) -> u64 {
        self.bitmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitmap.is_empty()
    }

    pub fn insert(&mut self, index: SampleIndex) -> bool {
        self.bitmap.insert(index)
    }

    pub fn remove(&mut self, index: SampleIndex) -> bool {
        self.bitmap.remove(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = SampleIndex> + '_ {
        self.bitmap.iter()
    }

    pub fn union_with(&mut self, other: &RoaringBitmap) {
        self.bitmap |= other;
    }

    pub fn subtract(&mut self, other: &RoaringBitmap) {
        self.bitmap -= other;
    }

    pub fn is_subset_of(&self, other: &RoaringBitmap) -> bool {
        self.bitmap.is_subset(other)
    }

    /// Number of covered samples within `[1, sample_count]`.
    pub fn count_within(&self, sample_count: u32) -> u64 {
        let mut window = RoaringBitmap::new();
        window.insert_range(1..=sample_count);
        self.bitmap.intersection_len(&window)
    }

    /// Makes room for a row inserted at `position`: indices at or beyond it move up by one.
    pub fn shift_up_from(&mut self, position: SampleIndex) {
        if self.bitmap.max().map_or(true, |max| max < position) {
            return;
        }
        self.bitmap = self
            .bitmap
            .iter()
            .map(|index| if index >= position { index.saturating_add(1) } else { index })
            .collect();
    }

    /// Removes deleted rows and closes the gaps they leave.
    ///
    /// `deleted` must be ascending and deduplicated. Every surviving index moves
    /// down by the number of deleted indices below it, which equals applying the
    /// single-row deletion once per deleted index from the highest downwards.
    pub fn compact_removed(&mut self, deleted: &[SampleIndex]) {
        if deleted.is_empty() {
            return;
        }
        let mut compacted = RoaringBitmap::new();
        let mut below = 0usize;
        for index in self.bitmap.iter() {
            while below < deleted.len() && deleted[below] < index {
                below += 1;
            }
            if below < deleted.len() && deleted[below] == index {
                continue;
            }
            compacted.insert(index - below as u32);
        }
        self.bitmap = compacted;
    }
}

impl FromIterator<SampleIndex> for SampleRange {
    fn from_iter<T: IntoIterator<Item = SampleIndex>>(iter: T) -> Self {
        Self::from_bitmap(iter.into_iter().collect())
    }
}

impl Display for SampleRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode_bitmap(&self.bitmap))
    }
}

impl FromStr for SampleRange {
    type Err = Infallible;

    /// Lenient decode: malformed parts are skipped.
    fn from_str(range: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_bitmap(decode_bitmap(range)))
    }
}

impl From<&str> for SampleRange {
    fn from(range: &str) -> Self {
        Self::from_bitmap(decode_bitmap(range))
    }
}

impl Serialize for SampleRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SampleRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let range = String::deserialize(deserializer)?;
        Ok(Self::from(range.as_str()))
    }
}
