use crate::database::range::{SampleIndex, SampleRange};
use crate::error::SdrfError;
use crate::helpers::string::column_term;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::trace;

/// Errors related to column kinds and sparse column invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColumnError {
    #[error("Invalid column type '{0}'")]
    TypeError(String),

    #[error("Sample {sample} of column '{column}' is covered by more than one modifier")]
    OverlappingModifiers { column: String, sample: SampleIndex },

    #[error("Modifier of column '{column}' repeats the default value '{value}'")]
    RedundantModifier { column: String, value: String },

    #[error("Modifier '{value}' of column '{column}' covers no samples")]
    EmptyModifier { column: String, value: String },
}

/// Editor type tag of a column.
///
/// The data operations never branch on it; it is carried for the editing layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Free text
    #[default]
    Text,
    /// Value picked from a fixed list
    Select,
    /// Ontology term
    Ontology,
    /// Age notation such as `30Y6M`
    Age,
    /// Modification parameters (`NT=...;AC=...`)
    Modification,
    /// Cleavage agent details
    Cleavage,
}

impl ColumnKind {
    /// Returns the string representation of the column kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Select => "select",
            ColumnKind::Ontology => "ontology",
            ColumnKind::Age => "age",
            ColumnKind::Modification => "modification",
            ColumnKind::Cleavage => "cleavage",
        }
    }

    /// Parses a column kind from a string representation.
    /// Supports various aliases for each kind.
    pub fn parse(name: &str) -> Result<Self, SdrfError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "TEXT" | "STRING" | "FREETEXT" => Ok(Self::Text),
            "SELECT" | "ENUM" | "CHOICE" => Ok(Self::Select),
            "ONTOLOGY" | "TERM" => Ok(Self::Ontology),
            "AGE" => Ok(Self::Age),
            "MODIFICATION" | "MOD" => Ok(Self::Modification),
            "CLEAVAGE" | "ENZYME" => Ok(Self::Cleavage),
            _ => Err(ColumnError::TypeError(name.to_string()))?,
        }
    }

    /// Infers the editor kind from an SDRF column header.
    pub fn infer(column_name: &str) -> Self {
        const ONTOLOGY: [&str; 8] = [
            "organism", "organism part", "disease", "cell type",
            "instrument", "ancestry category", "developmental stage", "cell line",
        ];
        const SELECT: [&str; 4] = ["sex", "technology type", "label", "dissociation method"];

        let term = column_term(column_name);
        let term = term.as_str();
        if term == "age" {
            ColumnKind::Age
        } else if term.starts_with("modification parameters") {
            ColumnKind::Modification
        } else if term.starts_with("cleavage agent") {
            ColumnKind::Cleavage
        } else if ONTOLOGY.contains(&term) {
            ColumnKind::Ontology
        } else if SELECT.contains(&term) {
            ColumnKind::Select
        } else {
            ColumnKind::Text
        }
    }
}

/// Section of an SDRF table a column belongs to, in table order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSection {
    SourceName,
    Characteristics,
    Comment,
    FactorValue,
    Special,
}

impl ColumnSection {
    /// Detects the section from a column header.
    pub fn detect(column_name: &str) -> Self {
        let name = column_name.trim().to_lowercase();
        if name == "source name" {
            ColumnSection::SourceName
        } else if name.starts_with("characteristics[") {
            ColumnSection::Characteristics
        } else if name.starts_with("comment[") {
            ColumnSection::Comment
        } else if name.starts_with("factor value[") {
            ColumnSection::FactorValue
        } else {
            ColumnSection::Special
        }
    }
}

/// Ontology hints carried for the term lookup service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OntologyMeta {
    pub ontologies: Vec<String>,
    pub parent_term: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnFlags {
    pub hidden: bool,
    pub read_only: bool,
}

/// Samples in `samples` take `value` instead of the column default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub samples: SampleRange,
    pub value: String,
}

impl Modifier {
    pub fn new(samples: SampleRange, value: &str) -> Self {
        Self {
            samples,
            value: value.to_owned(),
        }
    }
}

/// A sparse column: a default value plus non-overlapping overrides.
///
/// Every sample index is covered by at most one modifier and no modifier
/// repeats the default. All mutators keep both properties; the modifier list is
/// only reachable read-only from outside this module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawColumn")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ColumnKind,
    pub section: ColumnSection,
    /// Default value
    pub value: String,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    #[serde(default)]
    pub column_position: usize,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub ontology: OntologyMeta,
    #[serde(default)]
    pub flags: ColumnFlags,
}

/// Wire form of a [`Column`], checked before it becomes one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawColumn {
    name: String,
    #[serde(rename = "type", default)]
    kind: ColumnKind,
    /// Detected from the name when absent
    #[serde(default)]
    section: Option<ColumnSection>,
    value: String,
    #[serde(default)]
    modifiers: Vec<Modifier>,
    #[serde(default)]
    column_position: usize,
    #[serde(default)]
    is_required: bool,
    #[serde(default)]
    ontology: OntologyMeta,
    #[serde(default)]
    flags: ColumnFlags,
}

impl TryFrom<RawColumn> for Column {
    type Error = ColumnError;

    fn try_from(raw: RawColumn) -> Result<Self, Self::Error> {
        let column = Column {
            section: raw.section.unwrap_or_else(|| ColumnSection::detect(&raw.name)),
            name: raw.name,
            kind: raw.kind,
            value: raw.value,
            modifiers: raw.modifiers,
            column_position: raw.column_position,
            is_required: raw.is_required,
            ontology: raw.ontology,
            flags: raw.flags,
        };
        column.check_invariants()?;
        Ok(column)
    }
}

impl Column {
    /// Creates a column whose samples all take `default`.
    pub fn new(name: &str, default: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: ColumnKind::infer(name),
            section: ColumnSection::detect(name),
            value: default.to_owned(),
            modifiers: Vec::new(),
            column_position: 0,
            is_required: false,
            ontology: OntologyMeta::default(),
            flags: ColumnFlags::default(),
        }
    }

    /// Builds a column from one observed value per sample (sample 1 first).
    ///
    /// The most frequent value becomes the default (ties go to the value seen
    /// first) and every other value gets exactly one modifier, in first-seen order.
    pub fn from_values<S: AsRef<str>>(name: &str, values: &[S]) -> Self {
        let mut buckets = Vec::<(&str, RoaringBitmap)>::new();
        let mut lookup = HashMap::<&str, usize>::new();
        for (offset, value) in values.iter().enumerate() {
            let value = value.as_ref();
            let bucket = *lookup.entry(value).or_insert_with(|| {
                buckets.push((value, RoaringBitmap::new()));
                buckets.len() - 1
            });
            buckets[bucket].1.insert(offset as u32 + 1);
        }

        let mut default = 0;
        for (index, (_, samples)) in buckets.iter().enumerate() {
            if samples.len() > buckets[default].1.len() {
                default = index;
            }
        }

        let mut column = Column::new(name, buckets.get(default).map_or("", |(value, _)| *value));
        column.modifiers = buckets
            .into_iter()
            .enumerate()
            .filter(|(index, _)| *index != default)
            .map(|(_, (value, samples))| Modifier::new(SampleRange::from_bitmap(samples), value))
            .collect();
        column.debug_check();
        column
    }

    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    pub fn with_ontology(mut self, ontology: OntologyMeta) -> Self {
        self.ontology = ontology;
        self
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Effective value of a sample.
    pub fn get_value(&self, sample: SampleIndex) -> &str {
        self.modifiers
            .iter()
            .find(|modifier| modifier.samples.contains(sample))
            .map_or(self.value.as_str(), |modifier| modifier.value.as_str())
    }

    /// Writes one sample. Returns false when nothing changed (same value or sample 0).
    pub fn set_value(&mut self, sample: SampleIndex, new_value: &str) -> bool {
        if sample == 0 || self.get_value(sample) == new_value {
            return false;
        }
        for modifier in &mut self.modifiers {
            modifier.samples.remove(sample);
        }
        self.modifiers.retain(|modifier| !modifier.samples.is_empty());

        if new_value != self.value {
            match self.modifiers.iter_mut().find(|modifier| modifier.value == new_value) {
                Some(modifier) => {
                    modifier.samples.insert(sample);
                }
                None => self.modifiers.push(Modifier::new(SampleRange::single(sample), new_value)),
            }
        }
        trace!(column = %self.name, sample, value = new_value, "set value");
        self.debug_check();
        true
    }

    /// Writes many samples in one re-partition.
    ///
    /// Every other modifier loses the touched samples, then the touched samples
    /// join the bucket of `new_value` (or fall back to the default). The result
    /// does not depend on the order of `samples`. Returns the number of distinct
    /// samples written.
    pub fn set_values_bulk<I>(&mut self, samples: I, new_value: &str) -> u64
    where
        I: IntoIterator<Item = SampleIndex>,
    {
        let touched: RoaringBitmap = samples.into_iter().filter(|&sample| sample > 0).collect();
        if touched.is_empty() {
            return 0;
        }
        for modifier in &mut self.modifiers {
            if modifier.value != new_value {
                modifier.samples.subtract(&touched);
            }
        }
        self.modifiers.retain(|modifier| !modifier.samples.is_empty());

        if new_value != self.value {
            match self.modifiers.iter_mut().find(|modifier| modifier.value == new_value) {
                Some(modifier) => modifier.samples.union_with(&touched),
                None => self.modifiers.push(Modifier::new(SampleRange::from_bitmap(touched.clone()), new_value)),
            }
        }
        self.debug_check();
        touched.len()
    }

    /// All samples in `[1, sample_count]` whose effective value equals `value`.
    pub fn find_samples_with_value(&self, value: &str, sample_count: u32) -> Vec<SampleIndex> {
        let mut window = RoaringBitmap::new();
        window.insert_range(1..=sample_count);

        let mut covered = RoaringBitmap::new();
        let mut matches = RoaringBitmap::new();
        for modifier in &self.modifiers {
            covered |= modifier.samples.bitmap();
            if modifier.value == value {
                matches |= modifier.samples.bitmap();
            }
        }
        if self.value == value {
            matches |= &window - &covered;
        }
        matches &= &window;
        matches.iter().collect()
    }

    /// Replaces the default value without changing any sample's effective value.
    pub fn set_default(&mut self, new_default: &str, sample_count: u32) {
        if self.value == new_default {
            return;
        }
        let mut uncovered = RoaringBitmap::new();
        uncovered.insert_range(1..=sample_count);
        for modifier in &self.modifiers {
            uncovered -= modifier.samples.bitmap();
        }
        self.modifiers.retain(|modifier| modifier.value != new_default);
        let old_default = std::mem::replace(&mut self.value, new_default.to_owned());
        if !uncovered.is_empty() {
            self.modifiers.push(Modifier::new(SampleRange::from_bitmap(uncovered), &old_default));
        }
        self.debug_check();
    }

    /// Shifts every modifier for a row inserted at `position`.
    ///
    /// A column that already had modifiers gives the new row an explicit
    /// `initial` value; a uniform column lets it inherit the default.
    pub fn insert_sample(&mut self, position: SampleIndex, initial: &str) {
        let had_modifiers = !self.modifiers.is_empty();
        for modifier in &mut self.modifiers {
            modifier.samples.shift_up_from(position);
        }
        if had_modifiers {
            self.set_value(position, initial);
        }
        self.debug_check();
    }

    /// Removes deleted rows from every modifier and closes the gaps.
    /// `deleted` must be ascending and deduplicated.
    pub fn delete_samples(&mut self, deleted: &[SampleIndex]) {
        if deleted.is_empty() {
            return;
        }
        let deleted_set: RoaringBitmap = deleted.iter().copied().collect();
        self.modifiers.retain(|modifier| !modifier.samples.is_subset_of(&deleted_set));
        for modifier in &mut self.modifiers {
            modifier.samples.compact_removed(deleted);
        }
        self.modifiers.retain(|modifier| !modifier.samples.is_empty());
        self.debug_check();
    }

    /// Value → sample count over `[1, sample_count]`, built from the modifiers only.
    pub fn value_counts(&self, sample_count: u32) -> BTreeMap<&str, u64> {
        let mut counts = BTreeMap::<&str, u64>::new();
        let mut remaining = u64::from(sample_count);
        for modifier in &self.modifiers {
            let count = modifier.samples.count_within(sample_count);
            if count > 0 {
                *counts.entry(modifier.value.as_str()).or_default() += count;
                remaining = remaining.saturating_sub(count);
            }
        }
        if remaining > 0 {
            *counts.entry(self.value.as_str()).or_default() += remaining;
        }
        counts
    }

    /// Verifies the sparse invariants: no empty or redundant modifier, no overlap.
    pub fn check_invariants(&self) -> Result<(), ColumnError> {
        let mut covered = RoaringBitmap::new();
        for modifier in &self.modifiers {
            if modifier.samples.is_empty() {
                return Err(ColumnError::EmptyModifier {
                    column: self.name.to_owned(),
                    value: modifier.value.to_owned(),
                });
            }
            if modifier.value == self.value {
                return Err(ColumnError::RedundantModifier {
                    column: self.name.to_owned(),
                    value: modifier.value.to_owned(),
                });
            }
            if let Some(sample) = (&covered & modifier.samples.bitmap()).min() {
                return Err(ColumnError::OverlappingModifiers {
                    column: self.name.to_owned(),
                    sample,
                });
            }
            covered |= modifier.samples.bitmap();
        }
        Ok(())
    }

    #[inline]
    fn debug_check(&self) {
        #[cfg(debug_assertions)]
        if let Err(error) = self.check_invariants() {
            panic!("sparse column invariant violated: {}", error);
        }
    }
}
