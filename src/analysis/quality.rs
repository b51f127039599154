//! # Column Quality Analysis
//!
//! Scores each column from its value distribution, computed straight from the
//! sparse representation: the default bucket starts with every sample and each
//! modifier moves its covered samples into its own bucket. No per-sample array
//! is ever built, so analysis cost grows with the number of modifiers, not rows.
//!
//! The output is advisory. Nothing in the crate acts on a recommendation.
use crate::analysis::criteria::QualityCriteria;
use crate::database::column::Column;
use crate::database::table::SparseTable;
use crate::helpers::string::{is_blank, is_token, normalize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Recommended handling of a column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityAction {
    Keep,
    Review,
    Remove,
}

impl QualityAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            QualityAction::Keep => "keep",
            QualityAction::Review => "review",
            QualityAction::Remove => "remove",
        }
    }
}

/// Quality metrics and recommendation for one column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnQuality {
    pub column_name: String,
    pub column_index: usize,
    pub is_required: bool,
    pub distinct_values: usize,
    /// Shannon entropy in bits; 0 when every sample shares one value
    pub entropy: f64,
    pub is_redundant: bool,
    pub is_effectively_empty: bool,
    pub has_inconsistent_case: bool,
    pub has_inconsistent_nulls: bool,
    pub has_wrong_reserved_words: bool,
    pub action: QualityAction,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitySummary {
    pub total_columns: usize,
    pub keep: usize,
    pub review: usize,
    pub remove: usize,
    pub removable_columns: Vec<String>,
    /// Share of columns needing no action, 0-100
    pub score: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub columns: Vec<ColumnQuality>,
    pub summary: QualitySummary,
}

/// Shannon entropy (bits) of a count distribution.
pub fn entropy<I: IntoIterator<Item = u64>>(counts: I) -> f64 {
    let counts: Vec<u64> = counts.into_iter().filter(|&count| count > 0).collect();
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let mut entropy = 0.0;
    for count in counts {
        let p = count as f64 / total as f64;
        entropy -= p * p.log2();
    }
    entropy
}

/// Consistency findings with the text that explains them.
#[derive(Default)]
struct Findings {
    reasons: Vec<String>,
    fixes: Vec<String>,
}

fn quote(values: &[&str]) -> String {
    values.iter().map(|value| format!("'{}'", value)).collect::<Vec<_>>().join(", ")
}

/// Groups of distinct values that only differ by letter case, with the most frequent spelling first.
fn case_variants<'a>(counts: &BTreeMap<&'a str, u64>) -> Vec<Vec<&'a str>> {
    let mut groups = BTreeMap::<String, Vec<&'a str>>::new();
    for &value in counts.keys() {
        groups.entry(value.to_lowercase()).or_default().push(value);
    }
    groups
        .into_values()
        .filter(|variants| variants.len() > 1)
        .map(|mut variants| {
            variants.sort_by(|a, b| counts[b].cmp(&counts[a]).then(a.cmp(b)));
            variants
        })
        .collect()
}

/// Analyzes one column of a table with `sample_count` rows.
pub fn analyze_column(column: &Column, column_index: usize, sample_count: u32, criteria: &QualityCriteria) -> ColumnQuality {
    let counts = column.value_counts(sample_count);
    let distinct_values = counts.len();
    let entropy = entropy(counts.values().copied());

    let is_standard_null = |value: &str| is_token(value, &criteria.standard_nulls);
    let is_non_standard_null = |value: &str| is_token(value, &criteria.non_standard_nulls);
    let is_null_like = |value: &str| is_blank(value) || is_standard_null(value) || is_non_standard_null(value);

    let is_redundant = distinct_values == 1;
    let is_effectively_empty = distinct_values > 0 && counts.keys().all(|&value| is_null_like(value));

    let mut findings = Findings::default();

    let variants = case_variants(&counts);
    let has_inconsistent_case = !variants.is_empty();
    for group in &variants {
        findings.reasons.push(format!("Values differ only by letter case: {}", quote(group)));
        findings.fixes.push(format!("Use '{}' for {}", group[0], quote(&group[1..])));
    }

    // Null variants by normalized spelling; a blank cell is a non-standard variant.
    let mut standard = Vec::<String>::new();
    let mut non_standard = Vec::<String>::new();
    let mut non_standard_values = Vec::<&str>::new();
    for &value in counts.keys() {
        let variants = if is_standard_null(value) {
            &mut standard
        } else if is_blank(value) {
            &mut non_standard
        } else if is_non_standard_null(value) {
            non_standard_values.push(value);
            &mut non_standard
        } else {
            continue;
        };
        let value = normalize(value);
        if !variants.contains(&value) {
            variants.push(value);
        }
    }
    let null_variants = standard.len() + non_standard.len();
    let has_inconsistent_nulls = (!standard.is_empty() && !non_standard.is_empty()) || null_variants > 1;
    let preferred_null = criteria.standard_nulls.first().map_or("not available", String::as_str);
    if has_inconsistent_nulls {
        let variants: Vec<&str> = standard.iter().chain(&non_standard).map(String::as_str).collect();
        findings.reasons.push(format!("Mixed null representations: {}", quote(&variants)));
        findings.fixes.push(format!("Use one null value such as '{}'", preferred_null));
    }

    let mut has_wrong_reserved_words = false;
    if criteria.is_disease_column(&column.name) {
        for value in counts.keys().filter(|value| is_token(value, &criteria.disease_reserved_words)) {
            has_wrong_reserved_words = true;
            findings.reasons.push(format!("Disease column uses '{}' instead of '{}'", value, criteria.disease_replacement));
            findings.fixes.push(format!("Replace '{}' with '{}'", value, criteria.disease_replacement));
        }
    }
    for value in &non_standard_values {
        has_wrong_reserved_words = true;
        findings.reasons.push(format!("Non-standard null value '{}'", value));
        findings.fixes.push(format!("Replace '{}' with '{}'", value, preferred_null));
    }

    let (action, reason, suggested_fix) = if is_effectively_empty && !column.is_required {
        (QualityAction::Remove, "All values are empty or null-like".to_owned(), None)
    } else if is_redundant && !column.is_required && !criteria.is_uniform_expected(&column.name) {
        let value = counts.keys().next().copied().unwrap_or_default();
        (QualityAction::Review, format!("All samples share the single value '{}'", value), None)
    } else if is_effectively_empty {
        (QualityAction::Review, "Required column has no informative values".to_owned(), None)
    } else if !findings.reasons.is_empty() {
        (QualityAction::Review, findings.reasons.join("; "), Some(findings.fixes.join("; ")))
    } else if !column.is_required
        && distinct_values > 1
        && distinct_values <= criteria.low_entropy_max_values
        && entropy < criteria.low_entropy_threshold
    {
        (QualityAction::Review, format!("Very low information content (entropy {:.2})", entropy), None)
    } else {
        (QualityAction::Keep, "Column carries sample information".to_owned(), None)
    };

    ColumnQuality {
        column_name: column.name.to_owned(),
        column_index,
        is_required: column.is_required,
        distinct_values,
        entropy,
        is_redundant,
        is_effectively_empty,
        has_inconsistent_case,
        has_inconsistent_nulls,
        has_wrong_reserved_words,
        action,
        reason,
        suggested_fix,
    }
}

/// Analyzes every column and summarizes the recommendations.
pub fn analyze_table(table: &SparseTable, criteria: &QualityCriteria) -> QualityReport {
    let columns: Vec<ColumnQuality> = table
        .columns()
        .enumerate()
        .map(|(index, column)| analyze_column(column, index, table.sample_count(), criteria))
        .collect();

    let count = |action: QualityAction| columns.iter().filter(|quality| quality.action == action).count();
    let keep = count(QualityAction::Keep);
    let summary = QualitySummary {
        total_columns: columns.len(),
        keep,
        review: count(QualityAction::Review),
        remove: count(QualityAction::Remove),
        removable_columns: columns
            .iter()
            .filter(|quality| quality.action == QualityAction::Remove)
            .map(|quality| quality.column_name.to_owned())
            .collect(),
        score: if columns.is_empty() {
            100.0
        } else {
            keep as f64 * 100.0 / columns.len() as f64
        },
    };
    debug!(
        columns = summary.total_columns,
        keep = summary.keep,
        review = summary.review,
        remove = summary.remove,
        "analyzed column quality"
    );
    QualityReport { columns, summary }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(name: &str, values: &[&str]) -> ColumnQuality {
        let criteria = QualityCriteria::default();
        let column = Column::from_values(name, values).with_required(criteria.is_required(name));
        analyze_column(&column, 0, values.len() as u32, &criteria)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(entropy(vec![10]), 0.0);
        assert_eq!(entropy(Vec::new()), 0.0);
        assert_close(entropy(vec![5, 5]), 1.0);
        assert_close(entropy(vec![3, 3, 3, 3]), 2.0);
        assert_close(entropy(vec![2, 2, 2, 0]), 3f64.log2());
    }

    #[test]
    fn test_entropy_bounds_from_column() {
        let redundant = analyze("characteristics[age]", &["30Y", "30Y", "30Y"]);
        assert!(redundant.is_redundant);
        assert_eq!(redundant.entropy, 0.0);

        let values: Vec<&str> = ["a", "b", "c", "d", "e"].iter().cycle().take(20).copied().collect();
        let uniform = analyze("characteristics[age]", &values);
        assert!(!uniform.is_redundant);
        assert_close(uniform.entropy, 5f64.log2());
    }

    #[test]
    fn test_value_counts_follow_modifiers() {
        let mut column = Column::new("characteristics[age]", "30Y");
        column.set_values_bulk(1..=500, "40Y");
        column.set_value(1000, "50Y");
        let quality = analyze_column(&column, 3, 1000, &QualityCriteria::default());
        assert_eq!(quality.distinct_values, 3);
        assert_eq!(quality.column_index, 3);
        let expected = entropy(vec![500, 499, 1]);
        assert_close(quality.entropy, expected);
    }

    #[test]
    fn test_all_not_available_is_removed() {
        let quality = analyze("characteristics[cell line]", &["not available"; 12]);
        assert_eq!(quality.action, QualityAction::Remove);
        assert!(quality.is_effectively_empty);
        assert!(quality.is_redundant);
    }

    #[test]
    fn test_required_empty_column_is_reviewed() {
        let quality = analyze("characteristics[cell type]", &["not available", "", "not available"]);
        assert!(quality.is_effectively_empty);
        assert_eq!(quality.action, QualityAction::Review);
        assert_eq!(quality.reason, "Required column has no informative values");
    }

    #[test]
    fn test_redundant_column() {
        let quality = analyze("characteristics[age]", &["30Y"; 4]);
        assert_eq!(quality.action, QualityAction::Review);
        assert!(quality.reason.contains("'30Y'"));

        let allowed = analyze("comment[proteomics data acquisition method]", &["DDA"; 4]);
        assert_eq!(allowed.action, QualityAction::Keep);

        let required = analyze("characteristics[organism]", &["homo sapiens"; 4]);
        assert_eq!(required.action, QualityAction::Keep);
    }

    #[test]
    fn test_inconsistent_case() {
        let quality = analyze("characteristics[organism part]", &["Liver", "liver", "liver", "kidney"]);
        assert!(quality.has_inconsistent_case);
        assert_eq!(quality.action, QualityAction::Review);
        assert_eq!(quality.suggested_fix.as_deref(), Some("Use 'liver' for 'Liver'"));
    }

    #[test]
    fn test_inconsistent_nulls() {
        let quality = analyze("characteristics[age]", &["30Y", "not available", "NA", "40Y"]);
        assert!(quality.has_inconsistent_nulls);
        assert!(quality.has_wrong_reserved_words);
        assert_eq!(quality.action, QualityAction::Review);
        assert!(quality.suggested_fix.unwrap().contains("Replace 'NA' with 'not available'"));

        let variants = analyze("characteristics[age]", &["30Y", "not available", "not applicable"]);
        assert!(variants.has_inconsistent_nulls);
        assert!(!variants.has_wrong_reserved_words);

        let single = analyze("characteristics[age]", &["30Y", "not available", "Not Available"]);
        assert!(!single.has_inconsistent_nulls);
        assert!(single.has_inconsistent_case);
    }

    #[test]
    fn test_blank_is_a_null_variant() {
        let quality = analyze("characteristics[age]", &["30Y", "not available", "", "40Y"]);
        assert!(quality.has_inconsistent_nulls);
        assert!(!quality.has_wrong_reserved_words);
        assert_eq!(quality.action, QualityAction::Review);
        assert!(quality.reason.starts_with("Mixed null representations: 'not available', ''"));

        let blank_only = analyze("characteristics[age]", &["30Y", "", "40Y"]);
        assert!(!blank_only.has_inconsistent_nulls);
    }

    #[test]
    fn test_non_standard_nulls_compare_normalized() {
        let quality = analyze("characteristics[age]", &["30Y", "NA", "na", "40Y"]);
        assert!(!quality.has_inconsistent_nulls);
        assert!(quality.has_inconsistent_case);
        assert!(quality.has_wrong_reserved_words);

        let mixed = analyze("characteristics[age]", &["30Y", "NA", "n/a"]);
        assert!(mixed.has_inconsistent_nulls);
    }

    #[test]
    fn test_zero_samples_is_not_empty() {
        let criteria = QualityCriteria::default();
        let column = Column::new("characteristics[age]", "30Y");
        let quality = analyze_column(&column, 0, 0, &criteria);
        assert_eq!(quality.distinct_values, 0);
        assert!(!quality.is_effectively_empty);
        assert!(!quality.is_redundant);
        assert_eq!(quality.action, QualityAction::Keep);

        let mut table = SparseTable::new(0);
        table.insert_column(Column::new("characteristics[cell line]", "not available"));
        let report = analyze_table(&table, &criteria);
        assert_eq!(report.summary.remove, 0);
        assert_eq!(report.summary.keep, 1);
    }

    #[test]
    fn test_disease_reserved_words() {
        let quality = analyze("characteristics[disease]", &["cancer", "control", "Healthy", "cancer"]);
        assert!(quality.has_wrong_reserved_words);
        assert_eq!(quality.action, QualityAction::Review);
        let fix = quality.suggested_fix.unwrap();
        assert!(fix.contains("Replace 'control' with 'normal'"));
        assert!(fix.contains("Replace 'Healthy' with 'normal'"));

        let other = analyze("characteristics[organism part]", &["control", "liver"]);
        assert!(!other.has_wrong_reserved_words);
    }

    #[test]
    fn test_low_entropy() {
        let mut values = vec!["male"; 39];
        values.push("female");
        let quality = analyze("characteristics[sex]", &values);
        assert!(quality.entropy < 0.3);
        assert_eq!(quality.action, QualityAction::Review);
        assert!(quality.reason.starts_with("Very low information content"));

        let balanced = analyze("characteristics[sex]", &["male", "female", "male", "female"]);
        assert_eq!(balanced.action, QualityAction::Keep);
    }

    #[test]
    fn test_analyze_table() {
        let headers = ["source name", "characteristics[organism]", "characteristics[cell line]", "characteristics[age]"];
        let rows = [
            ["S1", "homo sapiens", "not available", "30Y"],
            ["S2", "homo sapiens", "not available", "40Y"],
            ["S3", "homo sapiens", "not available", "50Y"],
            ["S4", "homo sapiens", "not available", "60Y"],
        ];
        let criteria = QualityCriteria::default();
        let table = SparseTable::from_rows(&headers, &rows, &criteria).unwrap();
        let report = analyze_table(&table, &criteria);
        assert_eq!(report.columns.len(), 4);
        assert_eq!(report.summary.keep, 3);
        assert_eq!(report.summary.remove, 1);
        assert_eq!(report.summary.removable_columns, vec!["characteristics[cell line]"]);
        assert_close(report.summary.score, 75.0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["columns"][2]["action"], "remove");
        assert_eq!(json["columns"][2]["isEffectivelyEmpty"], true);
    }

    #[test]
    fn test_analyze_empty_table() {
        let report = analyze_table(&SparseTable::new(0), &QualityCriteria::default());
        assert!(report.columns.is_empty());
        assert_eq!(report.summary.score, 100.0);
    }
}
