//! Inner join of the obesity and integrity tables on state code.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::parser::{IntegrityRow, ObesityRow};

/// Per-state values keyed by code; `None` marks a non-numeric value.
pub type StateIndex = BTreeMap<&'static str, Option<f64>>;

/// A state present with valid values in both sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRow {
    pub state_code: &'static str,
    pub obesity_rate: f64,
    pub integrity_score: f64,
    pub combined_metric: f64,
}

/// `(obesity_rate + (100 - integrity_score)) / 200`, in [0, 1] when both
/// inputs are percentages.
pub fn combined_metric(obesity_rate: f64, integrity_score: f64) -> f64 {
    (obesity_rate + (100.0 - integrity_score)) / 200.0
}

/// Keys rows by state code, keeping the first occurrence of a code.
fn index_by_code<T>(
    table: &str,
    rows: impl IntoIterator<Item = (&'static str, T)>,
) -> BTreeMap<&'static str, T> {
    let mut index = BTreeMap::new();
    for (code, value) in rows {
        if index.contains_key(code) {
            warn!(table, state = code, "Duplicate state code, keeping first row");
            continue;
        }
        index.insert(code, value);
    }
    index
}

/// Obesity values keyed by code; rows with no code are excluded.
pub fn obesity_by_code(rows: &[ObesityRow]) -> StateIndex {
    index_by_code(
        "obesity",
        rows.iter()
            .filter_map(|r| r.state_code.map(|code| (code, r.obesity_rate))),
    )
}

/// Integrity values keyed by code.
pub fn integrity_by_code(rows: &[IntegrityRow]) -> StateIndex {
    index_by_code(
        "integrity",
        rows.iter().map(|r| (r.state_code, r.integrity_score)),
    )
}

/// Joins both tables on state code, dropping states missing from either
/// side or lacking a numeric value in either column. Output is ordered by code.
pub fn merge(obesity: &[ObesityRow], integrity: &[IntegrityRow]) -> Vec<MergedRow> {
    merge_indexes(&obesity_by_code(obesity), &integrity_by_code(integrity))
}

/// [`merge`] over tables already keyed by code.
pub fn merge_indexes(obesity: &StateIndex, integrity: &StateIndex) -> Vec<MergedRow> {
    let merged: Vec<MergedRow> = obesity
        .iter()
        .filter_map(|(&code, &rate)| {
            let score = (*integrity.get(code)?)?;
            let rate = rate?;
            Some(MergedRow {
                state_code: code,
                obesity_rate: rate,
                integrity_score: score,
                combined_metric: combined_metric(rate, score),
            })
        })
        .collect();

    debug!(
        obesity_states = obesity.len(),
        integrity_states = integrity.len(),
        merged = merged.len(),
        "Datasets merged"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ob(name: &str, code: Option<&'static str>, rate: Option<f64>) -> ObesityRow {
        ObesityRow {
            state_name: name.to_string(),
            state_code: code,
            obesity_rate: rate,
        }
    }

    fn ig(code: &'static str, score: Option<f64>) -> IntegrityRow {
        IntegrityRow {
            state_code: code,
            integrity_score: score,
        }
    }

    #[test]
    fn test_two_state_example() {
        let obesity = vec![
            ob("Alabama", Some("AL"), Some(35.6)),
            ob("California", Some("CA"), Some(26.2)),
        ];
        let integrity = vec![ig("AL", Some(50.0)), ig("CA", Some(75.0))];

        let merged = merge(&obesity, &integrity);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].state_code, "AL");
        assert_eq!(merged[0].obesity_rate, 35.6);
        assert_eq!(merged[0].integrity_score, 50.0);
        assert_eq!(merged[1].state_code, "CA");
        assert_eq!(merged[1].obesity_rate, 26.2);
        assert_eq!(merged[1].integrity_score, 75.0);
    }

    #[test]
    fn test_inner_join_drops_partial_and_missing() {
        let obesity = vec![
            ob("Alabama", Some("AL"), Some(35.6)),
            ob("Texas", Some("TX"), None),
            ob("Ohio", Some("OH"), Some(38.1)),
            ob("Guam", None, Some(30.0)),
            ob("Utah", Some("UT"), Some(29.2)),
        ];
        let integrity = vec![
            ig("AL", Some(50.0)),
            ig("TX", Some(60.0)),
            ig("OH", None),
            ig("VT", Some(80.0)),
        ];

        let merged = merge(&obesity, &integrity);
        let codes: Vec<_> = merged.iter().map(|r| r.state_code).collect();
        assert_eq!(codes, vec!["AL"]);
    }

    #[test]
    fn test_empty_merge() {
        let obesity = vec![ob("Alabama", Some("AL"), Some(35.6))];
        let integrity = vec![ig("CA", Some(75.0))];
        assert!(merge(&obesity, &integrity).is_empty());
    }

    #[test]
    fn test_duplicate_codes_keep_first() {
        let obesity = vec![
            ob("Alabama", Some("AL"), Some(35.6)),
            ob("Alabama", Some("AL"), Some(99.0)),
        ];
        let integrity = vec![ig("AL", Some(50.0)), ig("AL", Some(10.0))];

        let merged = merge(&obesity, &integrity);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].obesity_rate, 35.6);
        assert_eq!(merged[0].integrity_score, 50.0);
    }

    #[test]
    fn test_combined_metric() {
        assert_eq!(combined_metric(0.0, 100.0), 0.0);
        assert_eq!(combined_metric(100.0, 0.0), 1.0);
        assert!((combined_metric(35.6, 50.0) - 0.428).abs() < 1e-12);

        let merged = merge(
            &[ob("Maine", Some("ME"), Some(31.0))],
            &[ig("ME", Some(66.0))],
        );
        assert!((merged[0].combined_metric - 0.325).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&merged[0].combined_metric));
    }

    #[test]
    fn test_merge_indexes_matches_merge() {
        let obesity = vec![
            ob("Alabama", Some("AL"), Some(35.6)),
            ob("Alabama", Some("AL"), Some(99.0)),
            ob("Ohio", Some("OH"), Some(38.1)),
        ];
        let integrity = vec![ig("AL", Some(50.0)), ig("OH", Some(62.0))];

        let obesity_index = obesity_by_code(&obesity);
        let integrity_index = integrity_by_code(&integrity);
        assert_eq!(obesity_index.get("AL"), Some(&Some(35.6)));
        assert_eq!(
            merge_indexes(&obesity_index, &integrity_index),
            merge(&obesity, &integrity)
        );
    }
}
