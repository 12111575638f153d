use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::model::{CellValue, Column, Dataset};
use super::stats;

/// Rows shown for non-numeric columns.
const CATEGORICAL_STATS: [&str; 4] = ["count", "unique", "top", "freq"];
/// Rows shown for numeric columns.
const NUMERIC_STATS: [&str; 7] = ["mean", "std", "min", "25%", "50%", "75%", "max"];

// ---------------------------------------------------------------------------
// Statistic cells
// ---------------------------------------------------------------------------

/// One cell of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(usize),
    Number(f64),
    Value(CellValue),
    /// Not applicable or undefined.
    Missing,
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{n}"),
            StatValue::Number(v) if v.is_finite() => write!(f, "{v:.6}"),
            StatValue::Number(_) | StatValue::Missing => write!(f, "NaN"),
            StatValue::Value(v) => write!(f, "{v}"),
        }
    }
}

fn number(v: Option<f64>) -> StatValue {
    v.map_or(StatValue::Missing, StatValue::Number)
}

// ---------------------------------------------------------------------------
// Summary table
// ---------------------------------------------------------------------------

/// Descriptive statistics of one column, keyed by statistic label.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub stats: Vec<(&'static str, StatValue)>,
}

impl ColumnSummary {
    /// Value for a statistic row; `Missing` when the row does not apply.
    pub fn get(&self, label: &str) -> &StatValue {
        self.stats
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v)
            .unwrap_or(&StatValue::Missing)
    }
}

/// Descriptive statistics for every column of a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Statistic row labels, in display order.
    pub labels: Vec<&'static str>,
    pub columns: Vec<ColumnSummary>,
}

impl Summary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        let by_column: Vec<serde_json::Value> = self
            .columns
            .iter()
            .map(|c| {
                let stats: serde_json::Map<String, serde_json::Value> = self
                    .labels
                    .iter()
                    .map(|label| {
                        let value = serde_json::to_value(c.get(label))?;
                        Ok((label.to_string(), value))
                    })
                    .collect::<serde_json::Result<_>>()?;
                Ok(serde_json::json!({ "column": c.name, "stats": stats }))
            })
            .collect::<serde_json::Result<_>>()?;
        serde_json::to_string_pretty(&by_column)
    }
}

/// Compute `count / unique / top / freq` for categorical columns and
/// `count / mean / std / min / quartiles / max` for numeric ones.
pub fn describe(dataset: &Dataset) -> Summary {
    let columns: Vec<ColumnSummary> = dataset.columns().iter().map(describe_column).collect();

    let any_categorical = dataset.columns().iter().any(|c| !c.kind.is_numeric());
    let any_numeric = dataset.columns().iter().any(|c| c.kind.is_numeric());

    let mut labels = vec!["count"];
    if any_categorical {
        labels.extend(&CATEGORICAL_STATS[1..]);
    }
    if any_numeric {
        labels.extend(NUMERIC_STATS);
    }
    Summary { labels, columns }
}

fn describe_column(column: &Column) -> ColumnSummary {
    let count = column.len() - column.null_count();
    let mut stats = vec![("count", StatValue::Count(count))];

    if column.kind.is_numeric() {
        let values = column.numeric_values();
        let sorted = stats::sorted(&values);
        stats.extend([
            ("mean", number(stats::mean(&values))),
            ("std", number(stats::std_dev(&values))),
            ("min", number(sorted.first().copied())),
            ("25%", number(stats::quantile_sorted(&sorted, 0.25))),
            ("50%", number(stats::quantile_sorted(&sorted, 0.5))),
            ("75%", number(stats::quantile_sorted(&sorted, 0.75))),
            ("max", number(sorted.last().copied())),
        ]);
    } else {
        let (top, freq) = most_frequent(&column.values).unzip();
        stats.extend([
            ("unique", StatValue::Count(column.distinct_count())),
            ("top", top.map_or(StatValue::Missing, StatValue::Value)),
            ("freq", freq.map_or(StatValue::Missing, StatValue::Count)),
        ]);
    }

    ColumnSummary { name: column.name.clone(), stats }
}

/// Most frequent non-missing value; ties go to the value seen first.
fn most_frequent(values: &[CellValue]) -> Option<(CellValue, usize)> {
    let mut counts: HashMap<&CellValue, (usize, usize)> = HashMap::new();
    for (i, v) in values.iter().enumerate().filter(|(_, v)| !v.is_missing()) {
        counts.entry(v).or_insert((0, i)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(v, (count, _))| (v.clone(), count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_bytes;

    fn csv(text: &str) -> Dataset {
        load_bytes("t.csv", text.as_bytes()).unwrap()
    }

    #[test]
    fn mixed_dataset_uses_all_labels() {
        let summary = describe(&csv("a,b\n1,x\n2,y\n3,z\n"));
        assert_eq!(
            summary.labels,
            vec!["count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
        assert_eq!(summary.columns.len(), 2);

        let a = &summary.columns[0];
        assert_eq!(a.get("count"), &StatValue::Count(3));
        assert_eq!(a.get("mean"), &StatValue::Number(2.0));
        assert_eq!(a.get("std"), &StatValue::Number(1.0));
        assert_eq!(a.get("50%"), &StatValue::Number(2.0));
        assert_eq!(a.get("top"), &StatValue::Missing);

        let b = &summary.columns[1];
        assert_eq!(b.get("unique"), &StatValue::Count(3));
        assert_eq!(b.get("top"), &StatValue::Value(CellValue::String("x".into())));
        assert_eq!(b.get("freq"), &StatValue::Count(1));
        assert_eq!(b.get("mean").to_string(), "NaN");
    }

    #[test]
    fn numeric_only_dataset_skips_categorical_rows() {
        let summary = describe(&csv("a\n1.5\n2.5\n"));
        assert_eq!(summary.labels[0], "count");
        assert_eq!(summary.labels[1], "mean");
        assert_eq!(summary.labels.len(), 8);
    }

    #[test]
    fn top_prefers_most_frequent_then_first_seen() {
        let summary = describe(&csv("c\nb\na\na\nb\nc\n"));
        let c = &summary.columns[0];
        assert_eq!(c.get("top"), &StatValue::Value(CellValue::String("b".into())));
        assert_eq!(c.get("freq"), &StatValue::Count(2));
    }

    #[test]
    fn missing_values_are_excluded_from_count() {
        let summary = describe(&csv("a,b\n1,x\n,\n3,x\n"));
        assert_eq!(summary.columns[0].get("count"), &StatValue::Count(2));
        assert_eq!(summary.columns[1].get("count"), &StatValue::Count(2));
        assert_eq!(summary.columns[1].get("unique"), &StatValue::Count(1));
    }

    #[test]
    fn empty_dataset_yields_zero_counts_and_nan() {
        let summary = describe(&csv("a,b\n"));
        for column in &summary.columns {
            assert_eq!(column.get("count"), &StatValue::Count(0));
            assert_eq!(column.get("mean").to_string(), "NaN");
            assert_eq!(column.get("top").to_string(), "NaN");
        }
    }

    #[test]
    fn json_export_lists_every_column() {
        let summary = describe(&csv("a,b\n1,x\n2,y\n"));
        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["column"], "a");
        assert_eq!(entries[0]["stats"]["count"], 2);
        assert_eq!(entries[1]["stats"]["top"], "x");
        assert!(entries[1]["stats"]["mean"].is_null());
    }
}
