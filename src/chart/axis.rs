use std::collections::{HashMap, HashSet};

use crate::data::model::{CellValue, Column};

/// Plot coordinates for one column: numeric columns map to their values,
/// everything else to category positions `0..n`.
#[derive(Debug, Clone)]
pub struct EncodedAxis {
    pub positions: Vec<Option<f64>>,
    /// Category labels when the axis is categorical.
    pub categories: Option<Vec<String>>,
}

/// Encode a column for a two-variable plot.  Categories keep their order
/// of first appearance.
pub fn encode(column: &Column) -> EncodedAxis {
    if column.kind.is_numeric() {
        return EncodedAxis {
            positions: column.values.iter().map(CellValue::as_f64).collect(),
            categories: None,
        };
    }
    let (codes, labels) = categories(column, false);
    EncodedAxis {
        positions: codes.into_iter().map(|c| c.map(|c| c as f64)).collect(),
        categories: Some(labels),
    }
}

/// Assign each row a category index.
///
/// Order is first appearance, or ascending value when `sort_numeric` is set
/// and the column is numeric.
pub fn categories(column: &Column, sort_numeric: bool) -> (Vec<Option<usize>>, Vec<String>) {
    let mut distinct: Vec<&CellValue> = Vec::new();
    let mut seen: HashSet<&CellValue> = HashSet::new();
    for v in column.values.iter().filter(|v| !v.is_missing()) {
        if seen.insert(v) {
            distinct.push(v);
        }
    }
    if sort_numeric && column.kind.is_numeric() {
        distinct.sort_by(|a, b| {
            let (a, b) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
            a.total_cmp(&b)
        });
    }

    let index: HashMap<&CellValue, usize> =
        distinct.iter().enumerate().map(|(i, v)| (*v, i)).collect();
    let codes = column
        .values
        .iter()
        .map(|v| index.get(v).copied())
        .collect();
    let labels = distinct.iter().map(|v| v.to_string()).collect();
    (codes, labels)
}

/// Numeric values of `values` grouped by the categories of `groups`.
/// Rows missing either side are skipped.
pub fn grouped(groups: &Column, values: &Column) -> (Vec<String>, Vec<Vec<f64>>) {
    let (codes, labels) = categories(groups, true);
    let mut buckets = vec![Vec::new(); labels.len()];
    for (code, value) in codes.iter().zip(&values.values) {
        if let (Some(code), Some(v)) = (code, value.as_f64()) {
            buckets[*code].push(v);
        }
    }
    (labels, buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnKind;

    fn column(kind: ColumnKind, values: Vec<CellValue>) -> Column {
        Column { name: "c".into(), kind, values }
    }

    fn text(values: &[&str]) -> Column {
        column(
            ColumnKind::Text,
            values.iter().map(|s| CellValue::String(s.to_string())).collect(),
        )
    }

    #[test]
    fn categorical_axis_uses_first_appearance() {
        let axis = encode(&text(&["b", "a", "b", "c"]));
        assert_eq!(axis.positions, vec![Some(0.0), Some(1.0), Some(0.0), Some(2.0)]);
        assert_eq!(axis.categories.unwrap(), vec!["b", "a", "c"]);
    }

    #[test]
    fn numeric_axis_keeps_values_and_gaps() {
        let axis = encode(&column(
            ColumnKind::Float,
            vec![CellValue::Float(1.5), CellValue::Null, CellValue::Float(-2.0)],
        ));
        assert_eq!(axis.positions, vec![Some(1.5), None, Some(-2.0)]);
        assert!(axis.categories.is_none());
    }

    #[test]
    fn numeric_groups_are_sorted() {
        let groups = column(
            ColumnKind::Integer,
            vec![CellValue::Integer(3), CellValue::Integer(1), CellValue::Integer(3)],
        );
        let values = column(
            ColumnKind::Float,
            vec![CellValue::Float(1.0), CellValue::Float(2.0), CellValue::Null],
        );
        let (labels, buckets) = grouped(&groups, &values);
        assert_eq!(labels, vec!["1", "3"]);
        assert_eq!(buckets, vec![vec![2.0], vec![1.0]]);
    }

    #[test]
    fn signed_zeros_share_a_group() {
        let groups = column(
            ColumnKind::Float,
            vec![CellValue::Float(0.0), CellValue::Float(-0.0), CellValue::Float(2.0)],
        );
        let values = column(
            ColumnKind::Float,
            vec![CellValue::Float(1.0), CellValue::Float(3.0), CellValue::Float(5.0)],
        );
        let (labels, buckets) = grouped(&groups, &values);
        assert_eq!(labels, vec!["0", "2"]);
        assert_eq!(buckets, vec![vec![1.0, 3.0], vec![5.0]]);
    }
}
