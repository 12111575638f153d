use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
/// Values are counted and sorted downstream, so `CellValue` must be `Ord` + `Hash`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date-time rendered as `YYYY-MM-DD HH:MM:SS`.
    Date(String),
    Null,
}

impl CellValue {
    /// Position of the variant in the sort order.
    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Integer(_) => 2,
            CellValue::Float(_) => 3,
            CellValue::String(_) => 4,
            CellValue::Date(_) => 5,
        }
    }
}

/// `-0.0` folds into `0.0` and every NaN into one NaN, so equal floats
/// share a bit pattern.
fn canonical(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => canonical(*a).total_cmp(&canonical(*b)),
            (CellValue::String(a), CellValue::String(b))
            | (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(v) => canonical(*v).to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) | CellValue::Date(s) => f.write_str(s),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_nan() => f.write_str("NaN"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::Null => f.write_str("None"),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::String(s) | CellValue::Date(s) => serializer.serialize_str(s),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Float(_) | CellValue::Null => serializer.serialize_none(),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Null cells and NaN floats both count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named, typed column
// ---------------------------------------------------------------------------

/// Inferred dtype of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    DateTime,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Boolean => "bool",
            ColumnKind::DateTime => "datetime64",
            ColumnKind::Text => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Number of missing entries.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Number of distinct non-missing values.
    pub fn distinct_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !v.is_missing())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Non-missing values as `f64` (empty for non-numeric columns).
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(CellValue::as_f64).collect()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table. Immutable once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset from columns of equal length.
    ///
    /// Shorter columns are padded with `Null` so every column holds exactly
    /// `row_count` values.
    pub fn from_columns(mut columns: Vec<Column>) -> Self {
        let row_count = columns.iter().map(Column::len).max().unwrap_or(0);
        for col in &mut columns {
            col.values.resize(row_count, CellValue::Null);
        }
        Dataset { columns, row_count }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Ordered column names.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Exact, case-sensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.row_count
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.columns.len())
    }

    /// The first `n` rows, row-major.
    pub fn head(&self, n: usize) -> Vec<Vec<&CellValue>> {
        (0..n.min(self.row_count))
            .map(|row| self.columns.iter().map(|c| &c.values[row]).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_column(name: &str, values: &[Option<i64>]) -> Column {
        Column {
            name: name.to_string(),
            kind: ColumnKind::Integer,
            values: values
                .iter()
                .map(|v| v.map_or(CellValue::Null, CellValue::Integer))
                .collect(),
        }
    }

    #[test]
    fn head_is_capped_by_row_count() {
        let ds = Dataset::from_columns(vec![int_column("a", &[Some(1), Some(2), Some(3)])]);
        assert_eq!(ds.head(5).len(), 3);
        assert_eq!(ds.head(2).len(), 2);
        assert_eq!(ds.head(0).len(), 0);
    }

    #[test]
    fn short_columns_are_padded_with_null() {
        let ds = Dataset::from_columns(vec![
            int_column("a", &[Some(1), Some(2)]),
            int_column("b", &[Some(1)]),
        ]);
        assert_eq!(ds.shape(), (2, 2));
        assert_eq!(ds.columns()[1].values[1], CellValue::Null);
    }

    #[test]
    fn column_lookup_is_case_sensitive() {
        let ds = Dataset::from_columns(vec![int_column("Price", &[Some(1)])]);
        assert!(ds.column("Price").is_some());
        assert!(ds.column("price").is_none());
    }

    #[test]
    fn distinct_count_ignores_missing_values() {
        let mut col = int_column("a", &[Some(1), None, Some(1), Some(2)]);
        col.values.push(CellValue::Float(f64::NAN));
        assert_eq!(col.null_count(), 2);
        assert_eq!(col.distinct_count(), 2);
    }

    #[test]
    fn signed_zeros_are_one_value() {
        assert_eq!(CellValue::Float(-0.0), CellValue::Float(0.0));
        let col = Column {
            name: "z".into(),
            kind: ColumnKind::Float,
            values: vec![CellValue::Float(0.0), CellValue::Float(-0.0), CellValue::Float(1.5)],
        };
        assert_eq!(col.distinct_count(), 2);
    }

    #[test]
    fn ordering_groups_by_variant_then_value() {
        let mut vals = vec![
            CellValue::String("b".into()),
            CellValue::Integer(3),
            CellValue::Null,
            CellValue::Integer(1),
        ];
        vals.sort();
        assert_eq!(
            vals,
            vec![
                CellValue::Null,
                CellValue::Integer(1),
                CellValue::Integer(3),
                CellValue::String("b".into()),
            ]
        );
    }
}
