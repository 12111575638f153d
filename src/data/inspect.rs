use super::model::Dataset;

/// Length / missing / unique counts for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInspection {
    pub name: String,
    pub length: usize,
    pub missing: usize,
    pub unique: usize,
}

/// Outcome of a column-name search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnLookup {
    /// Nothing typed yet.
    Idle,
    Found(ColumnInspection),
    NotFound(String),
}

/// Look up `query` as an exact, case-sensitive column name.
pub fn inspect_column(dataset: &Dataset, query: &str) -> ColumnLookup {
    if query.is_empty() {
        return ColumnLookup::Idle;
    }
    match dataset.column(query) {
        Some(column) => ColumnLookup::Found(ColumnInspection {
            name: column.name.clone(),
            length: column.len(),
            missing: column.null_count(),
            unique: column.distinct_count(),
        }),
        None => ColumnLookup::NotFound(query.to_string()),
    }
}
