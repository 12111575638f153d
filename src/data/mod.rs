/// Data layer: core types, loading, and the derived EDA views.
///
/// Architecture:
/// ```text
///  .csv / .xlsx (name + bytes)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (typed columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Column>, row count
///   └──────────┘
///        │
///        ├──▶ summary  describe(): count / unique / top / freq / mean / std / quartiles
///        └──▶ inspect  exact column lookup → length / missing / unique
/// ```

pub mod inspect;
pub mod loader;
pub mod model;
pub mod stats;
pub mod summary;
