/// Data layer: rows, loading, and variable discovery.
///
/// ```text
///  query result (.json envelope / .csv / .parquet)
///        │
///        ▼
///   loader ──► RowSet { rows: Vec<Row>, column_names }
///                 │
///                 ├─► filter::numeric_analytes    (measurement rows)
///                 └─► filter::summary_variables   (per-batch statistic rows)
/// ```

pub mod filter;
pub mod loader;
pub mod model;
