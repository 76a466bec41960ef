/// Statistics and chart preparation over loaded rows.
///
/// Pipeline:
/// ```text
///   rows ──► numeric     (is this cell a measurement?)
///              │
///              ▼
///          aggregate     (group → count / mean / sd / CV / min / max)
///              │
///              ▼
///          stability     (CV → stable / moderate / risk)
///              │
///              ▼
///           series       (trend per batch, CV per analyte)
///
///   columns   ordering of table/export columns
///   summary   charts from wide per-batch statistic rows
/// ```

pub mod aggregate;
pub mod columns;
pub mod numeric;
pub mod series;
pub mod stability;
pub mod summary;
