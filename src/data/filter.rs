use std::collections::BTreeSet;

use super::model::Row;
use crate::analysis::numeric::is_numeric;
use crate::config::{Profile, RowSchema};

// ---------------------------------------------------------------------------
// Selectable chart variables
// ---------------------------------------------------------------------------

/// Analytes that have at least one numeric result, sorted and unique.
///
/// Analytes reported only as `PASS`/ranges cannot be charted and are left out.
pub fn numeric_analytes(rows: &[Row], schema: &RowSchema) -> Vec<String> {
    rows.iter()
        .filter(|row| is_numeric(schema.value_of(row)))
        .filter_map(|row| schema.analyte_of(row))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Columns of a wide summary row that can be charted, sorted.
///
/// A column is excluded when:
/// * it is one of the profile's identifying fields, or
/// * its lower-cased name contains one of the excluded markers (`time`, `batch`, ...)
pub fn summary_variables<S: AsRef<str>>(field_names: &[S], profile: &Profile) -> Vec<String> {
    let mut vars: Vec<String> = field_names
        .iter()
        .map(|f| f.as_ref())
        .filter(|name| !profile.id_fields.iter().any(|id| id.as_str() == *name))
        .filter(|name| {
            let lower = name.to_lowercase();
            !profile
                .excluded_markers
                .iter()
                .any(|m| lower.contains(m.as_str()))
        })
        .map(String::from)
        .collect();
    vars.sort();
    vars.dedup();
    vars
}
