//! Charts from wide per-batch statistic rows.
//!
//! Process statistics arrive one row per batch, with a column for each
//! variable/statistic pair (`ROOM_temp_mean`, `ROOM_temp_std`, ...). These
//! helpers reuse the row aggregation for trends and derive a batch-level CV
//! from the mean and standard deviation columns.

use serde::Serialize;

use super::aggregate::{aggregate, summarize};
use super::columns::{split_stat_column, StatColumn};
use super::numeric::numeric_value;
use super::series::{trend_from_groups, ChartSeries};
use super::stability::{classify, StabilityLabel};
use crate::color::stability_color;
use crate::config::{ColumnLayout, RowSchema};
use crate::data::model::Row;

/// All statistic columns of a summary row, in column order.
pub fn stat_columns<S: AsRef<str>>(field_names: &[S], layout: &ColumnLayout) -> Vec<StatColumn> {
    field_names
        .iter()
        .filter_map(|name| split_stat_column(name.as_ref(), layout))
        .collect()
}

/// Trend of one statistic column, one point per batch.
pub fn build_column_trend(rows: &[Row], schema: &RowSchema, column: &str) -> ChartSeries {
    let groups = aggregate(rows, |row| Some(schema.batch_of(row)), |row| row.get(column));
    trend_from_groups(groups.into_values())
}

/// Batch-level CV of one summary variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCv {
    pub variable: String,
    /// Batches contributing a numeric mean.
    pub batches: usize,
    pub cv: f64,
    pub stability: StabilityLabel,
}

/// Batch-level CV of every variable that has both a mean and a std column.
///
/// `cv = mean(std column) / mean(mean column) * 100`, using only the numeric
/// cells of each column; 0 when the mean of means is 0. Sorted by variable.
pub fn summary_cv<S: AsRef<str>>(
    rows: &[Row],
    field_names: &[S],
    layout: &ColumnLayout,
) -> Vec<SummaryCv> {
    let (Some(mean_suffix), Some(std_suffix)) = (layout.mean_suffix(), layout.std_dev_suffix())
    else {
        return Vec::new();
    };

    let mut bases: Vec<String> = stat_columns(field_names, layout)
        .into_iter()
        .filter(|c| c.stat == mean_suffix)
        .map(|c| c.base)
        .collect();
    bases.sort();
    bases.dedup();

    let mut out = Vec::new();
    for base in bases {
        let std_column = layout.stat_column(&base, std_suffix);
        if !field_names.iter().any(|f| f.as_ref() == std_column) {
            continue;
        }
        let mean_column = layout.stat_column(&base, mean_suffix);
        let means = column_values(rows, &mean_column);
        let stds = column_values(rows, &std_column);
        let (Some(mean_stats), Some(std_stats)) =
            (summarize(&base, &means), summarize(&base, &stds))
        else {
            continue;
        };

        let cv = if mean_stats.mean != 0.0 {
            std_stats.mean / mean_stats.mean * 100.0
        } else {
            0.0
        };
        log::debug!("summary CV {base}: {cv:.2}% over {} batches", mean_stats.count);
        out.push(SummaryCv {
            stability: classify(cv, mean_stats.count),
            variable: base,
            batches: mean_stats.count,
            cv,
        });
    }
    out
}

/// [`summary_cv`] as a bar series coloured by stability.
pub fn build_summary_cv_series<S: AsRef<str>>(
    rows: &[Row],
    field_names: &[S],
    layout: &ColumnLayout,
) -> ChartSeries {
    let mut series = ChartSeries::default();
    for item in summary_cv(rows, field_names, layout) {
        series.keys.push(item.variable);
        series.values.push(item.cv);
        series.colors.push(stability_color(item.stability));
    }
    series
}

fn column_values(rows: &[Row], column: &str) -> Vec<f64> {
    rows.iter()
        .filter_map(|row| numeric_value(row.get(column)))
        .collect()
}
