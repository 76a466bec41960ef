use eframe::egui::Color32;

use super::aggregate::{aggregate, GroupStats};
use crate::color::{stability_color, TREND_COLOR};
use crate::config::RowSchema;
use crate::data::model::Row;

/// Relative headroom above/below trend data.
const TREND_PADDING_RATIO: f64 = 0.1;
/// Headroom used when every trend value is equal.
const FLAT_TREND_PADDING: f64 = 1.0;
/// Headroom above the tallest CV bar.
const CV_HEADROOM: f64 = 1.15;
/// CV axis maximum when there is no positive CV to show.
const DEFAULT_CV_AXIS_MAX: f64 = 20.0;

// ---------------------------------------------------------------------------
// ChartSeries
// ---------------------------------------------------------------------------

/// Presentation-ready series: `keys`, `values` and `colors` are index-aligned
/// and sorted by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub keys: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<Color32>,
}

impl ChartSeries {
    fn push(&mut self, key: String, value: f64, color: Color32) {
        self.keys.push(key);
        self.values.push(value);
        self.colors.push(color);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// `(key, value, color)` triples in order.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64, Color32)> + '_ {
        self.keys
            .iter()
            .zip(&self.values)
            .zip(&self.colors)
            .map(|((k, v), c)| (k.as_str(), *v, *c))
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Per-batch mean of `analyte`'s numeric results.
pub fn build_trend_series(rows: &[Row], schema: &RowSchema, analyte: &str) -> ChartSeries {
    let groups = aggregate(
        rows,
        |row| {
            if schema.analyte_of(row).as_deref() == Some(analyte) {
                Some(schema.batch_of(row))
            } else {
                None
            }
        },
        |row| schema.value_of(row),
    );
    trend_from_groups(groups.into_values())
}

/// CV per analyte across all rows, coloured by stability.
pub fn build_cv_series(rows: &[Row], schema: &RowSchema) -> ChartSeries {
    let groups = cv_groups(rows, schema);
    cv_from_groups(&groups)
}

/// The analyte groups behind [`build_cv_series`], for tables and export.
pub fn cv_groups(rows: &[Row], schema: &RowSchema) -> Vec<GroupStats> {
    aggregate(rows, |row| schema.analyte_of(row), |row| schema.value_of(row))
        .into_values()
        .collect()
}

pub(crate) fn trend_from_groups(groups: impl IntoIterator<Item = GroupStats>) -> ChartSeries {
    let mut series = ChartSeries::default();
    for g in groups {
        series.push(g.key, g.mean, TREND_COLOR);
    }
    series
}

pub(crate) fn cv_from_groups(groups: &[GroupStats]) -> ChartSeries {
    let mut series = ChartSeries::default();
    for g in groups {
        series.push(g.key.clone(), g.cv, stability_color(g.stability()));
    }
    series
}

// ---------------------------------------------------------------------------
// Axis policy
// ---------------------------------------------------------------------------

/// Value-axis bounds for a trend chart, padded so lines are not clipped.
pub fn trend_axis_range(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let padding = if range > 0.0 {
        range * TREND_PADDING_RATIO
    } else {
        FLAT_TREND_PADDING
    };
    Some((min - padding, max + padding))
}

/// Upper bound of a CV bar chart's value axis (the lower bound is 0).
pub fn cv_axis_max(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > 0.0 {
        (max * CV_HEADROOM).ceil()
    } else {
        DEFAULT_CV_AXIS_MAX
    }
}
