//! Per-group descriptive statistics over measurement rows.
//!
//! Values are accumulated with Welford's online update, so a group is built
//! in a single pass without keeping its values around.

use std::collections::BTreeMap;

use serde::Serialize;

use super::numeric::numeric_value;
use super::stability::{classify, StabilityLabel};
use crate::data::model::{FieldValue, Row};

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Running count / mean / M2 / extrema for one group.
#[derive(Debug, Clone)]
struct GroupAccumulator {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl GroupAccumulator {
    fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    fn finish(self, key: String) -> GroupStats {
        let sample_std_dev = if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).sqrt()
        };
        let cv = if self.count >= 2 && self.mean != 0.0 {
            sample_std_dev / self.mean.abs() * 100.0
        } else {
            0.0
        };
        GroupStats {
            key,
            count: self.count,
            mean: self.mean,
            sample_std_dev,
            cv,
            min: self.min,
            max: self.max,
        }
    }
}

// ---------------------------------------------------------------------------
// GroupStats
// ---------------------------------------------------------------------------

/// Descriptive statistics of one batch or analyte group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub key: String,
    /// Number of numeric values; always >= 1.
    pub count: usize,
    pub mean: f64,
    /// Standard deviation with Bessel's correction; 0 for a single value.
    pub sample_std_dev: f64,
    /// Coefficient of variation in percent; 0 when undefined.
    pub cv: f64,
    pub min: f64,
    pub max: f64,
}

impl GroupStats {
    /// Stability of the group. A zero mean carries no variability signal.
    pub fn stability(&self) -> StabilityLabel {
        if self.mean == 0.0 {
            StabilityLabel::InsufficientData
        } else {
            classify(self.cv, self.count)
        }
    }

    /// Display/export record with fixed decimal places.
    pub fn to_record(&self) -> SummaryRecord {
        SummaryRecord {
            key: self.key.clone(),
            count: self.count,
            mean: format!("{:.3}", self.mean),
            std_dev: format!("{:.3}", self.sample_std_dev),
            cv: format!("{:.2}", self.cv),
            stability: self.stability().to_string(),
            min: format!("{:.3}", self.min),
            max: format!("{:.3}", self.max),
        }
    }
}

/// One exported summary line per group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub key: String,
    pub count: usize,
    pub mean: String,
    pub std_dev: String,
    pub cv: String,
    pub stability: String,
    pub min: String,
    pub max: String,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Group `rows` by `group_key` and summarise the numeric values of `value`.
///
/// Rows without a key, or whose value is not a numeric measurement, are
/// skipped. The result is keyed (and therefore ordered) by group key.
pub fn aggregate<K, V>(rows: &[Row], group_key: K, value: V) -> BTreeMap<String, GroupStats>
where
    K: Fn(&Row) -> Option<String>,
    V: Fn(&Row) -> Option<&FieldValue>,
{
    let mut groups: BTreeMap<String, GroupAccumulator> = BTreeMap::new();
    for row in rows {
        let Some(x) = numeric_value(value(row)) else {
            continue;
        };
        let Some(key) = group_key(row) else {
            continue;
        };
        groups.entry(key).or_insert_with(GroupAccumulator::new).add(x);
    }

    groups
        .into_iter()
        .map(|(key, acc)| {
            let stats = acc.finish(key.clone());
            (key, stats)
        })
        .collect()
}

/// Summarise a plain slice of values as a single group.
pub fn summarize(key: &str, values: &[f64]) -> Option<GroupStats> {
    if values.is_empty() {
        return None;
    }
    let mut acc = GroupAccumulator::new();
    for &v in values {
        acc.add(v);
    }
    Some(acc.finish(key.to_string()))
}
